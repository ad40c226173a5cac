use std::collections::{HashMap, HashSet};

use crate::util::slugify;

use super::{ClusterInfo, GraphEdge, GraphNode, RelationshipStrength};

pub const DEFAULT_RENDER_LIMIT: usize = 150;
pub const DEFAULT_EDGE_LIMIT: usize = 300;
pub const DEFAULT_CLUSTER_THRESHOLD: usize = 5;

const IMPORTANT_TRUST_SCORE: f32 = 85.0;
const MIN_CLUSTER_EDGE_STRENGTH: f32 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GroupKey {
    Category,
    Company,
}

impl GroupKey {
    pub fn label(self) -> &'static str {
        match self {
            Self::Category => "Category",
            Self::Company => "Company",
        }
    }

    pub const ALL: [Self; 2] = [Self::Category, Self::Company];

    fn of(self, node: &GraphNode) -> &str {
        match self {
            Self::Category => &node.category,
            Self::Company => &node.company,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ClusterConfig {
    pub render_limit: usize,
    pub edge_limit: usize,
    pub cluster_threshold: usize,
    pub grouping: GroupKey,
    pub show_all_nodes: bool,
    pub selected: Option<String>,
    pub hovered: Option<String>,
    pub expanded_groups: HashSet<String>,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            render_limit: DEFAULT_RENDER_LIMIT,
            edge_limit: DEFAULT_EDGE_LIMIT,
            cluster_threshold: DEFAULT_CLUSTER_THRESHOLD,
            grouping: GroupKey::Category,
            show_all_nodes: false,
            selected: None,
            hovered: None,
            expanded_groups: HashSet::new(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct VisibleGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub cluster_map: HashMap<String, String>,
}

pub fn cluster_id(group_key: &str) -> String {
    format!("cluster-{}", slugify(group_key))
}

pub fn compute_visible(
    nodes: &[GraphNode],
    edges: &[GraphEdge],
    config: &ClusterConfig,
) -> VisibleGraph {
    if config.show_all_nodes || nodes.len() <= config.render_limit {
        return passthrough(nodes, edges, config.edge_limit);
    }

    let is_important = |node: &GraphNode| {
        node.trust_score >= IMPORTANT_TRUST_SCORE
            || config.selected.as_deref() == Some(node.id.as_str())
            || config.hovered.as_deref() == Some(node.id.as_str())
    };

    // Group keys keep first-appearance order so repeated runs emit identical
    // node and edge lists even when the edge limit truncates.
    let mut group_order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<&GraphNode>> = HashMap::new();
    let mut visible_nodes: Vec<GraphNode> = Vec::new();

    for node in nodes {
        if is_important(node) {
            visible_nodes.push(node.clone());
            continue;
        }

        let key = config.grouping.of(node);
        let members = groups.entry(key).or_insert_with(|| {
            group_order.push(key);
            Vec::new()
        });
        members.push(node);
    }

    let mut cluster_map = HashMap::new();
    for key in group_order {
        let members = &groups[key];
        if members.len() < config.cluster_threshold || config.expanded_groups.contains(key) {
            visible_nodes.extend(members.iter().map(|node| (*node).clone()));
            continue;
        }

        let id = cluster_id(key);
        let trust_sum = members.iter().map(|node| node.trust_score).sum::<f32>();
        let trust_score = (trust_sum / members.len() as f32).round();
        for member in members {
            cluster_map.insert(member.id.clone(), id.clone());
        }

        visible_nodes.push(GraphNode {
            id,
            name: format!("{key} ({})", members.len()),
            company: String::new(),
            title: format!("{} contacts", members.len()),
            category: key.to_string(),
            trust_score,
            strength: RelationshipStrength::from_trust(trust_score),
            cluster: Some(ClusterInfo {
                group_key: key.to_string(),
                member_count: members.len(),
            }),
        });
    }

    let visible_ids = visible_nodes
        .iter()
        .map(|node| node.id.as_str())
        .collect::<HashSet<_>>();

    let mut visible_edges: Vec<GraphEdge> = Vec::new();
    let mut remapped_pairs: HashSet<(String, String)> = HashSet::new();
    for edge in edges {
        if visible_edges.len() >= config.edge_limit {
            break;
        }

        let Some(source) = resolve_endpoint(&edge.source, &visible_ids, &cluster_map) else {
            continue;
        };
        let Some(target) = resolve_endpoint(&edge.target, &visible_ids, &cluster_map) else {
            continue;
        };
        if source == target {
            continue;
        }

        if source == edge.source && target == edge.target {
            visible_edges.push(edge.clone());
            continue;
        }

        let pair = if source <= target {
            (source.to_string(), target.to_string())
        } else {
            (target.to_string(), source.to_string())
        };
        if !remapped_pairs.insert(pair) {
            continue;
        }

        visible_edges.push(GraphEdge {
            id: format!("{source}--{target}"),
            source: source.to_string(),
            target: target.to_string(),
            strength: edge.strength.max(MIN_CLUSTER_EDGE_STRENGTH),
            kind: edge.kind,
        });
    }

    debug_assert!(
        visible_edges
            .iter()
            .map(|edge| edge.id.as_str())
            .collect::<HashSet<_>>()
            .len()
            == visible_edges.len(),
        "visible edge ids must be unique"
    );

    VisibleGraph {
        nodes: visible_nodes,
        edges: visible_edges,
        cluster_map,
    }
}

fn passthrough(nodes: &[GraphNode], edges: &[GraphEdge], edge_limit: usize) -> VisibleGraph {
    let present = nodes
        .iter()
        .map(|node| node.id.as_str())
        .collect::<HashSet<_>>();

    let visible_edges = edges
        .iter()
        .filter(|edge| {
            present.contains(edge.source.as_str())
                && present.contains(edge.target.as_str())
                && edge.source != edge.target
        })
        .take(edge_limit)
        .cloned()
        .collect::<Vec<_>>();

    VisibleGraph {
        nodes: nodes.to_vec(),
        edges: visible_edges,
        cluster_map: HashMap::new(),
    }
}

fn resolve_endpoint<'a>(
    id: &'a str,
    visible_ids: &HashSet<&str>,
    cluster_map: &'a HashMap<String, String>,
) -> Option<&'a str> {
    if visible_ids.contains(id) {
        return Some(id);
    }
    cluster_map.get(id).map(String::as_str)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::super::test_support::{contact, relationship};
    use super::{ClusterConfig, GroupKey, compute_visible};

    fn tech_heavy_config() -> ClusterConfig {
        ClusterConfig {
            render_limit: 10,
            cluster_threshold: 5,
            ..ClusterConfig::default()
        }
    }

    #[test]
    fn small_inputs_skip_clustering() {
        let nodes = (0..5)
            .map(|i| contact(&format!("c{i}"), "Tech", 50.0))
            .collect::<Vec<_>>();
        let edges = vec![relationship("e0", "c0", "c1", 0.4)];

        let visible = compute_visible(&nodes, &edges, &ClusterConfig::default());
        assert_eq!(visible.nodes.len(), 5);
        assert_eq!(visible.edges.len(), 1);
        assert!(visible.cluster_map.is_empty());
    }

    #[test]
    fn large_group_collapses_into_one_cluster_with_average_trust() {
        let nodes = (0..20)
            .map(|i| contact(&format!("c{i}"), "Tech", 40.0 + i as f32))
            .collect::<Vec<_>>();

        let visible = compute_visible(&nodes, &[], &tech_heavy_config());
        assert_eq!(visible.nodes.len(), 1);

        let cluster = &visible.nodes[0];
        assert_eq!(cluster.id, "cluster-tech");
        let expected = ((0..20).map(|i| 40.0 + i as f32).sum::<f32>() / 20.0).round();
        assert_eq!(cluster.trust_score, expected);
        assert_eq!(
            cluster.cluster.as_ref().map(|info| info.member_count),
            Some(20)
        );
        assert_eq!(visible.cluster_map.len(), 20);
        assert!(
            visible
                .cluster_map
                .values()
                .all(|target| target == "cluster-tech")
        );
    }

    #[test]
    fn important_nodes_bypass_clustering() {
        let mut nodes = (0..19)
            .map(|i| contact(&format!("c{i}"), "Tech", 50.0))
            .collect::<Vec<_>>();
        nodes.push(contact("star", "Tech", 90.0));

        let mut config = tech_heavy_config();
        config.selected = Some("star".to_string());

        let visible = compute_visible(&nodes, &[], &config);
        let ids = visible
            .nodes
            .iter()
            .map(|node| node.id.as_str())
            .collect::<HashSet<_>>();
        assert!(ids.contains("star"));
        assert!(ids.contains("cluster-tech"));
        assert_eq!(visible.nodes.len(), 2);
        assert_eq!(visible.cluster_map.len(), 19);
        assert!(!visible.cluster_map.contains_key("star"));
    }

    #[test]
    fn hovered_node_stays_visible() {
        let nodes = (0..20)
            .map(|i| contact(&format!("c{i}"), "Tech", 50.0))
            .collect::<Vec<_>>();

        let mut config = tech_heavy_config();
        config.hovered = Some("c7".to_string());

        let visible = compute_visible(&nodes, &[], &config);
        assert!(visible.nodes.iter().any(|node| node.id == "c7"));
        assert!(!visible.cluster_map.contains_key("c7"));
    }

    #[test]
    fn small_groups_emit_members_individually() {
        let mut nodes = (0..20)
            .map(|i| contact(&format!("t{i}"), "Tech", 50.0))
            .collect::<Vec<_>>();
        nodes.push(contact("f0", "Finance", 50.0));
        nodes.push(contact("f1", "Finance", 50.0));

        let visible = compute_visible(&nodes, &[], &tech_heavy_config());
        let ids = visible
            .nodes
            .iter()
            .map(|node| node.id.as_str())
            .collect::<HashSet<_>>();
        assert!(ids.contains("f0") && ids.contains("f1"));
        assert!(ids.contains("cluster-tech"));
        assert!(!visible.cluster_map.contains_key("f0"));
    }

    #[test]
    fn expanded_group_renders_members_individually() {
        let nodes = (0..20)
            .map(|i| contact(&format!("t{i}"), "Tech", 50.0))
            .collect::<Vec<_>>();

        let mut config = tech_heavy_config();
        config.expanded_groups.insert("Tech".to_string());

        let visible = compute_visible(&nodes, &[], &config);
        assert_eq!(visible.nodes.len(), 20);
        assert!(visible.cluster_map.is_empty());
    }

    #[test]
    fn edge_with_absorbed_endpoint_is_remapped_to_cluster() {
        let mut nodes = (0..20)
            .map(|i| contact(&format!("t{i}"), "Tech", 50.0))
            .collect::<Vec<_>>();
        nodes.push(contact("a", "Finance", 90.0));
        let edges = vec![relationship("e0", "a", "t3", 0.2)];

        let visible = compute_visible(&nodes, &edges, &tech_heavy_config());
        assert_eq!(visible.edges.len(), 1);
        let edge = &visible.edges[0];
        assert_eq!(edge.source, "a");
        assert_eq!(edge.target, "cluster-tech");
        assert!(edge.strength >= 0.5);
    }

    #[test]
    fn edges_collapsing_onto_same_pair_are_deduplicated() {
        let mut nodes = (0..20)
            .map(|i| contact(&format!("t{i}"), "Tech", 50.0))
            .collect::<Vec<_>>();
        for i in 0..20 {
            nodes.push(contact(&format!("f{i}"), "Finance", 50.0));
        }
        let edges = vec![
            relationship("e0", "t0", "f0", 0.2),
            relationship("e1", "t1", "f1", 0.9),
            relationship("e2", "f2", "t2", 0.3),
        ];

        let visible = compute_visible(&nodes, &edges, &tech_heavy_config());
        assert_eq!(visible.edges.len(), 1);
        assert_eq!(visible.edges[0].strength, 0.5);
    }

    #[test]
    fn edges_internal_to_one_cluster_are_dropped() {
        let nodes = (0..20)
            .map(|i| contact(&format!("t{i}"), "Tech", 50.0))
            .collect::<Vec<_>>();
        let edges = vec![relationship("e0", "t0", "t1", 0.8)];

        let visible = compute_visible(&nodes, &edges, &tech_heavy_config());
        assert!(visible.edges.is_empty());
    }

    #[test]
    fn no_dangling_edges_in_output() {
        let mut nodes = (0..30)
            .map(|i| contact(&format!("t{i}"), "Tech", 30.0 + (i % 40) as f32))
            .collect::<Vec<_>>();
        for i in 0..8 {
            nodes.push(contact(&format!("f{i}"), "Finance", 88.0));
        }
        let edges = (0..25)
            .map(|i| {
                relationship(
                    &format!("e{i}"),
                    &format!("t{}", i % 30),
                    &format!("f{}", i % 8),
                    0.3,
                )
            })
            .chain([relationship("ghost", "t0", "missing", 0.4)])
            .collect::<Vec<_>>();

        let visible = compute_visible(&nodes, &edges, &tech_heavy_config());
        let ids = visible
            .nodes
            .iter()
            .map(|node| node.id.as_str())
            .collect::<HashSet<_>>();
        for edge in &visible.edges {
            assert!(ids.contains(edge.source.as_str()), "dangling {}", edge.source);
            assert!(ids.contains(edge.target.as_str()), "dangling {}", edge.target);
        }
    }

    #[test]
    fn edge_limit_is_respected() {
        let nodes = (0..40)
            .map(|i| contact(&format!("c{i}"), &format!("cat{}", i % 8), 90.0))
            .collect::<Vec<_>>();
        let mut edges = Vec::new();
        for i in 0..40 {
            for j in (i + 1)..40 {
                edges.push(relationship(&format!("e{i}-{j}"), &format!("c{i}"), &format!("c{j}"), 0.4));
            }
        }

        let mut config = ClusterConfig {
            render_limit: 10,
            edge_limit: 25,
            ..ClusterConfig::default()
        };
        let visible = compute_visible(&nodes, &edges, &config);
        assert!(visible.edges.len() <= 25);

        config.show_all_nodes = true;
        let visible = compute_visible(&nodes, &edges, &config);
        assert_eq!(visible.edges.len(), 25);
    }

    #[test]
    fn output_is_deterministic_across_runs() {
        let nodes = (0..60)
            .map(|i| contact(&format!("c{i}"), &format!("cat{}", i % 7), (i % 100) as f32))
            .collect::<Vec<_>>();
        let edges = (0..120)
            .map(|i| {
                relationship(
                    &format!("e{i}"),
                    &format!("c{}", i % 60),
                    &format!("c{}", (i * 13 + 7) % 60),
                    0.1 + (i % 9) as f32 * 0.1,
                )
            })
            .collect::<Vec<_>>();
        let config = ClusterConfig {
            render_limit: 20,
            edge_limit: 40,
            grouping: GroupKey::Category,
            ..ClusterConfig::default()
        };

        let first = compute_visible(&nodes, &edges, &config);
        let second = compute_visible(&nodes, &edges, &config);

        let node_ids = |graph: &super::VisibleGraph| {
            graph
                .nodes
                .iter()
                .map(|node| node.id.clone())
                .collect::<Vec<_>>()
        };
        let edge_ids = |graph: &super::VisibleGraph| {
            graph
                .edges
                .iter()
                .map(|edge| edge.id.clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(node_ids(&first), node_ids(&second));
        assert_eq!(edge_ids(&first), edge_ids(&second));
        assert_eq!(first.cluster_map, second.cluster_map);
    }

    #[test]
    fn grouping_by_company_uses_company_field() {
        let nodes = (0..20)
            .map(|i| {
                let mut node = contact(&format!("c{i}"), &format!("cat{i}"), 50.0);
                node.company = "Acme".to_string();
                node
            })
            .collect::<Vec<_>>();

        let config = ClusterConfig {
            render_limit: 10,
            grouping: GroupKey::Company,
            ..ClusterConfig::default()
        };
        let visible = compute_visible(&nodes, &[], &config);
        assert_eq!(visible.nodes.len(), 1);
        assert_eq!(visible.nodes[0].id, "cluster-acme");
    }
}
