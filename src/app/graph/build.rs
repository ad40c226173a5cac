use std::collections::{HashMap, HashSet};

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::data::Contact;
use crate::engine::{
    ClusterConfig, GraphEdge, GraphNode, LayoutMode, RelationshipStrength, compute_visible,
};

use super::super::{RenderGraph, ViewModel, ViewScratch};

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

fn graph_node_for(contact: &Contact) -> GraphNode {
    GraphNode {
        id: contact.id.clone(),
        name: contact.name.clone(),
        company: contact.company.clone(),
        title: contact.title.clone(),
        category: contact.category.clone(),
        trust_score: contact.trust_score,
        strength: RelationshipStrength::from_trust(contact.trust_score),
        cluster: None,
    }
}

impl ViewModel {
    // Contacts are walked in sorted-id order so the clustering pass sees a
    // stable input order.
    fn filtered_inputs(&self) -> (Vec<GraphNode>, Vec<GraphEdge>) {
        let query = self.search.trim();
        let matcher = (!query.is_empty()).then(SkimMatcherV2::default);

        let mut ids = self.network.contacts.keys().collect::<Vec<_>>();
        ids.sort();

        let mut nodes = Vec::new();
        let mut kept = HashSet::new();
        for id in ids {
            let contact = &self.network.contacts[id];
            let always_include = self.selected.as_deref() == Some(contact.id.as_str());

            if !always_include {
                if contact.trust_score < self.min_trust {
                    continue;
                }
                if let Some(category) = &self.category_filter
                    && &contact.category != category
                {
                    continue;
                }
                if let Some(matcher) = &matcher
                    && fuzzy_match_score(matcher, &contact.name, query).is_none()
                    && fuzzy_match_score(matcher, &contact.company, query).is_none()
                {
                    continue;
                }
            }

            kept.insert(contact.id.as_str());
            nodes.push(graph_node_for(contact));
        }

        let edges = self
            .network
            .relationships
            .iter()
            .filter(|relationship| {
                relationship.strength >= self.min_strength
                    && kept.contains(relationship.source.as_str())
                    && kept.contains(relationship.target.as_str())
            })
            .map(|relationship| GraphEdge {
                id: relationship.id.clone(),
                source: relationship.source.clone(),
                target: relationship.target.clone(),
                strength: relationship.strength,
                kind: relationship.kind,
            })
            .collect::<Vec<_>>();

        (nodes, edges)
    }

    pub(in crate::app) fn cluster_config(&self) -> ClusterConfig {
        ClusterConfig {
            render_limit: self.render_limit,
            edge_limit: self.edge_limit,
            cluster_threshold: self.cluster_threshold,
            grouping: self.grouping,
            show_all_nodes: self.show_all_nodes,
            selected: self.selected.clone(),
            hovered: self.hovered.clone(),
            expanded_groups: self.expanded_groups.clone(),
        }
    }

    pub(in crate::app) fn rebuild_render_graph(&mut self) {
        let (nodes, edges) = self.filtered_inputs();
        let visible = compute_visible(&nodes, &edges, &self.cluster_config());

        self.positions
            .ensure_seeded(&visible.nodes, self.layout_mode, self.viewport);

        let mut index_by_id = HashMap::with_capacity(visible.nodes.len());
        for (index, node) in visible.nodes.iter().enumerate() {
            index_by_id.insert(node.id.clone(), index);
        }

        let mut neighbors = vec![Vec::new(); visible.nodes.len()];
        for edge in &visible.edges {
            if let (Some(&source), Some(&target)) = (
                index_by_id.get(edge.source.as_str()),
                index_by_id.get(edge.target.as_str()),
            ) {
                neighbors[source].push(target);
                neighbors[target].push(source);
            }
        }

        self.visible_node_count = visible.nodes.len();
        self.visible_edge_count = visible.edges.len();
        self.graph_cache = Some(RenderGraph {
            visible,
            index_by_id,
            neighbors,
            view_scratch: ViewScratch::default(),
        });
        self.graph_dirty = false;

        // Rebuilding the visible set restarts the simulation budget; static
        // layouts never run the stepper.
        if self.layout_mode == LayoutMode::Force {
            self.simulator.start();
        } else {
            self.simulator.stop();
        }
    }
}
