mod cluster;
mod positions;
mod simulator;

pub use cluster::{ClusterConfig, GroupKey, VisibleGraph, compute_visible};
pub use positions::{PositionEntry, PositionStore};
pub use simulator::{SIMULATION_BUDGET_SECS, Simulator};

use eframe::egui::{Vec2, vec2};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutMode {
    Force,
    Cluster,
    Hierarchy,
}

impl LayoutMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Force => "Force",
            Self::Cluster => "Cluster",
            Self::Hierarchy => "Hierarchy",
        }
    }

    pub const ALL: [Self; 3] = [Self::Force, Self::Cluster, Self::Hierarchy];
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RelationshipStrength {
    Strong,
    Medium,
    Weak,
}

impl RelationshipStrength {
    pub fn from_trust(score: f32) -> Self {
        if score >= 80.0 {
            Self::Strong
        } else if score >= 60.0 {
            Self::Medium
        } else {
            Self::Weak
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Strong => "strong",
            Self::Medium => "medium",
            Self::Weak => "weak",
        }
    }
}

// Cosmetic classification; no effect on the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeKind {
    Direct,
    Mutual,
    Introduction,
}

impl EdgeKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Mutual => "mutual",
            Self::Introduction => "introduction",
        }
    }
}

#[derive(Clone, Debug)]
pub struct GraphNode {
    pub id: String,
    pub name: String,
    pub company: String,
    pub title: String,
    pub category: String,
    pub trust_score: f32,
    pub strength: RelationshipStrength,
    pub cluster: Option<ClusterInfo>,
}

impl GraphNode {
    pub fn is_cluster(&self) -> bool {
        self.cluster.is_some()
    }
}

#[derive(Clone, Debug)]
pub struct ClusterInfo {
    pub group_key: String,
    pub member_count: usize,
}

#[derive(Clone, Debug)]
pub struct GraphEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub strength: f32,
    pub kind: EdgeKind,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(1.0),
            height: height.max(1.0),
        }
    }

    pub fn center(self) -> Vec2 {
        vec2(self.width * 0.5, self.height * 0.5)
    }
}
