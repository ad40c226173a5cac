use std::collections::HashMap;

use eframe::egui::{Vec2, vec2};

use crate::util::stable_unit_pair;

use super::{GraphNode, LayoutMode, Viewport};

const ANNULUS_RADIUS_MIN: f32 = 100.0;
const ANNULUS_RADIUS_MAX: f32 = 250.0;
const CLUSTER_RING_SCALE: f32 = 0.33;
const CLUSTER_SCATTER_RADIUS: f32 = 60.0;
const TRUST_TIERS: usize = 5;
const TIER_WRAP_SPACING: f32 = 24.0;
const SEED_SPEED: f32 = 0.5;

const SALT_POSITION: u64 = 0;
const SALT_VELOCITY: u64 = 1;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PositionEntry {
    pub pos: Vec2,
    pub vel: Vec2,
}

// Entries survive re-clustering: a node that collapses into a cluster and
// later re-expands picks up where it left off. Only ensure_seeded and the
// simulator write entries.
pub struct PositionStore {
    entries: HashMap<String, PositionEntry>,
    seed: u64,
}

impl Default for PositionStore {
    fn default() -> Self {
        Self::with_seed(0)
    }
}

impl PositionStore {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            entries: HashMap::new(),
            seed,
        }
    }

    pub fn get(&self, id: &str) -> Option<&PositionEntry> {
        self.entries.get(id)
    }

    pub(super) fn get_mut(&mut self, id: &str) -> Option<&mut PositionEntry> {
        self.entries.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn reset(&mut self) {
        self.entries.clear();
    }

    // Seeds only missing entries; calling twice with the same visible set
    // moves nothing.
    pub fn ensure_seeded(&mut self, nodes: &[GraphNode], mode: LayoutMode, viewport: Viewport) {
        match mode {
            LayoutMode::Force => self.seed_annulus(nodes, viewport),
            LayoutMode::Cluster => self.seed_category_rings(nodes, viewport),
            LayoutMode::Hierarchy => self.seed_trust_tiers(nodes, viewport),
        }
    }

    fn seed_annulus(&mut self, nodes: &[GraphNode], viewport: Viewport) {
        let center = viewport.center();
        for node in nodes {
            if self.entries.contains_key(&node.id) {
                continue;
            }

            let (angle_unit, radius_unit) = stable_unit_pair(self.seed, SALT_POSITION, &node.id);
            let angle = angle_unit * std::f32::consts::PI;
            let radius = ANNULUS_RADIUS_MIN
                + ((radius_unit + 1.0) * 0.5) * (ANNULUS_RADIUS_MAX - ANNULUS_RADIUS_MIN);
            let pos = center + vec2(angle.cos(), angle.sin()) * radius;
            self.insert_seeded(&node.id, pos);
        }
    }

    fn seed_category_rings(&mut self, nodes: &[GraphNode], viewport: Viewport) {
        // Category centers depend on the full visible set, in first-appearance
        // order, so already-seeded nodes keep their group center stable.
        let mut categories: Vec<&str> = Vec::new();
        for node in nodes {
            if !categories.contains(&node.category.as_str()) {
                categories.push(&node.category);
            }
        }
        if categories.is_empty() {
            return;
        }

        let center = viewport.center();
        let ring_radius = viewport.width.min(viewport.height) * CLUSTER_RING_SCALE;
        let slice = std::f32::consts::TAU / categories.len() as f32;

        for node in nodes {
            if self.entries.contains_key(&node.id) {
                continue;
            }

            let slot = categories
                .iter()
                .position(|category| *category == node.category.as_str())
                .unwrap_or(0);
            let angle = slice * slot as f32;
            let group_center = center + vec2(angle.cos(), angle.sin()) * ring_radius;

            let (jx, jy) = stable_unit_pair(self.seed, SALT_POSITION, &node.id);
            let pos = group_center + vec2(jx, jy) * CLUSTER_SCATTER_RADIUS;
            self.insert_seeded(&node.id, pos);
        }
    }

    fn seed_trust_tiers(&mut self, nodes: &[GraphNode], viewport: Viewport) {
        if nodes.is_empty() {
            return;
        }

        let columns = nodes.len().div_ceil(TRUST_TIERS).max(1);
        let column_spacing = viewport.width / (columns + 1) as f32;
        let row_spacing = viewport.height / (TRUST_TIERS + 1) as f32;

        // Slots are assigned over the whole visible set so a node's place in
        // its tier does not depend on which nodes happen to be unseeded.
        let mut tier_counts = [0usize; TRUST_TIERS];
        for node in nodes {
            let tier = trust_tier(node.trust_score);
            let slot = tier_counts[tier];
            tier_counts[tier] += 1;

            if self.entries.contains_key(&node.id) {
                continue;
            }

            let row = TRUST_TIERS - 1 - tier;
            let column = slot % columns;
            let wrap = (slot / columns) as f32;
            let pos = vec2(
                column_spacing * (column + 1) as f32,
                row_spacing * (row + 1) as f32 + wrap * TIER_WRAP_SPACING,
            );
            self.insert_seeded(&node.id, pos);
        }
    }

    fn insert_seeded(&mut self, id: &str, pos: Vec2) {
        let (vx, vy) = stable_unit_pair(self.seed, SALT_VELOCITY, id);
        self.entries.insert(
            id.to_string(),
            PositionEntry {
                pos,
                vel: vec2(vx, vy) * SEED_SPEED,
            },
        );
    }
}

fn trust_tier(score: f32) -> usize {
    ((score / 20.0).floor() as usize).min(TRUST_TIERS - 1)
}
