use std::collections::{HashMap, VecDeque};

use eframe::egui::Vec2;

use super::{PositionStore, Viewport, VisibleGraph};

pub const SIMULATION_BUDGET_SECS: f32 = 10.0;

const FPS_SAMPLE_WINDOW: usize = 10;

// Tuned empirically.
const CENTER_GRAVITY: f32 = 0.01;
const GRAVITY_RANGE: f32 = 200.0;
const REPULSION_STRENGTH: f32 = 500.0;
const REPULSION_RADIUS: f32 = 200.0;
const MAX_REPULSION: f32 = 10.0;
const SPRING_STRENGTH: f32 = 0.05;
const VELOCITY_RETENTION: f32 = 0.9;
const FORCE_BLEND: f32 = 0.1;
const STEP_SIZE: f32 = 0.5;
const BOUNDARY_PADDING: f32 = 50.0;
const BOUNCE_RETENTION: f32 = 0.5;
const MIN_DISTANCE_SQ: f32 = 1e-6;

#[derive(Default)]
struct TickScratch {
    index_by_id: HashMap<String, usize>,
    positions: Vec<Vec2>,
    forces: Vec<Vec2>,
}

// Scheduler-agnostic: the host drives tick from whatever frame loop it has,
// and tests drive it from a plain loop.
pub struct Simulator {
    running: bool,
    elapsed_secs: f32,
    frame_deltas: VecDeque<f32>,
    scratch: TickScratch,
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Simulator {
    pub fn new() -> Self {
        Self {
            running: false,
            elapsed_secs: 0.0,
            frame_deltas: VecDeque::with_capacity(FPS_SAMPLE_WINDOW),
            scratch: TickScratch::default(),
        }
    }

    pub fn start(&mut self) {
        self.running = true;
        self.elapsed_secs = 0.0;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed_secs
    }

    // Rolling average over the last ten tick deltas. Reporting only.
    pub fn fps(&self) -> Option<f32> {
        let total = self.frame_deltas.iter().sum::<f32>();
        if self.frame_deltas.is_empty() || total <= f32::EPSILON {
            None
        } else {
            Some(self.frame_deltas.len() as f32 / total)
        }
    }

    // Returns false once stopped (including the tick that exhausts the
    // budget), which tells the host to stop scheduling frames.
    pub fn tick(
        &mut self,
        visible: &VisibleGraph,
        positions: &mut PositionStore,
        viewport: Viewport,
        dt_secs: f32,
    ) -> bool {
        if !self.running {
            return false;
        }

        if dt_secs > f32::EPSILON {
            self.frame_deltas.push_back(dt_secs);
            while self.frame_deltas.len() > FPS_SAMPLE_WINDOW {
                self.frame_deltas.pop_front();
            }
        }

        self.step(visible, positions, viewport);

        self.elapsed_secs += dt_secs;
        if self.elapsed_secs >= SIMULATION_BUDGET_SECS {
            self.running = false;
        }
        self.running
    }

    fn step(&mut self, visible: &VisibleGraph, positions: &mut PositionStore, viewport: Viewport) {
        let scratch = &mut self.scratch;
        scratch.index_by_id.clear();
        scratch.positions.clear();

        // Forces are computed against this snapshot, never against positions
        // mutated earlier in the same tick; otherwise iteration order would
        // bias the layout. Nodes the seeding pass has not reached yet are
        // skipped for the frame.
        for node in &visible.nodes {
            if let Some(entry) = positions.get(&node.id) {
                scratch
                    .index_by_id
                    .insert(node.id.clone(), scratch.positions.len());
                scratch.positions.push(entry.pos);
            }
        }

        let count = scratch.positions.len();
        scratch.forces.resize(count, Vec2::ZERO);
        scratch.forces.fill(Vec2::ZERO);

        let center = viewport.center();
        for (index, &pos) in scratch.positions.iter().enumerate() {
            let delta = center - pos;
            let distance_sq = delta.length_sq();
            if distance_sq > MIN_DISTANCE_SQ {
                let distance = distance_sq.sqrt();
                scratch.forces[index] +=
                    delta * (CENTER_GRAVITY * (distance / GRAVITY_RANGE).max(1.0));
            }
        }

        for first in 0..count {
            for second in (first + 1)..count {
                if let Some(push) =
                    repulsion_between(scratch.positions[first], scratch.positions[second])
                {
                    scratch.forces[first] += push;
                    scratch.forces[second] -= push;
                }
            }
        }

        for edge in &visible.edges {
            let (Some(&source), Some(&target)) = (
                scratch.index_by_id.get(edge.source.as_str()),
                scratch.index_by_id.get(edge.target.as_str()),
            ) else {
                continue;
            };

            let delta = scratch.positions[target] - scratch.positions[source];
            let pull = delta * (SPRING_STRENGTH * edge.strength);
            scratch.forces[source] += pull;
            scratch.forces[target] -= pull;
        }

        let max_x = (viewport.width - BOUNDARY_PADDING).max(BOUNDARY_PADDING);
        let max_y = (viewport.height - BOUNDARY_PADDING).max(BOUNDARY_PADDING);

        for node in &visible.nodes {
            let Some(&index) = scratch.index_by_id.get(node.id.as_str()) else {
                continue;
            };
            let Some(entry) = positions.get_mut(&node.id) else {
                continue;
            };

            let mut velocity =
                entry.vel * VELOCITY_RETENTION + scratch.forces[index] * FORCE_BLEND;
            let mut pos = scratch.positions[index] + velocity * STEP_SIZE;

            if pos.x < BOUNDARY_PADDING {
                pos.x = BOUNDARY_PADDING;
                velocity.x = -velocity.x * BOUNCE_RETENTION;
            } else if pos.x > max_x {
                pos.x = max_x;
                velocity.x = -velocity.x * BOUNCE_RETENTION;
            }
            if pos.y < BOUNDARY_PADDING {
                pos.y = BOUNDARY_PADDING;
                velocity.y = -velocity.y * BOUNCE_RETENTION;
            } else if pos.y > max_y {
                pos.y = max_y;
                velocity.y = -velocity.y * BOUNCE_RETENTION;
            }

            debug_assert!(
                pos.x.is_finite() && pos.y.is_finite(),
                "non-finite position for {}",
                node.id
            );
            if !(pos.x.is_finite()
                && pos.y.is_finite()
                && velocity.x.is_finite()
                && velocity.y.is_finite())
            {
                continue;
            }

            entry.pos = pos;
            entry.vel = velocity;
        }
    }
}

// Force on the first point; None when the pair is out of range or coincident
// (a coincident pair would divide by zero).
fn repulsion_between(a: Vec2, b: Vec2) -> Option<Vec2> {
    let delta = a - b;
    let distance_sq = delta.length_sq();
    if distance_sq > REPULSION_RADIUS * REPULSION_RADIUS || distance_sq <= MIN_DISTANCE_SQ {
        return None;
    }

    let distance = distance_sq.sqrt();
    let magnitude = (REPULSION_STRENGTH / distance_sq).min(MAX_REPULSION);
    Some((delta / distance) * magnitude)
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use super::super::test_support::{contact, relationship};
    use super::super::{
        ClusterConfig, LayoutMode, PositionStore, Viewport, compute_visible,
    };
    use super::{
        BOUNDARY_PADDING, MAX_REPULSION, SIMULATION_BUDGET_SECS, Simulator, repulsion_between,
    };

    const DT: f32 = 1.0 / 60.0;

    fn viewport() -> Viewport {
        Viewport::new(1000.0, 700.0)
    }

    fn seeded_world(node_count: usize) -> (super::super::VisibleGraph, PositionStore) {
        let nodes = (0..node_count)
            .map(|i| contact(&format!("c{i}"), &format!("cat{}", i % 4), (i % 100) as f32))
            .collect::<Vec<_>>();
        let edges = (0..node_count.saturating_sub(1))
            .map(|i| relationship(&format!("e{i}"), &format!("c{i}"), &format!("c{}", i + 1), 0.6))
            .collect::<Vec<_>>();
        let visible = compute_visible(&nodes, &edges, &ClusterConfig::default());

        let mut positions = PositionStore::with_seed(17);
        positions.ensure_seeded(&visible.nodes, LayoutMode::Force, viewport());
        (visible, positions)
    }

    #[test]
    fn repulsion_is_zero_beyond_the_cutoff_radius() {
        assert!(repulsion_between(vec2(0.0, 0.0), vec2(500.0, 0.0)).is_none());
        assert!(repulsion_between(vec2(0.0, 0.0), vec2(0.0, 201.0)).is_none());
    }

    #[test]
    fn repulsion_is_capped_and_skips_coincident_pairs() {
        let close = repulsion_between(vec2(0.0, 0.0), vec2(0.1, 0.0)).expect("in range");
        assert!(close.length() <= MAX_REPULSION + 1e-3);
        assert!(repulsion_between(vec2(5.0, 5.0), vec2(5.0, 5.0)).is_none());
    }

    #[test]
    fn repulsion_points_away_from_the_other_node() {
        let push = repulsion_between(vec2(10.0, 0.0), vec2(0.0, 0.0)).expect("in range");
        assert!(push.x > 0.0);
        assert!(push.y.abs() < 1e-6);
    }

    #[test]
    fn ticks_keep_every_node_inside_the_padded_viewport() {
        let (visible, mut positions) = seeded_world(40);
        let mut simulator = Simulator::new();
        simulator.start();

        for _ in 0..300 {
            simulator.tick(&visible, &mut positions, viewport(), DT);
        }

        let max_x = viewport().width - BOUNDARY_PADDING;
        let max_y = viewport().height - BOUNDARY_PADDING;
        for node in &visible.nodes {
            let entry = positions.get(&node.id).expect("seeded");
            assert!(
                (BOUNDARY_PADDING..=max_x).contains(&entry.pos.x),
                "{} escaped on x: {}",
                node.id,
                entry.pos.x
            );
            assert!(
                (BOUNDARY_PADDING..=max_y).contains(&entry.pos.y),
                "{} escaped on y: {}",
                node.id,
                entry.pos.y
            );
        }
    }

    #[test]
    fn coincident_nodes_never_produce_non_finite_coordinates() {
        let nodes = vec![
            contact("a", "Tech", 50.0),
            contact("b", "Tech", 50.0),
            contact("c", "Tech", 50.0),
        ];
        let edges = vec![relationship("e0", "a", "b", 1.0)];
        let visible = compute_visible(&nodes, &edges, &ClusterConfig::default());

        let mut positions = PositionStore::with_seed(1);
        positions.ensure_seeded(&visible.nodes, LayoutMode::Force, viewport());
        // Force the degenerate case: all three stacked on one point.
        let stacked = positions.get("a").expect("seeded").pos;
        for id in ["b", "c"] {
            let entry = positions.get_mut(id).expect("seeded");
            entry.pos = stacked;
            entry.vel = eframe::egui::Vec2::ZERO;
        }

        let mut simulator = Simulator::new();
        for round in 0..10 {
            simulator.start();
            for _ in 0..100 {
                simulator.tick(&visible, &mut positions, viewport(), DT);
            }
            for node in &visible.nodes {
                let entry = positions.get(&node.id).expect("seeded");
                assert!(
                    entry.pos.x.is_finite()
                        && entry.pos.y.is_finite()
                        && entry.vel.x.is_finite()
                        && entry.vel.y.is_finite(),
                    "non-finite state for {} after round {round}",
                    node.id
                );
            }
        }
    }

    #[test]
    fn simulator_stops_after_the_wall_clock_budget() {
        let (visible, mut positions) = seeded_world(5);
        let mut simulator = Simulator::new();
        simulator.start();

        let mut ticks = 0usize;
        while simulator.tick(&visible, &mut positions, viewport(), 0.5) {
            ticks += 1;
            assert!(ticks < 1000, "budget never expired");
        }

        assert!(!simulator.is_running());
        assert!(simulator.elapsed_secs() >= SIMULATION_BUDGET_SECS);
        // 0.5s per tick against a 10s budget; the twentieth tick parks it.
        assert_eq!(ticks, 19);
    }

    #[test]
    fn restart_resets_the_budget() {
        let (visible, mut positions) = seeded_world(3);
        let mut simulator = Simulator::new();
        simulator.start();
        for _ in 0..200 {
            simulator.tick(&visible, &mut positions, viewport(), 0.1);
        }
        assert!(!simulator.is_running());

        simulator.start();
        assert!(simulator.is_running());
        assert_eq!(simulator.elapsed_secs(), 0.0);
        assert!(simulator.tick(&visible, &mut positions, viewport(), DT));
    }

    #[test]
    fn stopped_simulator_mutates_nothing() {
        let (visible, mut positions) = seeded_world(10);
        let before = visible
            .nodes
            .iter()
            .map(|node| *positions.get(&node.id).expect("seeded"))
            .collect::<Vec<_>>();

        let mut simulator = Simulator::new();
        assert!(!simulator.tick(&visible, &mut positions, viewport(), DT));

        for (node, earlier) in visible.nodes.iter().zip(before) {
            assert_eq!(*positions.get(&node.id).expect("seeded"), earlier);
        }
    }

    #[test]
    fn missing_position_entries_are_skipped_not_fatal() {
        let (visible, _) = seeded_world(6);
        let mut positions = PositionStore::with_seed(17);
        // Deliberately unseeded: every lookup misses.
        let mut simulator = Simulator::new();
        simulator.start();
        assert!(simulator.tick(&visible, &mut positions, viewport(), DT));
        assert!(positions.is_empty());
    }

    #[test]
    fn fps_is_the_rolling_average_of_recent_deltas() {
        let (visible, mut positions) = seeded_world(2);
        let mut simulator = Simulator::new();
        simulator.start();
        assert!(simulator.fps().is_none());

        for _ in 0..30 {
            simulator.tick(&visible, &mut positions, viewport(), 1.0 / 50.0);
        }
        let fps = simulator.fps().expect("samples recorded");
        assert!((fps - 50.0).abs() < 0.5, "fps {fps}");
    }

    #[test]
    fn connected_nodes_pull_toward_each_other() {
        let nodes = vec![contact("a", "Tech", 50.0), contact("b", "Tech", 50.0)];
        let edges = vec![relationship("e0", "a", "b", 1.0)];
        let visible = compute_visible(&nodes, &edges, &ClusterConfig::default());

        let mut positions = PositionStore::with_seed(0);
        positions.ensure_seeded(&visible.nodes, LayoutMode::Force, viewport());
        let center = viewport().center();
        // Symmetric about center and outside repulsion range.
        if let Some(entry) = positions.get_mut("a") {
            entry.pos = center + vec2(-220.0, 0.0);
            entry.vel = eframe::egui::Vec2::ZERO;
        }
        if let Some(entry) = positions.get_mut("b") {
            entry.pos = center + vec2(220.0, 0.0);
            entry.vel = eframe::egui::Vec2::ZERO;
        }

        let gap_before = 440.0;
        let mut simulator = Simulator::new();
        simulator.start();
        for _ in 0..20 {
            simulator.tick(&visible, &mut positions, viewport(), DT);
        }

        let gap_after = (positions.get("a").expect("seeded").pos
            - positions.get("b").expect("seeded").pos)
            .length();
        assert!(gap_after < gap_before, "spring never pulled: {gap_after}");
    }
}
