use crate::engine::LayoutMode;

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn fps_display_text(&self) -> Option<String> {
        if !self.show_stats_bar {
            return None;
        }

        let mut parts = Vec::new();

        if let Some(fps) = self.simulator.fps() {
            parts.push(format!("FPS {fps:.0}"));
        }

        if self.layout_mode == LayoutMode::Force {
            if self.last_tick_ms > 0.0 {
                parts.push(format!("tick {:.2} ms", self.last_tick_ms));
            }
            if !self.simulator.is_running() {
                parts.push("sim parked".to_owned());
            }
        }

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" | "))
        }
    }

    pub(in crate::app) fn visible_graph_text(&self) -> Option<String> {
        self.graph_cache.as_ref().map(|_| {
            if self.positions.is_empty() {
                format!(
                    "visible graph: {} nodes / {} edges",
                    self.visible_node_count, self.visible_edge_count
                )
            } else {
                format!(
                    "visible graph: {} nodes / {} edges / {} seeded",
                    self.visible_node_count,
                    self.visible_edge_count,
                    self.positions.len()
                )
            }
        })
    }
}
