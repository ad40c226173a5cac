use eframe::egui::{self, Pos2, Rect, Ui};

use super::super::ViewModel;
use super::super::render_utils::{circle_visible, screen_to_world};

pub(in crate::app) const MIN_ZOOM: f32 = 0.5;
pub(in crate::app) const MAX_ZOOM: f32 = 3.0;

impl ViewModel {
    pub(in crate::app) fn handle_graph_zoom(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let world_before = screen_to_world(rect, self.pan, self.zoom, pointer);

        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.zoom = (self.zoom * zoom_factor).clamp(MIN_ZOOM, MAX_ZOOM);
        self.pan = pointer - rect.left_top() - (world_before * self.zoom);
    }

    pub(in crate::app) fn handle_graph_pan(&mut self, response: &egui::Response) {
        if response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            self.pan += response.drag_delta();
        }
    }

    pub(in crate::app) fn visible_indices_into(
        rect: Rect,
        screen_positions: &[Option<Pos2>],
        screen_radii: &[f32],
        out: &mut Vec<usize>,
    ) {
        out.clear();
        out.extend((0..screen_positions.len()).filter(|&index| {
            screen_positions[index]
                .is_some_and(|position| circle_visible(rect, position, screen_radii[index]))
        }));
    }

    pub(in crate::app) fn hovered_index(
        ui: &Ui,
        visible_indices: &[usize],
        screen_positions: &[Option<Pos2>],
        screen_radii: &[f32],
    ) -> Option<(usize, f32)> {
        let pointer_pos = ui.input(|input| input.pointer.hover_pos());
        pointer_pos.and_then(|pointer| {
            visible_indices
                .iter()
                .filter_map(|&index| {
                    let position = screen_positions[index]?;
                    let distance = position.distance(pointer);
                    if distance <= screen_radii[index] {
                        Some((index, distance))
                    } else {
                        None
                    }
                })
                .min_by(|a, b| a.1.total_cmp(&b.1))
        })
    }

    /// Click routing: clusters expand, contacts select, empty space clears.
    pub(in crate::app) fn apply_graph_selection(&mut self, clicked_index: Option<usize>) {
        let Some(index) = clicked_index else {
            self.set_selected(None);
            return;
        };

        let Some(node) = self
            .graph_cache
            .as_ref()
            .and_then(|cache| cache.visible.nodes.get(index))
        else {
            return;
        };

        if let Some(info) = &node.cluster {
            self.expand_cluster(info.group_key.clone());
        } else {
            self.set_selected(Some(node.id.clone()));
        }
    }

    pub(in crate::app) fn expand_cluster(&mut self, group_key: String) {
        if self.expanded_groups.insert(group_key) {
            self.graph_dirty = true;
        }
    }

    pub(in crate::app) fn collapse_expanded_clusters(&mut self) {
        if !self.expanded_groups.is_empty() {
            self.expanded_groups.clear();
            self.graph_dirty = true;
        }
    }
}
