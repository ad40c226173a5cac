use std::collections::HashSet;
use std::time::Instant;

use eframe::egui::{self, Align2, Color32, FontId, Sense, Stroke, Ui, Vec2, vec2};

use crate::engine::{LayoutMode, PositionStore, Viewport};

use super::super::render_utils::{
    blend_color, category_color, dim_color, draw_background, edge_color, edge_on_screen,
    node_radius, world_to_screen,
};
use super::super::{RenderGraph, ViewModel, ViewScratch};

impl ViewModel {
    fn update_screen_space(
        rect: egui::Rect,
        pan: Vec2,
        zoom: f32,
        positions: &PositionStore,
        cache: &mut RenderGraph,
    ) {
        let scratch = &mut cache.view_scratch;
        scratch.screen_positions.clear();
        scratch.screen_radii.clear();
        for node in &cache.visible.nodes {
            // A node the seeding pass has not reached yet simply does not
            // render this frame.
            scratch.screen_positions.push(
                positions
                    .get(&node.id)
                    .map(|entry| world_to_screen(rect, pan, zoom, entry.pos)),
            );
            scratch
                .screen_radii
                .push((node_radius(node) * zoom.powf(0.40)).clamp(2.5, 46.0));
        }
    }

    fn ensure_draw_order(cache: &mut RenderGraph) {
        let ViewScratch {
            draw_order,
            screen_radii,
            visible_indices,
            ..
        } = &mut cache.view_scratch;

        draw_order.clear();
        draw_order.extend(visible_indices.iter().copied());
        draw_order.sort_by(|a, b| screen_radii[*a].total_cmp(&screen_radii[*b]));
    }

    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        draw_background(&painter, rect, self.pan, self.zoom);

        self.viewport = Viewport::new(rect.width(), rect.height());
        self.handle_graph_zoom(ui, rect, &response);
        self.handle_graph_pan(&response);

        if self.graph_dirty {
            self.rebuild_render_graph();
        }

        let pan = self.pan;
        let zoom = self.zoom;
        let viewport = self.viewport;
        let frame_delta_seconds = ui
            .ctx()
            .input(|input| input.stable_dt)
            .clamp(1.0 / 240.0, 1.0 / 20.0);

        let Some(cache) = self.graph_cache.as_mut() else {
            return;
        };

        if cache.visible.nodes.is_empty() {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "No contacts match the current filters.",
                FontId::proportional(14.0),
                Color32::from_gray(160),
            );
            return;
        }

        let mut simulation_moving = false;
        if self.layout_mode == LayoutMode::Force && self.simulator.is_running() {
            let tick_started = Instant::now();
            simulation_moving = self.simulator.tick(
                &cache.visible,
                &mut self.positions,
                viewport,
                frame_delta_seconds,
            );
            self.last_tick_ms = tick_started.elapsed().as_secs_f32() * 1000.0;
        }

        if simulation_moving || response.dragged() {
            ui.ctx().request_repaint();
        }

        Self::update_screen_space(rect, pan, zoom, &self.positions, cache);
        Self::visible_indices_into(
            rect,
            &cache.view_scratch.screen_positions,
            &cache.view_scratch.screen_radii,
            &mut cache.view_scratch.visible_indices,
        );

        let hovered = Self::hovered_index(
            ui,
            &cache.view_scratch.visible_indices,
            &cache.view_scratch.screen_positions,
            &cache.view_scratch.screen_radii,
        );
        let hovered_index = hovered.map(|(index, _)| index);
        self.hovered = hovered_index.and_then(|index| {
            cache
                .visible
                .nodes
                .get(index)
                .map(|node| node.id.clone())
        });

        if hovered.is_some() {
            ui.output_mut(|output| {
                output.cursor_icon = egui::CursorIcon::PointingHand;
            });
        }

        let pending_selection = if response.clicked_by(egui::PointerButton::Primary) {
            Some(hovered_index)
        } else {
            None
        };

        let selected_index = self
            .selected
            .as_deref()
            .and_then(|id| cache.index_by_id.get(id).copied());
        let highlight = selected_index.map(|index| {
            let mut related = cache.neighbors[index]
                .iter()
                .copied()
                .collect::<HashSet<_>>();
            related.insert(index);
            related
        });

        let zoom_sqrt = zoom.sqrt();
        for edge in &cache.visible.edges {
            let (Some(&source), Some(&target)) = (
                cache.index_by_id.get(edge.source.as_str()),
                cache.index_by_id.get(edge.target.as_str()),
            ) else {
                continue;
            };
            let (Some(start), Some(end)) = (
                cache.view_scratch.screen_positions[source],
                cache.view_scratch.screen_positions[target],
            ) else {
                continue;
            };
            if !edge_on_screen(rect, start, end, 2.5) {
                continue;
            }

            let touches_selection =
                selected_index.is_some_and(|index| source == index || target == index);
            let base = edge_color(edge.kind);
            let (line_width, line_color) = if touches_selection {
                (
                    ((1.0 + edge.strength * 2.6) * zoom_sqrt).clamp(1.2, 4.6),
                    blend_color(base, Color32::from_rgb(245, 206, 93), 0.55),
                )
            } else if highlight.is_some() {
                (
                    ((0.6 + edge.strength * 1.8) * zoom_sqrt).clamp(0.4, 3.0),
                    dim_color(base, 0.45),
                )
            } else {
                (
                    ((0.6 + edge.strength * 2.2) * zoom_sqrt).clamp(0.5, 3.6),
                    base,
                )
            };

            painter.line_segment([start, end], Stroke::new(line_width, line_color));
        }

        let selected_color = Color32::from_rgb(245, 206, 93);
        Self::ensure_draw_order(cache);
        for index in cache.view_scratch.draw_order.iter().copied() {
            let node = &cache.visible.nodes[index];
            let Some(position) = cache.view_scratch.screen_positions[index] else {
                continue;
            };
            let radius = cache.view_scratch.screen_radii[index];

            let is_selected = selected_index == Some(index);
            let is_hovered = hovered_index == Some(index);
            let is_related = highlight.as_ref().is_some_and(|set| set.contains(&index));

            let base_color = category_color(&node.category);
            let color = if is_selected {
                selected_color
            } else if is_hovered {
                blend_color(base_color, Color32::from_rgb(255, 164, 101), 0.65)
            } else if is_related {
                blend_color(base_color, Color32::from_rgb(246, 180, 92), 0.40)
            } else if highlight.is_some() {
                dim_color(base_color, 0.50)
            } else {
                base_color
            };

            painter.circle_filled(position, radius, color);
            let stroke_width = if is_selected {
                2.0
            } else if node.is_cluster() {
                1.6
            } else {
                1.0
            };
            painter.circle_stroke(
                position,
                radius,
                Stroke::new(stroke_width, Color32::from_rgba_unmultiplied(15, 15, 15, 190)),
            );

            if let Some(info) = &node.cluster {
                painter.text(
                    position,
                    Align2::CENTER_CENTER,
                    info.member_count.to_string(),
                    FontId::proportional((radius * 0.9).clamp(9.0, 16.0)),
                    Color32::from_gray(20),
                );
            }

            let should_draw_label = is_selected
                || is_hovered
                || is_related
                || node.is_cluster()
                || radius > 17.0
                || zoom > 1.35;
            if should_draw_label {
                painter.text(
                    position + vec2(radius + 5.0, 0.0),
                    Align2::LEFT_CENTER,
                    node.name.as_str(),
                    FontId::proportional(12.0),
                    Color32::from_gray(238),
                );
            }
        }

        if let Some(index) = hovered_index
            && let Some(node) = cache.visible.nodes.get(index)
        {
            let status = if let Some(info) = &node.cluster {
                format!(
                    "{}  |  {} members  |  avg trust {:.0}",
                    node.name, info.member_count, node.trust_score
                )
            } else if node.title.is_empty() {
                format!(
                    "{}  |  trust {:.0} ({})  |  {} connections",
                    node.name,
                    node.trust_score,
                    node.strength.label(),
                    self.network.connection_count(&node.id)
                )
            } else {
                format!(
                    "{}  |  {}  |  trust {:.0} ({})  |  {} connections",
                    node.name,
                    node.title,
                    node.trust_score,
                    node.strength.label(),
                    self.network.connection_count(&node.id)
                )
            };
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                status,
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
        }

        if let Some(clicked) = pending_selection {
            self.apply_graph_selection(clicked);
        }
    }
}
