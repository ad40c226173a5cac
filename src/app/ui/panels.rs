use std::collections::HashSet;

use eframe::egui::{self, Align, Context, Layout, Vec2};

use crate::data::Network;
use crate::engine::{ClusterConfig, GroupKey, LayoutMode, PositionStore, Simulator, Viewport};

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn new(network: Network) -> Self {
        let cluster_defaults = ClusterConfig::default();

        Self {
            network,
            layout_mode: LayoutMode::Force,
            grouping: GroupKey::Category,
            render_limit: cluster_defaults.render_limit,
            edge_limit: cluster_defaults.edge_limit,
            cluster_threshold: cluster_defaults.cluster_threshold,
            show_all_nodes: false,
            expanded_groups: HashSet::new(),
            search: String::new(),
            category_filter: None,
            min_trust: 0.0,
            min_strength: 0.0,
            selected: None,
            hovered: None,
            pan: Vec2::ZERO,
            zoom: 1.0,
            viewport: Viewport::new(1280.0, 800.0),
            positions: PositionStore::default(),
            simulator: Simulator::new(),
            graph_dirty: true,
            graph_cache: None,
            last_tick_ms: 0.0,
            visible_node_count: 0,
            visible_edge_count: 0,
            show_stats_bar: true,
        }
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        network_path: &str,
        reload_requested: &mut bool,
        is_loading: bool,
    ) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("rhiz");
                    ui.separator();
                    ui.label(format!("network: {network_path}"));
                    ui.label(format!("contacts: {}", self.network.contact_count()));
                    ui.label(format!(
                        "relationships: {}",
                        self.network.relationship_count()
                    ));
                    let reload_button =
                        ui.add_enabled(!is_loading, egui::Button::new("Reload network"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if let Some(visible_graph_text) = self.visible_graph_text() {
                            ui.label(visible_graph_text);
                        }
                        if let Some(fps_text) = self.fps_display_text() {
                            ui.label(fps_text);
                        }
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(340.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            if is_loading {
                ui.vertical_centered(|ui| {
                    ui.add_space(120.0);
                    ui.heading("Loading relationship network...");
                    ui.add_space(8.0);
                    ui.spinner();
                });
            } else {
                self.draw_graph(ui);
            }
        });
    }

    pub(in crate::app) fn set_selected(&mut self, selected: Option<String>) {
        if self.selected == selected {
            return;
        }

        // Selection feeds the clustering importance set, so the visible graph
        // is recomputed on the next frame.
        self.selected = selected;
        self.graph_dirty = true;
    }
}
