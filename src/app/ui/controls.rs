use eframe::egui::{ComboBox, Slider, Ui};

use crate::engine::{EdgeKind, GroupKey, LayoutMode, SIMULATION_BUDGET_SECS};

use super::super::ViewModel;
use super::super::render_utils::edge_color;

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Layout");
        ui.add_space(4.0);

        let mut layout_changed = false;
        ComboBox::from_label("Mode")
            .selected_text(self.layout_mode.label())
            .show_ui(ui, |ui| {
                for mode in LayoutMode::ALL {
                    layout_changed |= ui
                        .selectable_value(&mut self.layout_mode, mode, mode.label())
                        .changed();
                }
            });
        if layout_changed {
            // Each mode has its own seeding formula; stale coordinates from
            // the previous mode would make the new one meaningless.
            self.positions.reset();
            self.graph_dirty = true;
        }

        let mut grouping_changed = false;
        ComboBox::from_label("Group by")
            .selected_text(self.grouping.label())
            .show_ui(ui, |ui| {
                for grouping in GroupKey::ALL {
                    grouping_changed |= ui
                        .selectable_value(&mut self.grouping, grouping, grouping.label())
                        .changed();
                }
            });
        if grouping_changed {
            // Expanded-group keys are scoped to the old grouping.
            self.expanded_groups.clear();
            self.graph_dirty = true;
        }

        if ui
            .add(Slider::new(&mut self.render_limit, 10..=500).text("Render limit"))
            .changed()
        {
            self.graph_dirty = true;
        }
        if ui
            .add(Slider::new(&mut self.edge_limit, 50..=1000).text("Edge limit"))
            .changed()
        {
            self.graph_dirty = true;
        }
        if ui
            .add(Slider::new(&mut self.cluster_threshold, 2..=20).text("Cluster threshold"))
            .changed()
        {
            self.graph_dirty = true;
        }
        if ui.checkbox(&mut self.show_all_nodes, "Show all nodes").changed() {
            self.graph_dirty = true;
        }

        if !self.expanded_groups.is_empty() {
            let label = if self.expanded_groups.len() == 1 {
                "Collapse 1 expanded cluster".to_owned()
            } else {
                format!("Collapse {} expanded clusters", self.expanded_groups.len())
            };
            if ui.button(label).clicked() {
                self.collapse_expanded_clusters();
            }
        }

        ui.add_space(8.0);
        ui.separator();
        ui.heading("Filters");
        ui.add_space(4.0);

        ui.label("Search");
        if ui.text_edit_singleline(&mut self.search).changed() {
            self.graph_dirty = true;
        }

        let categories = self.network.categories();
        let selected_category = self
            .category_filter
            .clone()
            .unwrap_or_else(|| "All categories".to_owned());
        let mut category_changed = false;
        ComboBox::from_label("Category")
            .selected_text(selected_category)
            .show_ui(ui, |ui| {
                category_changed |= ui
                    .selectable_value(&mut self.category_filter, None, "All categories")
                    .changed();
                for category in categories {
                    category_changed |= ui
                        .selectable_value(
                            &mut self.category_filter,
                            Some(category.clone()),
                            &category,
                        )
                        .changed();
                }
            });
        if category_changed {
            self.graph_dirty = true;
        }

        if ui
            .add(Slider::new(&mut self.min_trust, 0.0..=100.0).text("Min trust score"))
            .changed()
        {
            self.graph_dirty = true;
        }
        if ui
            .add(Slider::new(&mut self.min_strength, 0.0..=1.0).text("Min edge strength"))
            .changed()
        {
            self.graph_dirty = true;
        }

        ui.add_space(8.0);
        ui.separator();
        ui.heading("Simulation");
        ui.add_space(4.0);

        match self.layout_mode {
            LayoutMode::Force => {
                if self.simulator.is_running() {
                    ui.label(format!(
                        "running, {:.1}s of {:.0}s budget",
                        self.simulator.elapsed_secs(),
                        SIMULATION_BUDGET_SECS
                    ));
                    if ui.button("Pause").clicked() {
                        self.simulator.stop();
                    }
                } else {
                    ui.label("parked");
                    if ui.button("Resume").clicked() {
                        self.simulator.start();
                        ui.ctx().request_repaint();
                    }
                }
            }
            LayoutMode::Cluster | LayoutMode::Hierarchy => {
                ui.label("static layout, no simulation");
            }
        }

        if ui.button("Re-seed layout").clicked() {
            self.positions.reset();
            self.graph_dirty = true;
        }

        ui.add_space(8.0);
        ui.separator();
        ui.horizontal(|ui| {
            ui.label("Edges:");
            for kind in [EdgeKind::Direct, EdgeKind::Mutual, EdgeKind::Introduction] {
                ui.colored_label(edge_color(kind), kind.label());
            }
        });
        ui.checkbox(&mut self.show_stats_bar, "Show frame stats");
    }
}
