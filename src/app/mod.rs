use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context, Pos2, Vec2};

use crate::data::{Network, load_network};
use crate::engine::{
    GroupKey, LayoutMode, PositionStore, Simulator, Viewport, VisibleGraph,
};

mod graph;
mod render_utils;
mod ui;

pub struct RhizApp {
    network_path: String,
    state: AppState,
    reload_rx: Option<Receiver<Result<Network, String>>>,
}

enum AppState {
    Loading {
        rx: Receiver<Result<Network, String>>,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    network: Network,
    layout_mode: LayoutMode,
    grouping: GroupKey,
    render_limit: usize,
    edge_limit: usize,
    cluster_threshold: usize,
    show_all_nodes: bool,
    expanded_groups: HashSet<String>,
    search: String,
    category_filter: Option<String>,
    min_trust: f32,
    min_strength: f32,
    selected: Option<String>,
    hovered: Option<String>,
    pan: Vec2,
    zoom: f32,
    viewport: Viewport,
    positions: PositionStore,
    simulator: Simulator,
    graph_dirty: bool,
    graph_cache: Option<RenderGraph>,
    last_tick_ms: f32,
    visible_node_count: usize,
    visible_edge_count: usize,
    show_stats_bar: bool,
}

struct RenderGraph {
    visible: VisibleGraph,
    index_by_id: HashMap<String, usize>,
    neighbors: Vec<Vec<usize>>,
    view_scratch: ViewScratch,
}

#[derive(Default)]
struct ViewScratch {
    screen_positions: Vec<Option<Pos2>>,
    screen_radii: Vec<f32>,
    visible_indices: Vec<usize>,
    draw_order: Vec<usize>,
}

impl RhizApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, network_path: String) -> Self {
        let state = Self::start_load(network_path.clone());
        Self {
            network_path,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(network_path: String) -> Receiver<Result<Network, String>> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result =
                load_network(Path::new(&network_path)).map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(network_path: String) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(network_path),
        }
    }
}

impl eframe::App for RhizApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                if let Ok(result) = rx.try_recv() {
                    transition = Some(match result {
                        Ok(network) => AppState::Ready(Box::new(ViewModel::new(network))),
                        Err(error) => AppState::Error(error),
                    });
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading relationship network...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load relationship network");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start_load(self.network_path.clone()));
                    }
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, &self.network_path, &mut reload_requested, is_reloading);

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(self.network_path.clone()));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(result) => {
                            transition = Some(match result {
                                Ok(network) => AppState::Ready(Box::new(ViewModel::new(network))),
                                Err(error) => AppState::Error(error),
                            });
                        }
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                        }
                        Err(TryRecvError::Disconnected) => {
                            transition = Some(AppState::Error(
                                "Background load worker disconnected".to_owned(),
                            ));
                        }
                    }
                }
            }
        }

        if let Some(next_state) = transition {
            self.reload_rx = None;
            self.state = next_state;
        }
    }
}
