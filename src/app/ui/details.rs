use eframe::egui::{RichText, Ui};

use crate::engine::RelationshipStrength;

use super::super::ViewModel;

struct RelatedEntry {
    id: String,
    label: String,
    cluster_group: Option<String>,
}

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Selection");
        ui.add_space(6.0);

        let Some(selected_id) = self.selected.clone() else {
            ui.label("Click a contact in the graph to inspect it.");
            ui.label("Clicking a cluster expands its members.");
            return;
        };

        let Some(contact) = self.network.contacts.get(&selected_id).cloned() else {
            ui.label("Selected contact no longer exists in the loaded network.");
            if ui.button("Clear selection").clicked() {
                self.set_selected(None);
            }
            return;
        };

        ui.label(RichText::new(contact.name.as_str()).strong());
        let role = match (contact.title.is_empty(), contact.company.is_empty()) {
            (false, false) => format!("{} @ {}", contact.title, contact.company),
            (false, true) => contact.title.clone(),
            (true, false) => contact.company.clone(),
            (true, true) => String::new(),
        };
        if !role.is_empty() {
            ui.small(role);
        }
        ui.add_space(6.0);

        ui.label(format!("Category: {}", contact.category));
        ui.label(format!(
            "Trust score: {:.0} / 100 ({})",
            contact.trust_score,
            RelationshipStrength::from_trust(contact.trust_score).label()
        ));
        ui.label(format!(
            "Connections: {}",
            self.network.connection_count(&contact.id)
        ));
        if let Some(email) = &contact.email {
            ui.label(format!("Email: {email}"));
        }
        if let Some(last_contacted) = &contact.last_contacted {
            ui.label(format!("Last contacted: {last_contacted}"));
        }
        if let Some(notes) = &contact.notes {
            ui.separator();
            ui.label(notes.as_str());
        }

        ui.separator();
        ui.label(RichText::new("Connected in view").strong());

        let related = self.related_entries(&selected_id);
        if related.is_empty() {
            ui.label("No visible connections.");
        } else {
            for entry in related {
                if ui.button(&entry.label).clicked() {
                    if let Some(group_key) = entry.cluster_group {
                        self.expand_cluster(group_key);
                    } else {
                        self.set_selected(Some(entry.id));
                    }
                }
            }
        }

        ui.add_space(8.0);
        if ui.button("Clear selection").clicked() {
            self.set_selected(None);
        }
    }

    fn related_entries(&self, selected_id: &str) -> Vec<RelatedEntry> {
        let Some(cache) = self.graph_cache.as_ref() else {
            return Vec::new();
        };
        let Some(&index) = cache.index_by_id.get(selected_id) else {
            return Vec::new();
        };

        cache.neighbors[index]
            .iter()
            .filter_map(|&other| cache.visible.nodes.get(other))
            .map(|node| RelatedEntry {
                id: node.id.clone(),
                label: match &node.cluster {
                    Some(info) => format!("{} ({} members)", node.name, info.member_count),
                    None => node.name.clone(),
                },
                cluster_group: node.cluster.as_ref().map(|info| info.group_key.clone()),
            })
            .collect()
    }
}
