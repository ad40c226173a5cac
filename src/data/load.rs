use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::engine::EdgeKind;

use super::network::{Contact, Network, Relationship};

#[derive(Debug, Deserialize)]
struct RawNetwork {
    #[serde(default)]
    contacts: Vec<RawContact>,
    #[serde(default)]
    relationships: Vec<RawRelationship>,
}

#[derive(Debug, Deserialize)]
struct RawContact {
    id: String,
    name: String,
    #[serde(default)]
    company: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    category: String,
    #[serde(default, rename = "trustScore")]
    trust_score: f32,
    #[serde(default)]
    email: Option<String>,
    #[serde(default, rename = "lastContacted")]
    last_contacted: Option<String>,
    #[serde(default)]
    notes: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawRelationship {
    id: String,
    source: String,
    target: String,
    #[serde(default)]
    strength: f32,
    #[serde(default)]
    kind: RawEdgeKind,
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
enum RawEdgeKind {
    #[default]
    Direct,
    Mutual,
    Introduction,
}

impl From<RawEdgeKind> for EdgeKind {
    fn from(raw: RawEdgeKind) -> Self {
        match raw {
            RawEdgeKind::Direct => Self::Direct,
            RawEdgeKind::Mutual => Self::Mutual,
            RawEdgeKind::Introduction => Self::Introduction,
        }
    }
}

pub fn load_network(path: &Path) -> Result<Network> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read network file {}", path.display()))?;
    parse_network(&raw).with_context(|| format!("failed to parse {}", path.display()))
}

fn parse_network(raw: &str) -> Result<Network> {
    let document: RawNetwork =
        serde_json::from_str(raw).context("invalid network JSON document")?;

    let mut contacts: HashMap<String, Contact> = HashMap::with_capacity(document.contacts.len());
    for raw_contact in document.contacts {
        if raw_contact.id.is_empty() || contacts.contains_key(&raw_contact.id) {
            continue;
        }

        let category = if raw_contact.category.is_empty() {
            "Uncategorized".to_string()
        } else {
            raw_contact.category
        };

        contacts.insert(
            raw_contact.id.clone(),
            Contact {
                id: raw_contact.id,
                name: raw_contact.name,
                company: raw_contact.company,
                title: raw_contact.title,
                category,
                trust_score: raw_contact.trust_score.clamp(0.0, 100.0),
                email: raw_contact.email,
                last_contacted: raw_contact.last_contacted,
                notes: raw_contact.notes,
            },
        );
    }

    let mut seen_relationship_ids = HashSet::new();
    let relationships = document
        .relationships
        .into_iter()
        .filter(|raw_relationship| {
            raw_relationship.strength > 0.0
                && raw_relationship.source != raw_relationship.target
                && contacts.contains_key(&raw_relationship.source)
                && contacts.contains_key(&raw_relationship.target)
                && seen_relationship_ids.insert(raw_relationship.id.clone())
        })
        .map(|raw_relationship| Relationship {
            id: raw_relationship.id,
            source: raw_relationship.source,
            target: raw_relationship.target,
            strength: raw_relationship.strength.min(1.0),
            kind: raw_relationship.kind.into(),
        })
        .collect::<Vec<_>>();

    Ok(Network::new(contacts, relationships))
}
