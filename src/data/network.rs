use std::collections::HashMap;

use crate::engine::EdgeKind;

#[derive(Clone, Debug)]
pub struct Contact {
    pub id: String,
    pub name: String,
    pub company: String,
    pub title: String,
    pub category: String,
    pub trust_score: f32,
    pub email: Option<String>,
    pub last_contacted: Option<String>,
    pub notes: Option<String>,
}

#[derive(Clone, Debug)]
pub struct Relationship {
    pub id: String,
    pub source: String,
    pub target: String,
    pub strength: f32,
    pub kind: EdgeKind,
}

#[derive(Clone, Debug, Default)]
pub struct Network {
    pub contacts: HashMap<String, Contact>,
    pub relationships: Vec<Relationship>,
    connection_counts: HashMap<String, usize>,
}

impl Network {
    pub fn new(contacts: HashMap<String, Contact>, relationships: Vec<Relationship>) -> Self {
        let mut connection_counts: HashMap<String, usize> = HashMap::new();
        for relationship in &relationships {
            *connection_counts
                .entry(relationship.source.clone())
                .or_default() += 1;
            *connection_counts
                .entry(relationship.target.clone())
                .or_default() += 1;
        }

        Self {
            contacts,
            relationships,
            connection_counts,
        }
    }

    pub fn contact_count(&self) -> usize {
        self.contacts.len()
    }

    pub fn relationship_count(&self) -> usize {
        self.relationships.len()
    }

    pub fn connection_count(&self, id: &str) -> usize {
        self.connection_counts.get(id).copied().unwrap_or(0)
    }

    pub fn categories(&self) -> Vec<String> {
        let mut categories = self
            .contacts
            .values()
            .map(|contact| contact.category.clone())
            .collect::<Vec<_>>();
        categories.sort();
        categories.dedup();
        categories
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use crate::engine::EdgeKind;

    use super::{Contact, Network, Relationship};

    fn contact(id: &str, category: &str) -> Contact {
        Contact {
            id: id.to_string(),
            name: id.to_string(),
            company: "Acme".to_string(),
            title: "Advisor".to_string(),
            category: category.to_string(),
            trust_score: 50.0,
            email: None,
            last_contacted: None,
            notes: None,
        }
    }

    #[test]
    fn connection_counts_cover_both_endpoints() {
        let contacts = ["a", "b", "c"]
            .into_iter()
            .map(|id| (id.to_string(), contact(id, "Tech")))
            .collect::<HashMap<_, _>>();
        let relationships = vec![
            Relationship {
                id: "r0".to_string(),
                source: "a".to_string(),
                target: "b".to_string(),
                strength: 0.5,
                kind: EdgeKind::Direct,
            },
            Relationship {
                id: "r1".to_string(),
                source: "a".to_string(),
                target: "c".to_string(),
                strength: 0.5,
                kind: EdgeKind::Mutual,
            },
        ];

        let network = Network::new(contacts, relationships);
        assert_eq!(network.connection_count("a"), 2);
        assert_eq!(network.connection_count("b"), 1);
        assert_eq!(network.connection_count("missing"), 0);
    }

    #[test]
    fn categories_are_sorted_and_deduplicated() {
        let contacts = [("a", "Tech"), ("b", "Finance"), ("c", "Tech")]
            .into_iter()
            .map(|(id, category)| (id.to_string(), contact(id, category)))
            .collect::<HashMap<_, _>>();

        let network = Network::new(contacts, Vec::new());
        assert_eq!(network.categories(), vec!["Finance", "Tech"]);
    }
}
