use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::require_text;
use crate::value_objects::Embedding;
use crate::{DomainError, ObjectId};

/// A thing inside a scene.
///
/// Every object is `CONTAINS`-linked to exactly one scene when created. An
/// outgoing `ENTRY_TO` marks it as a portal into that (or another) scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Object {
    pub id: ObjectId,
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding_vector: Option<Embedding>,
    /// Can be broken down into finer objects.
    pub refinable: bool,
    pub interactable: bool,
    pub created_at: DateTime<Utc>,
}

impl Object {
    /// A blank `description` falls back to the name.
    pub fn new(
        name: &str,
        description: Option<&str>,
        embedding_vector: Option<Embedding>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let name = require_text(name, "name")?;
        let description = description
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map_or_else(|| name.clone(), str::to_string);
        Ok(Self {
            id: ObjectId::new(),
            name,
            description,
            embedding_vector,
            refinable: false,
            interactable: false,
            created_at,
        })
    }

    pub fn with_flags(mut self, refinable: bool, interactable: bool) -> Self {
        self.refinable = refinable;
        self.interactable = interactable;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn description_defaults_to_name() {
        let lamp = Object::new("brass lamp", None, None, Utc::now()).unwrap();
        assert_eq!(lamp.description, "brass lamp");

        let door = Object::new("door", Some("  "), None, Utc::now())
            .unwrap()
            .with_flags(false, true);
        assert_eq!(door.description, "door");
        assert!(door.interactable);
        assert!(!door.refinable);
    }
}
