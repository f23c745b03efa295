use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::require_text;
use crate::value_objects::{Embedding, PolarPosition};
use crate::{DomainError, SceneId};

/// A location users can be in.
///
/// Objects are attached by `(Scene)-[:CONTAINS]->(Object)` and portals by
/// inbound `ENTRY_TO` edges. Generated scenes are deduplicated on the exact
/// `description` text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub id: SceneId,
    pub description: String,
    pub polar_position: PolarPosition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding_vector: Option<Embedding>,
    pub created_at: DateTime<Utc>,
}

impl Scene {
    pub fn new(
        description: &str,
        polar_position: PolarPosition,
        embedding_vector: Option<Embedding>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        polar_position.validate()?;
        Ok(Self {
            id: SceneId::new(),
            description: require_text(description, "description")?,
            polar_position,
            embedding_vector,
            created_at,
        })
    }
}
