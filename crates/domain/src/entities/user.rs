use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{Embedding, PolarPosition};
use crate::{DomainError, UserId};

/// A participant in the world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    /// Free-text persona sent to the outcome collaborator.
    pub introduction: String,
    /// Absent until the user is first placed.
    pub polar_position: Option<PolarPosition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding_vector: Option<Embedding>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        introduction: &str,
        polar_position: Option<PolarPosition>,
        embedding_vector: Option<Embedding>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if let Some(position) = &polar_position {
            position.validate()?;
        }
        Ok(Self {
            id: UserId::new(),
            introduction: introduction.trim().to_string(),
            polar_position,
            embedding_vector,
            created_at,
        })
    }

    /// Persona text, `None` when the introduction is blank.
    pub fn persona(&self) -> Option<&str> {
        let text = self.introduction.trim();
        (!text.is_empty()).then_some(text)
    }
}
