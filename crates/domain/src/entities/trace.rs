use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::TraceId;

/// Immutable record of an action's outcome, hung off a scene by `TRACE`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trace {
    pub id: TraceId,
    /// Outcome text returned by the outcome collaborator.
    pub content: String,
    /// The action text as submitted.
    pub action: String,
    /// Names of objects materialized from the outcome.
    pub objects: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Trace {
    pub fn new(
        content: impl Into<String>,
        action: impl Into<String>,
        objects: Vec<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: TraceId::new(),
            content: content.into(),
            action: action.into(),
            objects,
            created_at,
        }
    }
}
