//! Narrative collaborator port traits.
//!
//! Request and reply structs mirror the collaborators' JSON, which is
//! snake_case on the wire.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use worldgraph_domain::{Embedding, RelationTriple, UserId};

use super::error::CollaboratorError;
use super::types::RelatedObject;

// =============================================================================
// Wire Types
// =============================================================================

/// One entry from the object scanner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannedObject {
    /// Object name.
    pub object: String,
    #[serde(default)]
    pub refinable: bool,
    #[serde(default)]
    pub interactable: bool,
    #[serde(default)]
    pub is_entry: bool,
}

/// A scene suggested by the navigation collaborator on success.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyScene {
    pub description: String,
}

/// Navigation collaborator reply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NavigationReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nearby_scenes: Vec<NearbyScene>,
}

impl NavigationReply {
    /// Text of a failed reply, preferring `error` over `message`.
    pub fn failure_text(&self) -> &str {
        self.error
            .as_deref()
            .filter(|e| !e.is_empty())
            .unwrap_or(&self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelfActionRequest {
    pub persona: String,
    pub action: String,
    pub related_objects: Vec<RelatedObject>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InteractionRequest {
    pub persona: String,
    pub target_relation: RelationTriple,
    pub env_relations: Vec<RelationTriple>,
}

/// Outcome collaborator reply: narrative text plus whatever resolution
/// metadata the service attaches (rolls, difficulty, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutcomeReply {
    #[serde(default)]
    pub outcome: String,
    #[serde(flatten)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

// =============================================================================
// Ports
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmbeddingPort: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Embedding, CollaboratorError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectScanPort: Send + Sync {
    async fn scan(&self, text: &str) -> Result<Vec<ScannedObject>, CollaboratorError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RelationExtractionPort: Send + Sync {
    async fn extract(&self, text: &str) -> Result<Vec<RelationTriple>, CollaboratorError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SceneGenerationPort: Send + Sync {
    /// Returns the generated scene description.
    async fn generate(
        &self,
        entry_term: &str,
        external_objects: Vec<String>,
    ) -> Result<String, CollaboratorError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NavigationPort: Send + Sync {
    async fn navigate(
        &self,
        user_id: UserId,
        command: &str,
    ) -> Result<NavigationReply, CollaboratorError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OutcomePort: Send + Sync {
    async fn resolve_self_action(
        &self,
        request: SelfActionRequest,
    ) -> Result<OutcomeReply, CollaboratorError>;
    async fn resolve_interaction(
        &self,
        request: InteractionRequest,
    ) -> Result<OutcomeReply, CollaboratorError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MotivePort: Send + Sync {
    async fn extract_motives(&self, text: &str)
        -> Result<serde_json::Value, CollaboratorError>;
}
