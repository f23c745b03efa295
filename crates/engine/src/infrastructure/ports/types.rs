//! Read models and write descriptors shared between ports and use cases.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use worldgraph_domain::{Embedding, NodeLabel, Object, PolarPosition, SceneId};

// =============================================================================
// Graph-wide views
// =============================================================================

/// A node addressed by id and label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeRef {
    pub id: Uuid,
    pub label: NodeLabel,
}

impl NodeRef {
    pub fn new(id: Uuid, label: NodeLabel) -> Self {
        Self { id, label }
    }
}

/// Display summary of any node.
///
/// `label` is the human-facing caption: the node's name, else its
/// description, else its graph label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub node_type: String,
}

/// A directed edge in the export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphLink {
    pub source: String,
    pub target: String,
    pub label: String,
}

/// Whole-graph export for visualisation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphLink>,
}

/// Both ends of a freshly created `ENTRY_TO` edge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryLink {
    pub from: GraphNode,
    pub to: GraphNode,
}

// =============================================================================
// Object views
// =============================================================================

/// Outgoing object-to-object edge with its target.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectRelationship {
    pub node: Object,
    pub relation_type: String,
}

/// Why an object carries an `ENTRY_TO` edge back into its scene.
///
/// Stored as the `relation` property on the edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortalOrigin {
    /// Marked as an entry by the object scanner during scene generation.
    Scanned,
    /// Materialized from an action outcome.
    Action,
}

impl PortalOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scanned => "entrance",
            Self::Action => "from_action",
        }
    }
}

/// An object reachable from a user, labelled with how it was reached.
///
/// Field names match the outcome collaborator's `related_objects` entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelatedObject {
    pub object: String,
    pub relation: String,
}

/// Label used for objects reached through more than one hop.
pub const GENERIC_RELATION: &str = "related";

// =============================================================================
// Location edge
// =============================================================================

/// Everything written when a user's `LOCATED_AT` edge is replaced.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationUpdate {
    pub scene_id: SceneId,
    /// Ranking score, stored on the edge.
    pub score: Option<f64>,
    /// User vector used for ranking; also stored on the user node.
    pub vector: Option<Embedding>,
    /// New user position, written in the same transaction when present.
    pub position: Option<PolarPosition>,
    pub created_at: DateTime<Utc>,
}

impl LocationUpdate {
    pub fn to_scene(scene_id: SceneId, created_at: DateTime<Utc>) -> Self {
        Self {
            scene_id,
            score: None,
            vector: None,
            position: None,
            created_at,
        }
    }
}
