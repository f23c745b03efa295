//! Closed vocabulary of node labels and relationship types.
//!
//! Cypher cannot parameterize labels or relationship types, so every label
//! and type that reaches a query string comes from one of these enums. Caller
//! text is parsed into them first and rejected when it does not match.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Node labels stored in the world graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeLabel {
    Account,
    User,
    Scene,
    Object,
    Trace,
}

impl NodeLabel {
    pub const ALL: [NodeLabel; 5] = [
        Self::Account,
        Self::User,
        Self::Scene,
        Self::Object,
        Self::Trace,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Account => "Account",
            Self::User => "User",
            Self::Scene => "Scene",
            Self::Object => "Object",
            Self::Trace => "Trace",
        }
    }

    /// Labels that carry a polar position.
    pub fn is_positioned(&self) -> bool {
        matches!(self, Self::User | Self::Scene)
    }
}

impl fmt::Display for NodeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeLabel {
    type Err = DomainError;

    /// Case-insensitive; accepts the plural route forms (`scenes`, `users`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        let singular = lower.strip_suffix('s').unwrap_or(&lower);
        match singular {
            "account" => Ok(Self::Account),
            "user" => Ok(Self::User),
            "scene" => Ok(Self::Scene),
            "object" => Ok(Self::Object),
            "trace" => Ok(Self::Trace),
            _ => Err(DomainError::validation(format!(
                "Unknown node type: '{}'. Valid values: account, user, scene, object, trace",
                s
            ))),
        }
    }
}

/// Structural relationship types owned by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EdgeType {
    /// User -> Scene, at most one per user.
    LocatedAt,
    /// Scene -> Object.
    Contains,
    /// Object -> Scene portal, or a user-created entry between any two nodes.
    EntryTo,
    /// Scene -> Trace.
    Trace,
    /// User -> Account.
    BelongsTo,
}

impl EdgeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LocatedAt => "LOCATED_AT",
            Self::Contains => "CONTAINS",
            Self::EntryTo => "ENTRY_TO",
            Self::Trace => "TRACE",
            Self::BelongsTo => "BELONGS_TO",
        }
    }
}

impl fmt::Display for EdgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Object-to-object relationship types accepted from callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObjectRelationType {
    On,
    In,
    Under,
    Near,
    Beside,
    Behind,
    Above,
    PartOf,
    Holds,
    Supports,
    LeadsTo,
    Opens,
    Owns,
    Uses,
    AttachedTo,
    RelatedTo,
}

impl ObjectRelationType {
    pub const ALL: [ObjectRelationType; 16] = [
        Self::On,
        Self::In,
        Self::Under,
        Self::Near,
        Self::Beside,
        Self::Behind,
        Self::Above,
        Self::PartOf,
        Self::Holds,
        Self::Supports,
        Self::LeadsTo,
        Self::Opens,
        Self::Owns,
        Self::Uses,
        Self::AttachedTo,
        Self::RelatedTo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::On => "ON",
            Self::In => "IN",
            Self::Under => "UNDER",
            Self::Near => "NEAR",
            Self::Beside => "BESIDE",
            Self::Behind => "BEHIND",
            Self::Above => "ABOVE",
            Self::PartOf => "PART_OF",
            Self::Holds => "HOLDS",
            Self::Supports => "SUPPORTS",
            Self::LeadsTo => "LEADS_TO",
            Self::Opens => "OPENS",
            Self::Owns => "OWNS",
            Self::Uses => "USES",
            Self::AttachedTo => "ATTACHED_TO",
            Self::RelatedTo => "RELATED_TO",
        }
    }
}

impl fmt::Display for ObjectRelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectRelationType {
    type Err = DomainError;

    /// Normalizes case and treats spaces and hyphens as underscores, so
    /// `"part of"` and `"Part-Of"` both parse to [`ObjectRelationType::PartOf`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .map(|c| match c {
                ' ' | '-' => '_',
                other => other.to_ascii_uppercase(),
            })
            .collect();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| {
                DomainError::validation(format!("Unsupported relation type: '{}'", s))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_label_accepts_plural_and_case() {
        assert_eq!("scenes".parse::<NodeLabel>().unwrap(), NodeLabel::Scene);
        assert_eq!("User".parse::<NodeLabel>().unwrap(), NodeLabel::User);
        assert_eq!("OBJECT".parse::<NodeLabel>().unwrap(), NodeLabel::Object);
        assert!("Scene) DETACH DELETE (n".parse::<NodeLabel>().is_err());
    }

    #[test]
    fn only_users_and_scenes_are_positioned() {
        let positioned: Vec<_> = NodeLabel::ALL
            .into_iter()
            .filter(NodeLabel::is_positioned)
            .collect();
        assert_eq!(positioned, vec![NodeLabel::User, NodeLabel::Scene]);
    }

    #[test]
    fn relation_type_normalizes_input() {
        assert_eq!(
            "part of".parse::<ObjectRelationType>().unwrap(),
            ObjectRelationType::PartOf
        );
        assert_eq!(
            "Leads-To".parse::<ObjectRelationType>().unwrap(),
            ObjectRelationType::LeadsTo
        );
    }

    #[test]
    fn relation_type_rejects_injection() {
        let err = "ON]->(x) DETACH DELETE x //"
            .parse::<ObjectRelationType>()
            .unwrap_err();
        assert!(err.is_validation());
        assert!("LOCATED_AT".parse::<ObjectRelationType>().is_err());
    }

    #[test]
    fn edge_types_serialize_as_cypher_names() {
        assert_eq!(
            serde_json::to_value(EdgeType::LocatedAt).unwrap(),
            serde_json::json!("LOCATED_AT")
        );
        assert_eq!(EdgeType::EntryTo.to_string(), "ENTRY_TO");
    }
}
