//! Neo4j deserialization helpers for row conversion functions.
//!
//! This module provides extension traits and helper functions to reduce
//! boilerplate when converting Neo4j nodes to domain entities.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use neo4rs::{Node, Row};
use uuid::Uuid;
use worldgraph_domain::common::{parse_datetime_or, StringExt};
use worldgraph_domain::{Account, Embedding, Object, PolarPosition, Scene, User};

use crate::infrastructure::ports::RepoError;

/// Extension trait for Neo4j Node to simplify common deserialization patterns.
pub trait NodeExt {
    /// Get a required UUID field and parse it.
    fn get_uuid(&self, field: &str) -> Result<Uuid>;

    /// Get an optional string field, returning None if empty or missing.
    fn get_optional_string(&self, field: &str) -> Option<String>;

    /// Get a string field with a default value if missing.
    fn get_string_or(&self, field: &str, default: &str) -> String;

    /// Get a timestamp field, falling back to provided time on parse error.
    fn get_datetime_or(&self, field: &str, fallback: DateTime<Utc>) -> DateTime<Utc>;

    /// Get a bool field with a default value if missing.
    fn get_bool_or(&self, field: &str, default: bool) -> bool;

    /// Get a required string field with strict error handling (fail-fast).
    fn get_string_strict(&self, field: &str) -> Result<String, RepoError>;

    /// `radius`/`angle` pair, `None` when either is missing or invalid.
    fn get_polar_position(&self) -> Option<PolarPosition>;

    /// Stored `embedding` list, `None` when missing or the wrong shape.
    fn get_embedding(&self) -> Option<Embedding>;
}

impl NodeExt for Node {
    fn get_uuid(&self, field: &str) -> Result<Uuid> {
        let s: String = self
            .get(field)
            .with_context(|| format!("Missing field: {}", field))?;
        Uuid::parse_str(&s).with_context(|| format!("Invalid UUID in field '{}': {}", field, s))
    }

    fn get_optional_string(&self, field: &str) -> Option<String> {
        self.get::<String>(field).ok().and_then(|s| s.into_option())
    }

    fn get_string_or(&self, field: &str, default: &str) -> String {
        self.get(field).unwrap_or_else(|_| default.to_string())
    }

    fn get_datetime_or(&self, field: &str, fallback: DateTime<Utc>) -> DateTime<Utc> {
        self.get::<String>(field)
            .ok()
            .map(|s| parse_datetime_or(&s, fallback))
            .unwrap_or(fallback)
    }

    fn get_bool_or(&self, field: &str, default: bool) -> bool {
        self.get(field).unwrap_or(default)
    }

    fn get_string_strict(&self, field: &str) -> Result<String, RepoError> {
        self.get(field).map_err(|e| {
            RepoError::database(
                "query",
                format!("Missing required field '{}': {}", field, e),
            )
        })
    }

    fn get_polar_position(&self) -> Option<PolarPosition> {
        let radius: f64 = self.get("radius").ok()?;
        let angle: f64 = self.get("angle").ok()?;
        PolarPosition::new(radius, angle).ok()
    }

    fn get_embedding(&self) -> Option<Embedding> {
        let values: Vec<f64> = self.get("embedding").ok()?;
        match Embedding::from_f64(values) {
            Ok(embedding) => Some(embedding),
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring malformed stored embedding");
                None
            }
        }
    }
}

/// Extension trait for Neo4j Row to simplify common deserialization patterns.
pub trait RowExt {
    /// Get a string column with a default value if missing.
    fn get_string_or(&self, column: &str, default: &str) -> String;

    /// Get a required string column with strict error handling (fail-fast).
    fn get_string_strict(&self, column: &str) -> Result<String, RepoError>;

    /// Get a required node column.
    fn get_node(&self, column: &str) -> Result<Node, RepoError>;
}

impl RowExt for Row {
    fn get_string_or(&self, column: &str, default: &str) -> String {
        self.get(column).unwrap_or_else(|_| default.to_string())
    }

    fn get_string_strict(&self, column: &str) -> Result<String, RepoError> {
        self.get(column).map_err(|e| {
            RepoError::database(
                "query",
                format!("Missing required column '{}': {}", column, e),
            )
        })
    }

    fn get_node(&self, column: &str) -> Result<Node, RepoError> {
        self.get(column).map_err(|e| RepoError::database("query", e))
    }
}

/// Parse a typed ID from a Neo4j node field.
pub fn parse_typed_id<T>(node: &Node, field: &str) -> Result<T>
where
    T: From<Uuid>,
{
    let uuid = node.get_uuid(field)?;
    Ok(T::from(uuid))
}

/// Current time as stored in the graph.
pub fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339()
}

/// Optional vector as stored in the graph.
pub fn embedding_param(embedding: Option<&Embedding>) -> Option<Vec<f64>> {
    embedding.map(Embedding::to_f64_vec)
}

// =============================================================================
// Common Node-to-Entity Converters
// =============================================================================

pub fn node_to_scene(node: &Node) -> Result<Scene, RepoError> {
    let id = parse_typed_id(node, "id").map_err(|e| RepoError::database("query", e))?;
    let polar_position = node.get_polar_position().ok_or_else(|| {
        RepoError::database("parse", format!("Scene {} has no valid radius/angle", id))
    })?;
    Ok(Scene {
        id,
        description: node.get_string_strict("description")?,
        polar_position,
        embedding_vector: node.get_embedding(),
        created_at: node.get_datetime_or("created_at", Utc::now()),
    })
}

pub fn node_to_user(node: &Node) -> Result<User, RepoError> {
    Ok(User {
        id: parse_typed_id(node, "id").map_err(|e| RepoError::database("query", e))?,
        introduction: node.get_string_or("introduction", ""),
        polar_position: node.get_polar_position(),
        embedding_vector: node.get_embedding(),
        created_at: node.get_datetime_or("created_at", Utc::now()),
    })
}

pub fn node_to_object(node: &Node) -> Result<Object, RepoError> {
    let name = node.get_string_strict("name")?;
    let description = node
        .get_optional_string("description")
        .unwrap_or_else(|| name.clone());
    Ok(Object {
        id: parse_typed_id(node, "id").map_err(|e| RepoError::database("query", e))?,
        name,
        description,
        embedding_vector: node.get_embedding(),
        refinable: node.get_bool_or("refinable", false),
        interactable: node.get_bool_or("interactable", false),
        created_at: node.get_datetime_or("created_at", Utc::now()),
    })
}

pub fn node_to_account(node: &Node) -> Result<Account, RepoError> {
    Ok(Account {
        id: parse_typed_id(node, "id").map_err(|e| RepoError::database("query", e))?,
        email: node.get_string_or("email", ""),
        username: node.get_string_strict("username")?,
        external_auth_id: node.get_string_strict("external_auth_id")?,
        created_at: node.get_datetime_or("created_at", Utc::now()),
    })
}
