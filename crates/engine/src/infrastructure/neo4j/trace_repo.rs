//! Neo4j trace repository implementation.
//!
//! Traces are append-only: created once, hung off their scene with
//! `(Scene)-[:TRACE {relation}]->(Trace)`, never updated.

use async_trait::async_trait;
use neo4rs::query;
use worldgraph_domain::*;

use super::helpers::{timestamp, RowExt};
use super::query_helpers::write_expecting_row;
use super::Neo4jGraph;
use crate::infrastructure::ports::{RepoError, TraceRepo};

/// `relation` property stored on every `TRACE` edge.
const TRACE_RELATION: &str = "occurred";

pub struct Neo4jTraceRepo {
    graph: Neo4jGraph,
}

impl Neo4jTraceRepo {
    pub fn new(graph: Neo4jGraph) -> Self {
        Self { graph }
    }
}

#[async_trait]
impl TraceRepo for Neo4jTraceRepo {
    async fn record(&self, scene_id: SceneId, trace: &Trace) -> Result<(), RepoError> {
        let q = query(
            "MATCH (s:Scene {id: $scene_id})
            CREATE (t:Trace {
                id: $id,
                content: $content,
                action: $action,
                objects: $objects,
                created_at: $created_at
            })
            CREATE (s)-[:TRACE {relation: $relation}]->(t)
            RETURN t.id AS id",
        )
        .param("scene_id", scene_id.to_string())
        .param("id", trace.id.to_string())
        .param("content", trace.content.clone())
        .param("action", trace.action.clone())
        .param("objects", trace.objects.clone())
        .param("created_at", timestamp(trace.created_at))
        .param("relation", TRACE_RELATION);

        write_expecting_row(
            &self.graph,
            q,
            |row| row.get_string_strict("id"),
            "Scene",
            scene_id,
        )
        .await?;
        tracing::info!(scene_id = %scene_id, trace_id = %trace.id, "Recorded trace");
        Ok(())
    }
}
