//! Neo4j scene repository implementation.
//!
//! # Graph Design
//!
//! - Contents: `(Scene)-[:CONTAINS]->(Object)`
//! - Portals: `(Object)-[:ENTRY_TO]->(Scene)`
//! - Traces: `(Scene)-[:TRACE]->(Trace)`
//! - Occupants: `(User)-[:LOCATED_AT]->(Scene)`

use async_trait::async_trait;
use neo4rs::{query, Row};
use worldgraph_domain::*;

use super::helpers::{embedding_param, node_to_object, node_to_scene, timestamp, RowExt};
use super::query_helpers::{collect_rows, get_first_row, run_query, write_expecting_row};
use super::Neo4jGraph;
use crate::infrastructure::ports::{RepoError, SceneRepo};

pub struct Neo4jSceneRepo {
    graph: Neo4jGraph,
}

impl Neo4jSceneRepo {
    pub fn new(graph: Neo4jGraph) -> Self {
        Self { graph }
    }
}

fn row_to_scene(row: Row) -> Result<Scene, RepoError> {
    node_to_scene(&row.get_node("s")?)
}

fn row_to_object(row: Row) -> Result<Object, RepoError> {
    node_to_object(&row.get_node("o")?)
}

#[async_trait]
impl SceneRepo for Neo4jSceneRepo {
    async fn get(&self, id: SceneId) -> Result<Option<Scene>, RepoError> {
        let q = query("MATCH (s:Scene {id: $id}) RETURN s").param("id", id.to_string());
        get_first_row(&self.graph, q, row_to_scene).await
    }

    async fn save(&self, scene: &Scene) -> Result<(), RepoError> {
        let q = query(
            "CREATE (s:Scene {
                id: $id,
                description: $description,
                radius: $radius,
                angle: $angle,
                embedding: $embedding,
                created_at: $created_at
            })",
        )
        .param("id", scene.id.to_string())
        .param("description", scene.description.clone())
        .param("radius", scene.polar_position.radius)
        .param("angle", scene.polar_position.angle)
        .param("embedding", embedding_param(scene.embedding_vector.as_ref()))
        .param("created_at", timestamp(scene.created_at));

        run_query(&self.graph, q, "save_scene").await?;
        tracing::debug!(scene_id = %scene.id, "Created scene");
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Scene>, RepoError> {
        let q = query("MATCH (s:Scene) RETURN s ORDER BY s.created_at, s.id");
        collect_rows(&self.graph, q, row_to_scene).await
    }

    async fn find_by_description(&self, description: &str) -> Result<Option<Scene>, RepoError> {
        let q = query(
            "MATCH (s:Scene {description: $description})
            RETURN s ORDER BY s.created_at, s.id LIMIT 1",
        )
        .param("description", description);
        get_first_row(&self.graph, q, row_to_scene).await
    }

    async fn find_by_containment(&self, text: &str) -> Result<Option<Scene>, RepoError> {
        let text = text.trim().to_lowercase();
        if text.is_empty() {
            return Ok(None);
        }
        let q = query(
            "MATCH (s:Scene)
            WHERE size(trim(s.description)) > 0
              AND ($text CONTAINS toLower(s.description) OR toLower(s.description) CONTAINS $text)
            RETURN s ORDER BY size(s.description) DESC, s.created_at, s.id LIMIT 1",
        )
        .param("text", text);
        get_first_row(&self.graph, q, row_to_scene).await
    }

    async fn update_position(
        &self,
        id: SceneId,
        position: PolarPosition,
    ) -> Result<Scene, RepoError> {
        let q = query(
            "MATCH (s:Scene {id: $id})
            SET s.radius = $radius, s.angle = $angle
            RETURN s",
        )
        .param("id", id.to_string())
        .param("radius", position.radius)
        .param("angle", position.angle);
        write_expecting_row(&self.graph, q, row_to_scene, "Scene", id).await
    }

    async fn list_objects(&self, id: SceneId) -> Result<Vec<Object>, RepoError> {
        let q = query(
            "MATCH (:Scene {id: $id})-[:CONTAINS]->(o:Object)
            RETURN o ORDER BY o.created_at, o.id",
        )
        .param("id", id.to_string());
        collect_rows(&self.graph, q, row_to_object).await
    }

    async fn environment_relations(&self, id: SceneId) -> Result<Vec<RelationTriple>, RepoError> {
        let q = query(
            "MATCH (:Scene {id: $id})-[:CONTAINS]->(o:Object)
            OPTIONAL MATCH (o)-[r]->(:Object)
            RETURN DISTINCT o.name AS object,
                   CASE WHEN r IS NULL THEN 'CONTAINS' ELSE type(r) END AS predicate",
        )
        .param("id", id.to_string());
        collect_rows(&self.graph, q, |row| {
            Ok(RelationTriple::new(
                NodeLabel::Scene.as_str(),
                row.get_string_strict("predicate")?,
                row.get_string_or("object", ""),
            ))
        })
        .await
    }
}
