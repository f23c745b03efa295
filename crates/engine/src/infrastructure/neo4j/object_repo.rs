//! Neo4j object repository implementation.
//!
//! Object-to-object relationship types come from `ObjectRelationType` and are
//! interpolated into Cypher only after parsing; ids always travel as
//! parameters.

use async_trait::async_trait;
use neo4rs::{query, Query, Row};
use worldgraph_domain::*;

use super::helpers::{embedding_param, node_to_object, timestamp, RowExt};
use super::query_helpers::{collect_rows, get_first_row, run_query, write_expecting_row};
use super::Neo4jGraph;
use crate::infrastructure::ports::{ObjectRelationship, ObjectRepo, PortalOrigin, RepoError};

pub struct Neo4jObjectRepo {
    graph: Neo4jGraph,
}

impl Neo4jObjectRepo {
    pub fn new(graph: Neo4jGraph) -> Self {
        Self { graph }
    }
}

fn row_to_object(row: Row) -> Result<Object, RepoError> {
    node_to_object(&row.get_node("o")?)
}

/// Bind the standard object properties used by the CREATE statements below.
fn with_object_params(q: Query, object: &Object) -> Query {
    q.param("id", object.id.to_string())
        .param("name", object.name.clone())
        .param("description", object.description.clone())
        .param("embedding", embedding_param(object.embedding_vector.as_ref()))
        .param("refinable", object.refinable)
        .param("interactable", object.interactable)
        .param("created_at", timestamp(object.created_at))
}

const OBJECT_PROPERTIES: &str = "{
    id: $id,
    name: $name,
    description: $description,
    embedding: $embedding,
    refinable: $refinable,
    interactable: $interactable,
    created_at: $created_at
}";

#[async_trait]
impl ObjectRepo for Neo4jObjectRepo {
    async fn get(&self, id: ObjectId) -> Result<Option<Object>, RepoError> {
        let q = query("MATCH (o:Object {id: $id}) RETURN o").param("id", id.to_string());
        get_first_row(&self.graph, q, row_to_object).await
    }

    async fn save(&self, object: &Object) -> Result<(), RepoError> {
        let q = with_object_params(query(&format!("CREATE (o:Object {OBJECT_PROPERTIES})")), object);
        run_query(&self.graph, q, "save_object").await
    }

    async fn create_in_scene(
        &self,
        scene_id: SceneId,
        object: &Object,
        portal: Option<PortalOrigin>,
    ) -> Result<(), RepoError> {
        let portal_clause = if portal.is_some() {
            "CREATE (o)-[:ENTRY_TO {relation: $portal}]->(s)"
        } else {
            ""
        };
        let cypher = format!(
            "MATCH (s:Scene {{id: $scene_id}})
            CREATE (o:Object {OBJECT_PROPERTIES})
            CREATE (s)-[:CONTAINS]->(o)
            {portal_clause}
            RETURN o"
        );
        let q = with_object_params(query(&cypher), object)
            .param("scene_id", scene_id.to_string())
            .param("portal", portal.map(|p| p.as_str()).unwrap_or_default());

        write_expecting_row(&self.graph, q, row_to_object, "Scene", scene_id).await?;
        tracing::debug!(
            scene_id = %scene_id,
            object_id = %object.id,
            name = %object.name,
            portal = portal.is_some(),
            "Created object in scene"
        );
        Ok(())
    }

    async fn create_relationship(
        &self,
        from: ObjectId,
        to: ObjectId,
        relation: ObjectRelationType,
    ) -> Result<(), RepoError> {
        let cypher = format!(
            "MATCH (from:Object {{id: $from}})
            MATCH (to:Object {{id: $to}})
            CREATE (from)-[r:{relation}]->(to)
            RETURN type(r) AS relation_type",
            relation = relation.as_str()
        );
        let q = query(&cypher)
            .param("from", from.to_string())
            .param("to", to.to_string());

        let created = get_first_row(&self.graph, q, |row| row.get_string_strict("relation_type"))
            .await?;
        if created.is_some() {
            return Ok(());
        }

        // Report whichever endpoint is missing.
        if self.get(from).await?.is_none() {
            return Err(RepoError::not_found("Object", from));
        }
        Err(RepoError::not_found("Object", to))
    }

    async fn relationships(
        &self,
        id: ObjectId,
        relation: Option<ObjectRelationType>,
    ) -> Result<Vec<ObjectRelationship>, RepoError> {
        let pattern = match relation {
            Some(t) => format!("[r:{}]", t.as_str()),
            None => "[r]".to_string(),
        };
        let cypher = format!(
            "MATCH (:Object {{id: $id}})-{pattern}->(o:Object)
            RETURN o, type(r) AS relation_type
            ORDER BY o.created_at, o.id"
        );
        let q = query(&cypher).param("id", id.to_string());
        collect_rows(&self.graph, q, |row| {
            Ok(ObjectRelationship {
                node: node_to_object(&row.get_node("o")?)?,
                relation_type: row.get_string_strict("relation_type")?,
            })
        })
        .await
    }
}
