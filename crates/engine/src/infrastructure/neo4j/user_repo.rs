//! Neo4j user repository implementation.
//!
//! # Graph Design
//!
//! - Location: `(User)-[:LOCATED_AT {score, vector, created_at}]->(Scene)`,
//!   at most one per user, replaced inside a single transaction.
//! - Ownership: `(User)-[:BELONGS_TO]->(Account)`

use async_trait::async_trait;
use neo4rs::{query, Row};
use worldgraph_domain::*;

use super::helpers::{embedding_param, node_to_scene, node_to_user, timestamp, RowExt};
use super::query_helpers::{collect_rows, get_first_row, run_query, write_expecting_row};
use super::Neo4jGraph;
use crate::infrastructure::ports::{
    LocationUpdate, RelatedObject, RepoError, UserRepo, GENERIC_RELATION,
};

pub struct Neo4jUserRepo {
    graph: Neo4jGraph,
}

impl Neo4jUserRepo {
    pub fn new(graph: Neo4jGraph) -> Self {
        Self { graph }
    }
}

fn row_to_user(row: Row) -> Result<User, RepoError> {
    node_to_user(&row.get_node("u")?)
}

#[async_trait]
impl UserRepo for Neo4jUserRepo {
    async fn get(&self, id: UserId) -> Result<Option<User>, RepoError> {
        let q = query("MATCH (u:User {id: $id}) RETURN u").param("id", id.to_string());
        get_first_row(&self.graph, q, row_to_user).await
    }

    async fn save(&self, user: &User) -> Result<(), RepoError> {
        let q = query(
            "CREATE (u:User {
                id: $id,
                introduction: $introduction,
                radius: $radius,
                angle: $angle,
                embedding: $embedding,
                created_at: $created_at
            })",
        )
        .param("id", user.id.to_string())
        .param("introduction", user.introduction.clone())
        .param("radius", user.polar_position.map(|p| p.radius))
        .param("angle", user.polar_position.map(|p| p.angle))
        .param("embedding", embedding_param(user.embedding_vector.as_ref()))
        .param("created_at", timestamp(user.created_at));

        run_query(&self.graph, q, "save_user").await
    }

    async fn list(&self) -> Result<Vec<User>, RepoError> {
        let q = query("MATCH (u:User) RETURN u ORDER BY u.created_at, u.id");
        collect_rows(&self.graph, q, row_to_user).await
    }

    async fn update_position(
        &self,
        id: UserId,
        position: PolarPosition,
    ) -> Result<User, RepoError> {
        let q = query(
            "MATCH (u:User {id: $id})
            SET u.radius = $radius, u.angle = $angle
            RETURN u",
        )
        .param("id", id.to_string())
        .param("radius", position.radius)
        .param("angle", position.angle);
        write_expecting_row(&self.graph, q, row_to_user, "User", id).await
    }

    async fn update_introduction(
        &self,
        id: UserId,
        introduction: &str,
    ) -> Result<User, RepoError> {
        let q = query(
            "MATCH (u:User {id: $id})
            SET u.introduction = $introduction
            RETURN u",
        )
        .param("id", id.to_string())
        .param("introduction", introduction);
        write_expecting_row(&self.graph, q, row_to_user, "User", id).await
    }

    async fn current_scene(&self, id: UserId) -> Result<Option<Scene>, RepoError> {
        let q = query("MATCH (:User {id: $id})-[:LOCATED_AT]->(s:Scene) RETURN s LIMIT 1")
            .param("id", id.to_string());
        get_first_row(&self.graph, q, |row| node_to_scene(&row.get_node("s")?)).await
    }

    async fn related_objects(&self, id: UserId) -> Result<Vec<RelatedObject>, RepoError> {
        let q = query(
            "MATCH path = (:User {id: $id})-[rels*1..3]-(o:Object)
            WHERE ALL(rel IN rels WHERE type(rel) <> 'ENTRY_TO')
            WITH o, rels, length(path) AS hops
            RETURN DISTINCT o.name AS object,
                   CASE WHEN hops = 1
                        THEN coalesce(rels[0].relation, type(rels[0]))
                        ELSE $generic
                   END AS relation",
        )
        .param("id", id.to_string())
        .param("generic", GENERIC_RELATION);
        collect_rows(&self.graph, q, |row| {
            Ok(RelatedObject {
                object: row.get_string_or("object", ""),
                relation: row.get_string_or("relation", GENERIC_RELATION),
            })
        })
        .await
    }

    async fn relocate(&self, id: UserId, update: &LocationUpdate) -> Result<(), RepoError> {
        let mut txn = self
            .graph
            .start_txn()
            .await
            .map_err(|e| RepoError::database("relocate", e))?;

        // Writing to the user node first takes its lock, so concurrent
        // relocations of the same user serialize here.
        let lock_q = query(
            "MATCH (u:User {id: $user_id})
            SET u.radius = coalesce($radius, u.radius),
                u.angle = coalesce($angle, u.angle),
                u.embedding = coalesce($vector, u.embedding)
            WITH u
            MATCH (s:Scene {id: $scene_id})
            RETURN s.id AS scene_id",
        )
        .param("user_id", id.to_string())
        .param("scene_id", update.scene_id.to_string())
        .param("radius", update.position.map(|p| p.radius))
        .param("angle", update.position.map(|p| p.angle))
        .param("vector", embedding_param(update.vector.as_ref()));

        let mut result = txn
            .execute(lock_q)
            .await
            .map_err(|e| RepoError::database("relocate", e))?;
        let matched = result
            .next(txn.handle())
            .await
            .map_err(|e| RepoError::database("relocate", e))?
            .is_some();
        if !matched {
            txn.rollback()
                .await
                .map_err(|e| RepoError::database("relocate", e))?;
            return match self.get(id).await? {
                None => Err(RepoError::not_found("User", id)),
                Some(_) => Err(RepoError::not_found("Scene", update.scene_id)),
            };
        }

        let replace_q = query(
            "MATCH (u:User {id: $user_id})
            OPTIONAL MATCH (u)-[old:LOCATED_AT]->(:Scene)
            DELETE old
            WITH DISTINCT u
            MATCH (s:Scene {id: $scene_id})
            CREATE (u)-[:LOCATED_AT {score: $score, vector: $vector, created_at: $created_at}]->(s)
            WITH u
            MATCH (u)-[located:LOCATED_AT]->(:Scene)
            RETURN count(located) AS edges",
        )
        .param("user_id", id.to_string())
        .param("scene_id", update.scene_id.to_string())
        .param("score", update.score)
        .param("vector", embedding_param(update.vector.as_ref()))
        .param("created_at", timestamp(update.created_at));

        let mut result = txn
            .execute(replace_q)
            .await
            .map_err(|e| RepoError::database("relocate", e))?;
        let edges: i64 = match result
            .next(txn.handle())
            .await
            .map_err(|e| RepoError::database("relocate", e))?
        {
            Some(row) => row.get("edges").unwrap_or(0),
            None => 0,
        };

        if edges != 1 {
            txn.rollback()
                .await
                .map_err(|e| RepoError::database("relocate", e))?;
            tracing::error!(user_id = %id, edges, "LOCATED_AT replacement left wrong edge count");
            return Err(RepoError::consistency(format!(
                "user {} would have {} LOCATED_AT edges",
                id, edges
            )));
        }

        txn.commit()
            .await
            .map_err(|e| RepoError::database("relocate", e))?;

        tracing::info!(user_id = %id, scene_id = %update.scene_id, "Relocated user");
        Ok(())
    }
}
