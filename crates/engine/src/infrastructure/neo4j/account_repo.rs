//! Neo4j account repository implementation.
//!
//! Users belong to accounts through `(User)-[:BELONGS_TO]->(Account)`.

use async_trait::async_trait;
use neo4rs::{query, Row};
use worldgraph_domain::*;

use super::helpers::{embedding_param, node_to_account, node_to_user, timestamp, RowExt};
use super::query_helpers::{collect_rows, get_first_row, write_expecting_row};
use super::Neo4jGraph;
use crate::infrastructure::ports::{AccountRepo, RepoError};

pub struct Neo4jAccountRepo {
    graph: Neo4jGraph,
}

impl Neo4jAccountRepo {
    pub fn new(graph: Neo4jGraph) -> Self {
        Self { graph }
    }
}

fn row_to_account(row: Row) -> Result<Account, RepoError> {
    node_to_account(&row.get_node("a")?)
}

const USER_PROPERTIES: &str = "{
    id: $user_id,
    introduction: $introduction,
    radius: $radius,
    angle: $angle,
    embedding: $embedding,
    created_at: $user_created_at
}";

fn with_user_params(q: neo4rs::Query, user: &User) -> neo4rs::Query {
    q.param("user_id", user.id.to_string())
        .param("introduction", user.introduction.clone())
        .param("radius", user.polar_position.map(|p| p.radius))
        .param("angle", user.polar_position.map(|p| p.angle))
        .param("embedding", embedding_param(user.embedding_vector.as_ref()))
        .param("user_created_at", timestamp(user.created_at))
}

#[async_trait]
impl AccountRepo for Neo4jAccountRepo {
    async fn get(&self, id: AccountId) -> Result<Option<Account>, RepoError> {
        let q = query("MATCH (a:Account {id: $id}) RETURN a").param("id", id.to_string());
        get_first_row(&self.graph, q, row_to_account).await
    }

    async fn find_by_external_auth_id(
        &self,
        external_auth_id: &str,
    ) -> Result<Option<Account>, RepoError> {
        let q = query("MATCH (a:Account {external_auth_id: $external_auth_id}) RETURN a LIMIT 1")
            .param("external_auth_id", external_auth_id);
        get_first_row(&self.graph, q, row_to_account).await
    }

    async fn create_with_user(&self, account: &Account, user: &User) -> Result<(), RepoError> {
        let cypher = format!(
            "CREATE (a:Account {{
                id: $id,
                email: $email,
                username: $username,
                external_auth_id: $external_auth_id,
                created_at: $created_at
            }})
            CREATE (u:User {USER_PROPERTIES})
            CREATE (u)-[:BELONGS_TO]->(a)
            RETURN a"
        );
        let q = with_user_params(query(&cypher), user)
            .param("id", account.id.to_string())
            .param("email", account.email.clone())
            .param("username", account.username.clone())
            .param("external_auth_id", account.external_auth_id.clone())
            .param("created_at", timestamp(account.created_at));

        write_expecting_row(&self.graph, q, row_to_account, "Account", account.id).await?;
        tracing::info!(account_id = %account.id, user_id = %user.id, "Created account");
        Ok(())
    }

    async fn add_user(&self, id: AccountId, user: &User) -> Result<(), RepoError> {
        let cypher = format!(
            "MATCH (a:Account {{id: $id}})
            CREATE (u:User {USER_PROPERTIES})
            CREATE (u)-[:BELONGS_TO]->(a)
            RETURN a"
        );
        let q = with_user_params(query(&cypher), user).param("id", id.to_string());
        write_expecting_row(&self.graph, q, row_to_account, "Account", id).await?;
        Ok(())
    }

    async fn list_users(&self, id: AccountId) -> Result<Vec<User>, RepoError> {
        let q = query(
            "MATCH (u:User)-[:BELONGS_TO]->(:Account {id: $id})
            RETURN u ORDER BY u.created_at, u.id",
        )
        .param("id", id.to_string());
        collect_rows(&self.graph, q, |row| node_to_user(&row.get_node("u")?)).await
    }
}
