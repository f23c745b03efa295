//! Neo4j database implementations.

use std::sync::Arc;

use neo4rs::{query, ConfigBuilder, Graph};

mod account_repo;
mod graph;
mod graph_repo;
mod helpers;
mod object_repo;
mod query_helpers;
mod scene_repo;
mod schema;
mod trace_repo;
mod user_repo;

#[cfg(test)]
pub(crate) mod test_harness;

pub use account_repo::Neo4jAccountRepo;
pub use graph::{Neo4jGraph, Neo4jRowStream};
pub use graph_repo::Neo4jGraphRepo;
pub use object_repo::Neo4jObjectRepo;
pub use scene_repo::Neo4jSceneRepo;
pub use schema::ensure_schema;
pub use trace_repo::Neo4jTraceRepo;
pub use user_repo::Neo4jUserRepo;

/// Connection parameters for the shared pool.
#[derive(Debug, Clone)]
pub struct Neo4jSettings {
    pub uri: String,
    pub user: String,
    pub password: String,
    pub max_connections: usize,
}

/// Open the shared connection pool and verify it with a trivial query.
pub async fn connect(settings: &Neo4jSettings) -> Result<Neo4jGraph, neo4rs::Error> {
    let config = ConfigBuilder::default()
        .uri(settings.uri.as_str())
        .user(settings.user.as_str())
        .password(settings.password.as_str())
        .max_connections(settings.max_connections)
        .build()?;

    let graph = Graph::connect(config).await?;
    graph.run(query("RETURN 1")).await?;
    tracing::info!(
        uri = %settings.uri,
        max_connections = settings.max_connections,
        "Connected to Neo4j"
    );

    Ok(Neo4jGraph::new(graph))
}

/// Create all Neo4j repositories from a graph connection.
pub struct Neo4jRepositories {
    pub scene: Arc<Neo4jSceneRepo>,
    pub object: Arc<Neo4jObjectRepo>,
    pub user: Arc<Neo4jUserRepo>,
    pub account: Arc<Neo4jAccountRepo>,
    pub trace: Arc<Neo4jTraceRepo>,
    pub graph: Arc<Neo4jGraphRepo>,
}

impl Neo4jRepositories {
    pub fn new(graph: Neo4jGraph) -> Self {
        Self {
            scene: Arc::new(Neo4jSceneRepo::new(graph.clone())),
            object: Arc::new(Neo4jObjectRepo::new(graph.clone())),
            user: Arc::new(Neo4jUserRepo::new(graph.clone())),
            account: Arc::new(Neo4jAccountRepo::new(graph.clone())),
            trace: Arc::new(Neo4jTraceRepo::new(graph.clone())),
            graph: Arc::new(Neo4jGraphRepo::new(graph)),
        }
    }
}
