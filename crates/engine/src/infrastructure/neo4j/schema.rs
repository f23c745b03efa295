//! Neo4j schema initialization - constraints and indexes.

use neo4rs::query;
use worldgraph_domain::NodeLabel;

use crate::infrastructure::neo4j::Neo4jGraph;

/// Initialize Neo4j schema with required constraints and indexes.
///
/// This should be called once on startup. Constraints are created with
/// IF NOT EXISTS to be idempotent.
pub async fn ensure_schema(graph: &Neo4jGraph) -> Result<(), neo4rs::Error> {
    for label in NodeLabel::ALL {
        let name = label.as_str().to_lowercase();
        graph
            .run(query(&format!(
                "CREATE CONSTRAINT {name}_id_unique IF NOT EXISTS
                 FOR (n:{label}) REQUIRE n.id IS UNIQUE"
            )))
            .await?;
    }

    // Generated scenes are deduplicated by exact description.
    graph
        .run(query(
            "CREATE INDEX scene_description IF NOT EXISTS
             FOR (s:Scene) ON (s.description)",
        ))
        .await?;

    graph
        .run(query(
            "CREATE CONSTRAINT account_external_auth_id_unique IF NOT EXISTS
             FOR (a:Account) REQUIRE a.external_auth_id IS UNIQUE",
        ))
        .await?;

    tracing::info!("Neo4j schema initialized (constraints and indexes ensured)");
    Ok(())
}
