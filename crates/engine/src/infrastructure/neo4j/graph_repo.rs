//! Neo4j graph-wide operations: portals between arbitrary nodes and the
//! whole-graph export.

use async_trait::async_trait;
use neo4rs::{query, Row};
use worldgraph_domain::EdgeType;

use super::helpers::RowExt;
use super::query_helpers::{collect_rows, get_first_row};
use super::Neo4jGraph;
use crate::infrastructure::ports::{
    EntryLink, GraphLink, GraphNode, GraphRepo, GraphSnapshot, NodeRef, RepoError,
};

pub struct Neo4jGraphRepo {
    graph: Neo4jGraph,
}

impl Neo4jGraphRepo {
    pub fn new(graph: Neo4jGraph) -> Self {
        Self { graph }
    }
}

/// Read a `GraphNode` from columns `{prefix}_id`, `{prefix}_label`, `{prefix}_type`.
fn row_to_graph_node(row: &Row, prefix: &str) -> Result<GraphNode, RepoError> {
    Ok(GraphNode {
        id: row.get_string_strict(&format!("{prefix}_id"))?,
        label: row.get_string_or(&format!("{prefix}_label"), ""),
        node_type: row.get_string_or(&format!("{prefix}_type"), ""),
    })
}

#[async_trait]
impl GraphRepo for Neo4jGraphRepo {
    async fn create_entry(&self, from: NodeRef, to: NodeRef) -> Result<EntryLink, RepoError> {
        let cypher = format!(
            "MATCH (a:{from_label} {{id: $from_id}})
            MATCH (b:{to_label} {{id: $to_id}})
            CREATE (a)-[:{edge}]->(b)
            RETURN a.id AS from_id,
                   coalesce(a.name, a.description, labels(a)[0]) AS from_label,
                   labels(a)[0] AS from_type,
                   b.id AS to_id,
                   coalesce(b.name, b.description, labels(b)[0]) AS to_label,
                   labels(b)[0] AS to_type",
            from_label = from.label.as_str(),
            to_label = to.label.as_str(),
            edge = EdgeType::EntryTo.as_str(),
        );
        let q = query(&cypher)
            .param("from_id", from.id.to_string())
            .param("to_id", to.id.to_string());

        let link = get_first_row(&self.graph, q, |row| {
            Ok(EntryLink {
                from: row_to_graph_node(&row, "from")?,
                to: row_to_graph_node(&row, "to")?,
            })
        })
        .await?;
        if let Some(link) = link {
            tracing::debug!(from = %from.id, to = %to.id, "Created entry");
            return Ok(link);
        }

        let lookup = query(&format!(
            "MATCH (n:{label} {{id: $id}}) RETURN n.id AS id",
            label = from.label.as_str()
        ))
        .param("id", from.id.to_string());
        let from_exists = get_first_row(&self.graph, lookup, |row| row.get_string_strict("id"))
            .await?
            .is_some();
        if from_exists {
            Err(RepoError::not_found(to.label.as_str(), to.id))
        } else {
            Err(RepoError::not_found(from.label.as_str(), from.id))
        }
    }

    async fn entries(&self, node: NodeRef) -> Result<Vec<GraphNode>, RepoError> {
        let cypher = format!(
            "MATCH (n)-[:{edge}]->(:{label} {{id: $id}})
            RETURN DISTINCT n.id AS node_id,
                   coalesce(n.name, n.description, labels(n)[0]) AS node_label,
                   labels(n)[0] AS node_type
            ORDER BY node_id",
            edge = EdgeType::EntryTo.as_str(),
            label = node.label.as_str(),
        );
        let q = query(&cypher).param("id", node.id.to_string());
        collect_rows(&self.graph, q, |row| row_to_graph_node(&row, "node")).await
    }

    async fn snapshot(&self) -> Result<GraphSnapshot, RepoError> {
        let nodes_q = query(
            "MATCH (n)
            RETURN n.id AS node_id,
                   coalesce(n.name, n.description, labels(n)[0]) AS node_label,
                   labels(n)[0] AS node_type
            ORDER BY node_type, node_id",
        );
        let nodes = collect_rows(&self.graph, nodes_q, |row| row_to_graph_node(&row, "node")).await?;

        let links_q = query(
            "MATCH (a)-[r]->(b)
            RETURN a.id AS source, b.id AS target, type(r) AS label
            ORDER BY source, target, label",
        );
        let links = collect_rows(&self.graph, links_q, |row| {
            Ok(GraphLink {
                source: row.get_string_strict("source")?,
                target: row.get_string_strict("target")?,
                label: row.get_string_strict("label")?,
            })
        })
        .await?;

        tracing::debug!(nodes = nodes.len(), links = links.len(), "Exported graph");
        Ok(GraphSnapshot { nodes, links })
    }
}
