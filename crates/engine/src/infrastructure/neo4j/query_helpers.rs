//! Row plumbing shared by the graph repositories.
//!
//! Every helper maps driver failures to [`RepoError::Database`] and hands
//! rows to a converter from `helpers.rs`.

use neo4rs::{Query, Row};

use super::graph::{Neo4jGraph, Neo4jRowStream};
use crate::infrastructure::ports::RepoError;

async fn open(graph: &Neo4jGraph, query: Query) -> Result<Neo4jRowStream, RepoError> {
    graph
        .execute(query)
        .await
        .map_err(|e| RepoError::database("execute", e))
}

async fn pull(stream: &mut Neo4jRowStream) -> Result<Option<Row>, RepoError> {
    stream
        .next()
        .await
        .map_err(|e| RepoError::database("fetch_row", e))
}

/// Run `query` and convert every returned row.
pub async fn collect_rows<T, F>(
    graph: &Neo4jGraph,
    query: Query,
    converter: F,
) -> Result<Vec<T>, RepoError>
where
    F: Fn(Row) -> Result<T, RepoError>,
{
    let mut stream = open(graph, query).await?;
    let mut items = Vec::new();
    while let Some(row) = pull(&mut stream).await? {
        items.push(converter(row)?);
    }
    Ok(items)
}

/// Run `query` and convert the first row, if any. Remaining rows are dropped.
pub async fn get_first_row<T, F>(
    graph: &Neo4jGraph,
    query: Query,
    converter: F,
) -> Result<Option<T>, RepoError>
where
    F: Fn(Row) -> Result<T, RepoError>,
{
    let mut stream = open(graph, query).await?;
    pull(&mut stream).await?.map(converter).transpose()
}

/// A write anchored on one node. No row back means the anchor is missing.
pub async fn write_expecting_row<T, F>(
    graph: &Neo4jGraph,
    query: Query,
    converter: F,
    entity_type: &'static str,
    id: impl ToString,
) -> Result<T, RepoError>
where
    F: Fn(Row) -> Result<T, RepoError>,
{
    get_first_row(graph, query, converter)
        .await?
        .ok_or_else(|| RepoError::not_found(entity_type, id))
}

/// Fire-and-forget write; `operation` labels the error.
pub async fn run_query(
    graph: &Neo4jGraph,
    query: Query,
    operation: &'static str,
) -> Result<(), RepoError> {
    graph
        .run(query)
        .await
        .map_err(|e| RepoError::database(operation, e))
}
