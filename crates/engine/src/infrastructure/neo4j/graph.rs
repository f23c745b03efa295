//! Neo4j graph wrapper with slow-query logging.

use std::pin::Pin;
use std::time::{Duration, Instant};

use futures_util::{Stream, TryStreamExt};
use neo4rs::{Graph, Query, Row, Txn};

/// Queries slower than this are logged at `warn`.
const SLOW_QUERY_THRESHOLD: Duration = Duration::from_millis(250);

/// Concrete wrapper around `neo4rs::Graph`.
///
/// Cheap to clone; every clone shares the same connection pool.
#[derive(Clone)]
pub struct Neo4jGraph {
    inner: Graph,
}

pub struct Neo4jRowStream {
    inner: Pin<Box<dyn Stream<Item = Result<Row, neo4rs::Error>> + Send>>,
}

impl Neo4jRowStream {
    fn from_stream<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<Row, neo4rs::Error>> + Send + 'static,
    {
        Self {
            inner: Box::pin(stream),
        }
    }

    pub async fn next(&mut self) -> Result<Option<Row>, neo4rs::Error> {
        let next = futures_util::future::poll_fn(|cx| self.inner.as_mut().poll_next(cx)).await;
        match next {
            Some(row) => row.map(Some),
            None => Ok(None),
        }
    }
}

impl Neo4jGraph {
    pub fn new(graph: Graph) -> Self {
        Self { inner: graph }
    }

    fn record(&self, operation: &str, elapsed: Duration) {
        if elapsed > SLOW_QUERY_THRESHOLD {
            tracing::warn!(
                operation,
                elapsed_ms = elapsed.as_millis() as u64,
                "Slow Neo4j query"
            );
        }
    }

    pub async fn run(&self, query: Query) -> Result<(), neo4rs::Error> {
        let start = Instant::now();
        let result = self.inner.run(query).await;
        self.record("run", start.elapsed());
        result
    }

    pub async fn execute(&self, query: Query) -> Result<Neo4jRowStream, neo4rs::Error> {
        let start = Instant::now();
        let result = self.inner.execute(query).await;
        self.record("execute", start.elapsed());
        result.map(|stream| {
            let stream = stream.into_stream();
            let stream = TryStreamExt::into_stream(stream);
            Neo4jRowStream::from_stream(stream)
        })
    }

    pub async fn start_txn(&self) -> Result<Txn, neo4rs::Error> {
        self.inner.start_txn().await
    }
}
