//! Infrastructure implementations.
//!
//! Contains port trait implementations for external dependencies.

pub mod clock;
pub mod narrative;
pub mod neo4j;
pub mod ports;
