//! Value objects - Immutable objects defined by their attributes

mod embedding;
mod polar;
mod relation;

pub use embedding::{cosine_similarity, dot, Embedding, EMBEDDING_DIMENSIONS};
pub use polar::{spatial_distance, PolarPosition};
pub use relation::RelationTriple;
