//! Worldgraph domain.
//!
//! Users, scenes and objects form a typed graph enriched with polar
//! coordinates and embedding vectors. This crate holds the data model and
//! the pure ranking math; persistence and collaborators live in the engine.

extern crate self as worldgraph_domain;

pub mod common;
pub mod entities;
pub mod error;
pub mod graph;
pub mod ids;
pub mod ranking;
pub mod value_objects;

pub use entities::{Account, Object, Scene, Trace, User};
pub use error::DomainError;
pub use graph::{EdgeType, NodeLabel, ObjectRelationType};
pub use ids::{AccountId, ObjectId, SceneId, TraceId, UserId};
pub use ranking::{
    rank_by_similarity, rank_scenes, select_scene, SceneRank, Scored, SelectionMethod,
    SimilarityMetric, DISTANCE_EPSILON,
};
pub use value_objects::{
    cosine_similarity, dot, spatial_distance, Embedding, PolarPosition, RelationTriple,
    EMBEDDING_DIMENSIONS,
};
