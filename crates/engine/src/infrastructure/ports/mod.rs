//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the engine. Everything else is concrete types.
//! Ports exist for:
//! - Graph access (Neo4j today)
//! - Narrative collaborators (embedding, scanning, generation, outcomes)
//! - Clock (for testing)

mod error;
mod external;
mod repos;
mod testing;
pub mod types;

// =============================================================================
// Errors
// =============================================================================
pub use error::{CollaboratorError, RepoError};

// =============================================================================
// Repository Ports
// =============================================================================
pub use repos::{AccountRepo, GraphRepo, ObjectRepo, SceneRepo, TraceRepo, UserRepo};

pub use types::{
    EntryLink, GraphLink, GraphNode, GraphSnapshot, LocationUpdate, NodeRef, ObjectRelationship,
    PortalOrigin, RelatedObject, GENERIC_RELATION,
};

// =============================================================================
// External Service Ports
// =============================================================================
pub use external::{
    EmbeddingPort, InteractionRequest, MotivePort, NavigationPort, NavigationReply, NearbyScene,
    ObjectScanPort, OutcomePort, OutcomeReply, RelationExtractionPort, ScannedObject,
    SceneGenerationPort, SelfActionRequest,
};

// =============================================================================
// Test-Only Mocks (only available during test builds)
// =============================================================================
#[cfg(test)]
pub use repos::{
    MockAccountRepo, MockGraphRepo, MockObjectRepo, MockSceneRepo, MockTraceRepo, MockUserRepo,
};

#[cfg(test)]
pub use external::{
    MockEmbeddingPort, MockMotivePort, MockNavigationPort, MockObjectScanPort, MockOutcomePort,
    MockRelationExtractionPort, MockSceneGenerationPort,
};

#[cfg(test)]
pub use testing::MockClockPort;

// =============================================================================
// Testing Ports
// =============================================================================
pub use testing::ClockPort;
