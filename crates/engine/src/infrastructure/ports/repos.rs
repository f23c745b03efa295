//! Repository port traits for graph access.
//!
//! Reads return `Ok(None)` for missing ids. Writes that reference a missing
//! node fail with `RepoError::NotFound`.

use async_trait::async_trait;
use worldgraph_domain::*;

use super::error::RepoError;
use super::types::{
    EntryLink, GraphNode, GraphSnapshot, LocationUpdate, NodeRef, ObjectRelationship,
    PortalOrigin, RelatedObject,
};

// =============================================================================
// Database Ports (one per entity type)
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SceneRepo: Send + Sync {
    async fn get(&self, id: SceneId) -> Result<Option<Scene>, RepoError>;
    async fn save(&self, scene: &Scene) -> Result<(), RepoError>;

    /// Every scene, embeddings included. Candidate set for ranking.
    async fn list(&self) -> Result<Vec<Scene>, RepoError>;

    /// Oldest scene whose description equals `description` exactly.
    async fn find_by_description(&self, description: &str) -> Result<Option<Scene>, RepoError>;

    /// Scene whose description contains `text`, or is contained in it,
    /// ignoring case. Longest description wins.
    async fn find_by_containment(&self, text: &str) -> Result<Option<Scene>, RepoError>;

    async fn update_position(
        &self,
        id: SceneId,
        position: PolarPosition,
    ) -> Result<Scene, RepoError>;

    /// Objects linked by `CONTAINS`.
    async fn list_objects(&self, id: SceneId) -> Result<Vec<Object>, RepoError>;

    /// `Scene -[type]-> object` triples for every contained object, following
    /// one further object-to-object edge where present.
    async fn environment_relations(&self, id: SceneId) -> Result<Vec<RelationTriple>, RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectRepo: Send + Sync {
    async fn get(&self, id: ObjectId) -> Result<Option<Object>, RepoError>;
    async fn save(&self, object: &Object) -> Result<(), RepoError>;

    /// Create `object` with a `CONTAINS` edge from the scene and, when
    /// `portal` is set, an `ENTRY_TO` edge back into it.
    async fn create_in_scene(
        &self,
        scene_id: SceneId,
        object: &Object,
        portal: Option<PortalOrigin>,
    ) -> Result<(), RepoError>;

    async fn create_relationship(
        &self,
        from: ObjectId,
        to: ObjectId,
        relation: ObjectRelationType,
    ) -> Result<(), RepoError>;

    async fn relationships(
        &self,
        id: ObjectId,
        relation: Option<ObjectRelationType>,
    ) -> Result<Vec<ObjectRelationship>, RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn get(&self, id: UserId) -> Result<Option<User>, RepoError>;
    async fn save(&self, user: &User) -> Result<(), RepoError>;
    async fn list(&self) -> Result<Vec<User>, RepoError>;

    async fn update_position(&self, id: UserId, position: PolarPosition)
        -> Result<User, RepoError>;
    async fn update_introduction(&self, id: UserId, introduction: &str)
        -> Result<User, RepoError>;

    /// Scene at the end of the user's `LOCATED_AT` edge.
    async fn current_scene(&self, id: UserId) -> Result<Option<Scene>, RepoError>;

    /// Objects within three hops of the user, not crossing `ENTRY_TO`.
    async fn related_objects(&self, id: UserId) -> Result<Vec<RelatedObject>, RepoError>;

    /// Replace the user's `LOCATED_AT` edge in one transaction.
    ///
    /// Rolls back with `RepoError::ConsistencyViolation` unless exactly one
    /// edge remains afterwards.
    async fn relocate(&self, id: UserId, update: &LocationUpdate) -> Result<(), RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountRepo: Send + Sync {
    async fn get(&self, id: AccountId) -> Result<Option<Account>, RepoError>;
    async fn find_by_external_auth_id(
        &self,
        external_auth_id: &str,
    ) -> Result<Option<Account>, RepoError>;

    /// Create the account, its first user and the `BELONGS_TO` edge together.
    async fn create_with_user(&self, account: &Account, user: &User) -> Result<(), RepoError>;

    async fn add_user(&self, id: AccountId, user: &User) -> Result<(), RepoError>;
    async fn list_users(&self, id: AccountId) -> Result<Vec<User>, RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TraceRepo: Send + Sync {
    /// Create the trace and link it from the scene with `TRACE`.
    async fn record(&self, scene_id: SceneId, trace: &Trace) -> Result<(), RepoError>;
}

/// Label-generic operations that address nodes by `NodeRef`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GraphRepo: Send + Sync {
    async fn create_entry(&self, from: NodeRef, to: NodeRef) -> Result<EntryLink, RepoError>;

    /// Nodes holding an `ENTRY_TO` into `node`.
    async fn entries(&self, node: NodeRef) -> Result<Vec<GraphNode>, RepoError>;

    async fn snapshot(&self) -> Result<GraphSnapshot, RepoError>;
}
