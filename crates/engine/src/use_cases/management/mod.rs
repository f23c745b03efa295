//! Management use cases for CRUD-style operations.
//!
//! Reads return `Ok(None)` for missing ids; writes that reference a missing
//! node fail with `ManagementError::NotFound`.

mod account;
mod graph;
mod object;
mod scene;
mod user;

pub use account::{AccountCrud, AccountSession};
pub use graph::GraphOps;
pub use object::{NewObject, ObjectCrud};
pub use scene::SceneCrud;
pub use user::UserCrud;

use worldgraph_domain::DomainError;

use crate::infrastructure::ports::RepoError;

/// Shared error type for management use cases.
#[derive(Debug, thiserror::Error)]
pub enum ManagementError {
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

impl ManagementError {
    pub fn not_found(entity_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type,
            id: id.to_string(),
        }
    }
}

impl From<DomainError> for ManagementError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { entity_type, id } => Self::NotFound { entity_type, id },
            other => Self::InvalidInput(other.to_string()),
        }
    }
}

/// Container for management use cases.
pub struct ManagementUseCases {
    pub scene: SceneCrud,
    pub object: ObjectCrud,
    pub user: UserCrud,
    pub account: AccountCrud,
    pub graph: GraphOps,
}

impl ManagementUseCases {
    pub fn new(
        scene: SceneCrud,
        object: ObjectCrud,
        user: UserCrud,
        account: AccountCrud,
        graph: GraphOps,
    ) -> Self {
        Self {
            scene,
            object,
            user,
            account,
            graph,
        }
    }
}
