//! Movement use cases.
//!
//! Positional relocation, caller-chosen relocation and free-text navigation
//! that may generate the destination on demand.

mod destination;
mod navigate;
mod relocate;

pub use destination::extract_destination;
pub use navigate::{
    Arrival, MovementOutcome, NavigationCollaborators, NavigationError, WorldGenerator,
};
pub use relocate::{Relocation, RelocationError, SceneResolver, Similar};

use std::sync::Arc;

/// Container for movement use cases.
pub struct MovementUseCases {
    pub resolver: Arc<SceneResolver>,
    pub world: Arc<WorldGenerator>,
}

impl MovementUseCases {
    pub fn new(resolver: Arc<SceneResolver>, world: Arc<WorldGenerator>) -> Self {
        Self { resolver, world }
    }
}
