//! Action use cases: resolving what a user's action does to the world.

mod resolve;

pub use resolve::{ActionCollaborators, ActionError, ActionResolver, ActionResult};

use std::sync::Arc;

/// Container for action use cases.
pub struct ActionUseCases {
    pub resolver: Arc<ActionResolver>,
}

impl ActionUseCases {
    pub fn new(resolver: Arc<ActionResolver>) -> Self {
        Self { resolver }
    }
}
