//! Use cases - User story orchestration.
//!
//! Each module contains use cases for a specific domain area.
//! Use cases orchestrate across repository and collaborator ports.

pub mod action;
pub mod management;
pub mod movement;

pub use action::ActionUseCases;
pub use management::ManagementUseCases;
pub use movement::MovementUseCases;
