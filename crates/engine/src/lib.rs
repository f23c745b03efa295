//! Worldgraph Engine library.
//!
//! Graph persistence, scene resolution, on-demand world generation and
//! action resolution for a narrative world stored in Neo4j.
//!
//! ## Structure
//!
//! - `use_cases/` - User story orchestration across ports
//! - `infrastructure/` - Port traits and their adapters (Neo4j, narrative service)
//! - `api/` - HTTP entry points
//! - `app` - Application composition
//! - `config` - Environment configuration

pub mod api;
pub mod app;
pub mod config;
pub mod infrastructure;
pub mod use_cases;

pub use app::App;
pub use config::EngineConfig;
