//! Graph node entities.
//!
//! Plain data with public fields. Constructors validate the few invariants
//! that exist (non-blank text, finite positions); relationships between
//! nodes are graph edges and never embedded here.

mod account;
mod object;
mod scene;
mod trace;
mod user;

pub use account::Account;
pub use object::Object;
pub use scene::Scene;
pub use trace::Trace;
pub use user::User;
