//! Domain Entities
//!
//! Pure domain models without infrastructure dependencies.
//! - Profile: scoring view of a user (read-only for the engine)
//! - Recommendation: ranked candidate persisted per viewer
//! - Connection: requests, durable connections and the pair state machine

mod connection;
mod profile;
mod recommendation;

pub use connection::*;
pub use profile::*;
pub use recommendation::*;
