//! Repository Ports
//!
//! Abstract interfaces for data persistence operations.

mod connection_repository;
mod profile_repository;
mod recommendation_repository;

pub use connection_repository::*;
pub use profile_repository::*;
pub use recommendation_repository::*;
