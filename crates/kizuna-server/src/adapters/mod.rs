//! Infrastructure Adapters
//!
//! Implementations of domain ports for external systems.

#[cfg(test)]
pub mod memory;
pub mod postgres;

// Re-exports
pub use postgres::{PgConnectionRepository, PgProfileRepository, PgRecommendationRepository};
