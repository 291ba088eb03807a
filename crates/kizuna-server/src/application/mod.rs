//! Application Layer (Use Cases)
//!
//! Orchestrates domain operations and coordinates between
//! repositories.

mod connection_service;
mod recommendation_service;

pub use connection_service::ConnectionService;
pub use recommendation_service::{RecommendationService, ViewerRun};
