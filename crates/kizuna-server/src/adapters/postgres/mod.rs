//! PostgreSQL Repository Implementations

mod connection_repository;
mod locks;
mod profile_repository;
mod recommendation_repository;

pub use connection_repository::PgConnectionRepository;
pub use profile_repository::PgProfileRepository;
pub use recommendation_repository::PgRecommendationRepository;
