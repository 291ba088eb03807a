//! Kizuna server: PostgreSQL adapters, use-case services and the
//! background scheduler for the compatibility engine.

pub mod adapters;
pub mod application;
pub mod config;
pub mod services;

use std::sync::Arc;

use sqlx::PgPool;

use adapters::{PgConnectionRepository, PgProfileRepository, PgRecommendationRepository};
use application::{ConnectionService, RecommendationService};
use config::EngineConfig;

/// Type aliases for application services with concrete repository implementations
pub type AppRecommendationService =
    RecommendationService<PgProfileRepository, PgRecommendationRepository, PgConnectionRepository>;
pub type AppConnectionService = ConnectionService<PgConnectionRepository>;

/// Engine services wired to a shared connection pool
#[derive(Clone)]
pub struct Engine {
    pub pool: PgPool,
    pub recommendations: Arc<AppRecommendationService>,
    pub connections: Arc<AppConnectionService>,
}

impl Engine {
    pub fn new(pool: PgPool, config: EngineConfig) -> Self {
        let profile_repo = Arc::new(PgProfileRepository::new(pool.clone()));
        let recommendation_repo = Arc::new(PgRecommendationRepository::new(pool.clone()));
        let connection_repo = Arc::new(PgConnectionRepository::new(pool.clone()));

        let recommendations = Arc::new(RecommendationService::new(
            profile_repo,
            recommendation_repo,
            connection_repo.clone(),
            config.clone(),
        ));
        let connections = Arc::new(ConnectionService::new(connection_repo, config));

        Self {
            pool,
            recommendations,
            connections,
        }
    }

    /// Apply the bundled schema migrations
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!().run(&self.pool).await
    }
}
