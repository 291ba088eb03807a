//! Recommendation Application Service (Use Case)
//!
//! Scores a viewer's candidate pool, ranks it and replaces the viewer's
//! persisted recommendation set.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use kizuna::domain::services::ranking;
use kizuna::{
    CompatibilityScorer, ConnectionRepository, DomainError, GenerationOutcome, Profile,
    ProfileRepository, Recommendation, RecommendationRepository, WeightVector,
};

use crate::config::EngineConfig;

/// Outcome of regenerating one viewer inside a batch run
#[derive(Debug)]
pub struct ViewerRun {
    pub viewer_id: Uuid,
    pub result: Result<GenerationOutcome, DomainError>,
}

/// Application service for recommendation generation
pub struct RecommendationService<P, R, C>
where
    P: ProfileRepository,
    R: RecommendationRepository,
    C: ConnectionRepository,
{
    profiles: Arc<P>,
    recommendations: Arc<R>,
    connections: Arc<C>,
    config: EngineConfig,
}

impl<P, R, C> RecommendationService<P, R, C>
where
    P: ProfileRepository,
    R: RecommendationRepository,
    C: ConnectionRepository,
{
    pub fn new(
        profiles: Arc<P>,
        recommendations: Arc<R>,
        connections: Arc<C>,
        config: EngineConfig,
    ) -> Self {
        Self {
            profiles,
            recommendations,
            connections,
            config,
        }
    }

    /// Regenerate recommendations for a viewer from every complete profile.
    ///
    /// `limit` defaults to the configured recommendation limit.
    pub async fn generate(
        &self,
        viewer_id: Uuid,
        limit: Option<usize>,
    ) -> Result<GenerationOutcome, DomainError> {
        let pool = self.profiles.find_candidates(viewer_id).await?;
        self.generate_from_pool(viewer_id, &pool, limit.unwrap_or(self.config.recommendation_limit))
            .await
    }

    /// Regenerate recommendations for a viewer from an explicit candidate pool
    pub async fn generate_from_pool(
        &self,
        viewer_id: Uuid,
        pool: &[Profile],
        limit: usize,
    ) -> Result<GenerationOutcome, DomainError> {
        let viewer = self
            .profiles
            .find_profile(viewer_id)
            .await?
            .ok_or(DomainError::MissingProfile(viewer_id))?;
        let weights = self.viewer_weights(viewer_id).await?;
        let excluded = self.connections.find_excluded_users(viewer_id).await?;

        let scorer = CompatibilityScorer::new(self.config.scoring, Utc::now().date_naive())?;
        let scored = ranking::score_pool(&scorer, &viewer, &weights, pool, &excluded)?;
        let eligible = scored.len();
        let entries = ranking::rank(viewer_id, scored, limit, Utc::now());

        let stored = self
            .recommendations
            .replace_for_viewer(viewer_id, &entries)
            .await?;

        tracing::debug!(
            "Viewer {}: {} in pool, {} excluded, {} eligible, {} stored",
            viewer_id,
            pool.len(),
            excluded.len(),
            eligible,
            stored.len()
        );

        Ok(GenerationOutcome::from_recommendations(stored))
    }

    /// Persisted recommendations for a viewer, best first
    pub async fn get(&self, viewer_id: Uuid) -> Result<Vec<Recommendation>, DomainError> {
        self.recommendations.find_by_viewer(viewer_id).await
    }

    /// Regenerate for every user with a complete profile.
    ///
    /// A failure for one viewer does not stop the run; each viewer's
    /// result is reported back.
    pub async fn generate_all(&self, limit: Option<usize>) -> Result<Vec<ViewerRun>, DomainError> {
        let viewer_ids = self.profiles.list_profile_ids().await?;
        let mut runs = Vec::with_capacity(viewer_ids.len());

        for viewer_id in viewer_ids {
            let result = self.generate(viewer_id, limit).await;
            runs.push(ViewerRun { viewer_id, result });
        }

        Ok(runs)
    }

    /// Weights default to the registration values when none are stored
    async fn viewer_weights(&self, viewer_id: Uuid) -> Result<WeightVector, DomainError> {
        match self.profiles.find_weights(viewer_id).await? {
            Some(weights) => Ok(weights),
            None => {
                tracing::debug!("Viewer {} has no weights, using registration defaults", viewer_id);
                Ok(WeightVector::default())
            }
        }
    }
}
