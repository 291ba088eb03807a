//! Scheduler Service - periodic regeneration and expiry sweeps
//!
//! Regenerates every viewer's recommendations and removes stale pending
//! requests at configured intervals.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{interval, MissedTickBehavior};

use kizuna::{ConnectionRepository, GenerationOutcome, ProfileRepository, RecommendationRepository};

use crate::application::{ConnectionService, RecommendationService};

/// Scheduler configuration
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Interval between full regeneration cycles
    pub regenerate_interval: Duration,
    /// Interval between pending-request expiry sweeps
    pub sweep_interval: Duration,
    /// Enable/disable scheduler
    pub enabled: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            regenerate_interval: Duration::from_secs(3600), // 1 hour
            sweep_interval: Duration::from_secs(900),       // 15 minutes
            enabled: true,
        }
    }
}

/// Tally of one regeneration cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleSummary {
    pub generated: usize,
    pub empty: usize,
    pub failed: usize,
}

/// Recommendation scheduler
pub struct RecommendationScheduler<P, R, C>
where
    P: ProfileRepository,
    R: RecommendationRepository,
    C: ConnectionRepository,
{
    recommendations: Arc<RecommendationService<P, R, C>>,
    connections: Arc<ConnectionService<C>>,
    config: SchedulerConfig,
}

impl<P, R, C> RecommendationScheduler<P, R, C>
where
    P: ProfileRepository + 'static,
    R: RecommendationRepository + 'static,
    C: ConnectionRepository + 'static,
{
    /// Creates a new scheduler
    pub fn new(
        recommendations: Arc<RecommendationService<P, R, C>>,
        connections: Arc<ConnectionService<C>>,
        config: Option<SchedulerConfig>,
    ) -> Self {
        Self {
            recommendations,
            connections,
            config: config.unwrap_or_default(),
        }
    }

    /// Start the scheduler (runs in background)
    pub fn start(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    /// Run the scheduler loop
    async fn run(self) {
        if !self.config.enabled {
            tracing::info!("📅 Recommendation scheduler disabled");
            return;
        }

        tracing::info!(
            "📅 Recommendation scheduler started (regenerate: {:?}, sweep: {:?})",
            self.config.regenerate_interval,
            self.config.sweep_interval
        );

        let mut regenerate = interval(self.config.regenerate_interval);
        let mut sweep = interval(self.config.sweep_interval);
        regenerate.set_missed_tick_behavior(MissedTickBehavior::Delay);
        sweep.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // Skip the first immediate tick
        regenerate.tick().await;
        sweep.tick().await;

        loop {
            tokio::select! {
                _ = regenerate.tick() => {
                    self.regenerate_cycle().await;
                }
                _ = sweep.tick() => {
                    self.sweep_cycle().await;
                }
            }
        }
    }

    /// Regenerate recommendations for every viewer once
    pub async fn regenerate_cycle(&self) -> CycleSummary {
        tracing::info!("🔄 Scheduler: Starting regeneration cycle...");

        let runs = match self.recommendations.generate_all(None).await {
            Ok(runs) => runs,
            Err(e) => {
                tracing::warn!("❌ Scheduler: Could not list viewers: {}", e);
                return CycleSummary::default();
            }
        };

        let mut summary = CycleSummary::default();
        for run in &runs {
            match &run.result {
                Ok(GenerationOutcome::Generated { recommendations }) => {
                    summary.generated += 1;
                    tracing::debug!("  ✅ {}: {} recommendations", run.viewer_id, recommendations.len());
                }
                Ok(GenerationOutcome::NoEligibleCandidates) => {
                    summary.empty += 1;
                    tracing::debug!("  ⚪ {}: no eligible candidates", run.viewer_id);
                }
                Err(e) => {
                    summary.failed += 1;
                    tracing::warn!("  ❌ {}: {}", run.viewer_id, e);
                }
            }
        }

        tracing::info!(
            "🔄 Scheduler: Regeneration cycle completed ({} generated, {} empty, {} failed)",
            summary.generated,
            summary.empty,
            summary.failed
        );

        summary
    }

    /// Remove expired pending requests once
    pub async fn sweep_cycle(&self) -> Option<u64> {
        match self.connections.expire_pending().await {
            Ok(expired) => {
                tracing::debug!("🧹 Scheduler: Sweep removed {} pending request(s)", expired);
                Some(expired)
            }
            Err(e) => {
                tracing::warn!("❌ Scheduler: Sweep failed: {}", e);
                None
            }
        }
    }
}

/// Start the scheduler unless it is disabled
pub fn maybe_start_scheduler<P, R, C>(
    recommendations: Arc<RecommendationService<P, R, C>>,
    connections: Arc<ConnectionService<C>>,
    config: SchedulerConfig,
) -> Option<tokio::task::JoinHandle<()>>
where
    P: ProfileRepository + 'static,
    R: RecommendationRepository + 'static,
    C: ConnectionRepository + 'static,
{
    if !config.enabled {
        return None;
    }

    let scheduler = RecommendationScheduler::new(recommendations, connections, Some(config));
    Some(scheduler.start())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryStore;
    use crate::config::EngineConfig;
    use chrono::NaiveDate;
    use kizuna::{GeoPoint, PreferenceSet, Profile};
    use uuid::Uuid;

    fn profile(user_id: Uuid, lat: f64) -> Profile {
        Profile {
            user_id,
            location: GeoPoint::new(lat, 139.7).unwrap(),
            birthdate: NaiveDate::from_ymd_opt(1995, 4, 1).unwrap(),
            food: PreferenceSet::from_csv("A1,B1"),
            hobbies: PreferenceSet::from_csv("C1"),
            music: PreferenceSet::new(),
        }
    }

    fn scheduler(
        store: &Arc<InMemoryStore>,
    ) -> RecommendationScheduler<InMemoryStore, InMemoryStore, InMemoryStore> {
        let config = EngineConfig::default();
        let recommendations = Arc::new(RecommendationService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            config.clone(),
        ));
        let connections = Arc::new(ConnectionService::new(store.clone(), config));
        RecommendationScheduler::new(recommendations, connections, None)
    }

    #[tokio::test]
    async fn test_regenerate_cycle_counts_outcomes() {
        let store = Arc::new(InMemoryStore::new());
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        store.insert_profile(profile(a, 35.68));
        store.insert_profile(profile(b, 35.69));

        let summary = scheduler(&store).regenerate_cycle().await;

        assert_eq!(
            summary,
            CycleSummary {
                generated: 2,
                empty: 0,
                failed: 0
            }
        );
        assert_eq!(store.recommendation_count(a), 1);
        assert_eq!(store.recommendation_count(b), 1);
    }

    #[tokio::test]
    async fn test_regenerate_cycle_reports_failures() {
        let store = Arc::new(InMemoryStore::new());
        store.insert_profile(profile(Uuid::new_v4(), 35.68));
        store.insert_profile(profile(Uuid::new_v4(), 35.69));
        store.set_fail_writes(true);

        let summary = scheduler(&store).regenerate_cycle().await;

        assert_eq!(summary.failed, 2);
        assert_eq!(summary.generated, 0);
    }

    #[tokio::test]
    async fn test_lone_viewer_counts_as_empty() {
        let store = Arc::new(InMemoryStore::new());
        store.insert_profile(profile(Uuid::new_v4(), 35.68));

        let summary = scheduler(&store).regenerate_cycle().await;

        assert_eq!(summary.empty, 1);
    }

    #[tokio::test]
    async fn test_sweep_cycle_expires_stale_requests() {
        let store = Arc::new(InMemoryStore::new());
        let s = scheduler(&store);
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();
        s.connections.request(a, b).await.unwrap();
        s.connections.request(a, c).await.unwrap();
        store.backdate_request(a, b, chrono::Duration::days(30));

        assert_eq!(s.sweep_cycle().await, Some(1));
        assert_eq!(store.pending_count(), 1);
    }

    #[tokio::test]
    async fn test_disabled_scheduler_does_not_start() {
        let store = Arc::new(InMemoryStore::new());
        let s = scheduler(&store);
        let config = SchedulerConfig {
            enabled: false,
            ..SchedulerConfig::default()
        };

        assert!(maybe_start_scheduler(s.recommendations, s.connections, config).is_none());
    }
}
