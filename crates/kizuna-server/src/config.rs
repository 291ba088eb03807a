//! Configuration management for the Kizuna engine
//!
//! Settings come from the process environment (optionally seeded from a
//! `.env` file). Every tunable has a default; values that are present but
//! malformed are rejected instead of silently ignored.

use std::str::FromStr;
use std::time::Duration;

use kizuna::ScoringParams;
use thiserror::Error;

use crate::services::scheduler::SchedulerConfig;

const DEFAULT_RECOMMENDATION_LIMIT: usize = 20;
const DEFAULT_PENDING_TTL_HOURS: i64 = 14 * 24;
const DEFAULT_MAX_TRANSITION_ATTEMPTS: u32 = 3;
const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required setting: {0}")]
    Missing(&'static str),

    #[error("Invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Engine policy parameters
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Distance and age decay constants
    pub scoring: ScoringParams,
    /// Number of recommendations kept per viewer when the caller gives none
    pub recommendation_limit: usize,
    /// Pending requests older than this are swept
    pub pending_ttl: chrono::Duration,
    /// Compare-and-set attempts before a lifecycle transition gives up
    pub max_transition_attempts: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scoring: ScoringParams::default(),
            recommendation_limit: DEFAULT_RECOMMENDATION_LIMIT,
            pending_ttl: chrono::Duration::hours(DEFAULT_PENDING_TTL_HOURS),
            max_transition_attempts: DEFAULT_MAX_TRANSITION_ATTEMPTS,
        }
    }
}

/// Process-level settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub max_connections: u32,
    pub engine: EngineConfig,
    pub scheduler: SchedulerConfig,
}

impl Settings {
    /// Load settings from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let max_connections =
            parse(&lookup, "KIZUNA_DB_MAX_CONNECTIONS")?.unwrap_or(DEFAULT_MAX_CONNECTIONS);

        let defaults = EngineConfig::default();
        let scoring = ScoringParams {
            distance_scale_meters: parse(&lookup, "KIZUNA_DISTANCE_SCALE_METERS")?
                .unwrap_or(defaults.scoring.distance_scale_meters),
            age_half_life_years: parse(&lookup, "KIZUNA_AGE_HALF_LIFE_YEARS")?
                .unwrap_or(defaults.scoring.age_half_life_years),
        };
        scoring.validate().map_err(|e| ConfigError::Invalid {
            key: "KIZUNA_DISTANCE_SCALE_METERS / KIZUNA_AGE_HALF_LIFE_YEARS",
            value: format!("{:?}", scoring),
            reason: e.to_string(),
        })?;

        let pending_ttl_hours: i64 =
            parse(&lookup, "KIZUNA_PENDING_TTL_HOURS")?.unwrap_or(DEFAULT_PENDING_TTL_HOURS);
        if pending_ttl_hours <= 0 {
            return Err(ConfigError::Invalid {
                key: "KIZUNA_PENDING_TTL_HOURS",
                value: pending_ttl_hours.to_string(),
                reason: "must be positive".to_string(),
            });
        }
        let pending_ttl = chrono::TimeDelta::try_hours(pending_ttl_hours)
            .filter(|ttl| chrono::Utc::now().checked_sub_signed(*ttl).is_some())
            .ok_or_else(|| ConfigError::Invalid {
                key: "KIZUNA_PENDING_TTL_HOURS",
                value: pending_ttl_hours.to_string(),
                reason: "retention reaches past the representable date range".to_string(),
            })?;

        let max_transition_attempts: u32 = parse(&lookup, "KIZUNA_MAX_TRANSITION_ATTEMPTS")?
            .unwrap_or(defaults.max_transition_attempts);
        if max_transition_attempts == 0 {
            return Err(ConfigError::Invalid {
                key: "KIZUNA_MAX_TRANSITION_ATTEMPTS",
                value: "0".to_string(),
                reason: "at least one attempt is required".to_string(),
            });
        }

        let engine = EngineConfig {
            scoring,
            recommendation_limit: parse(&lookup, "KIZUNA_RECOMMENDATION_LIMIT")?
                .unwrap_or(defaults.recommendation_limit),
            pending_ttl,
            max_transition_attempts,
        };

        let scheduler_defaults = SchedulerConfig::default();
        let scheduler = SchedulerConfig {
            regenerate_interval: parse(&lookup, "KIZUNA_REGENERATE_INTERVAL_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(scheduler_defaults.regenerate_interval),
            sweep_interval: parse(&lookup, "KIZUNA_SWEEP_INTERVAL_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(scheduler_defaults.sweep_interval),
            enabled: parse(&lookup, "KIZUNA_SCHEDULER_ENABLED")?
                .unwrap_or(scheduler_defaults.enabled),
        };
        if scheduler.regenerate_interval.is_zero() || scheduler.sweep_interval.is_zero() {
            return Err(ConfigError::Invalid {
                key: "KIZUNA_REGENERATE_INTERVAL_SECS / KIZUNA_SWEEP_INTERVAL_SECS",
                value: "0".to_string(),
                reason: "intervals must be at least one second".to_string(),
            });
        }

        Ok(Self {
            database_url,
            max_connections,
            engine,
            scheduler,
        })
    }
}

fn parse<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => {
            let parsed = raw.trim().parse::<T>();
            parsed.map(Some).map_err(|e| ConfigError::Invalid {
                key,
                value: raw,
                reason: e.to_string(),
            })
        }
    }
}
