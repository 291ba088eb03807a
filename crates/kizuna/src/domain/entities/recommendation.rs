//! Recommendation - Ranked candidate persisted for a viewer

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One recommended candidate for a viewer.
///
/// At most one row exists per (viewer, candidate); each generation run
/// replaces the viewer's whole set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub viewer_id: Uuid,
    pub candidate_id: Uuid,
    /// Compatibility from the viewer's perspective, in [0, 1]
    pub score: f64,
    pub distance_meters: f64,
    /// 1-based position in the ranking
    pub rank: i32,
    pub generated_at: DateTime<Utc>,
}

/// Result of a generation run for one viewer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GenerationOutcome {
    Generated { recommendations: Vec<Recommendation> },
    /// Nobody was eligible; the viewer's set is now empty
    NoEligibleCandidates,
}

impl GenerationOutcome {
    pub fn from_recommendations(recommendations: Vec<Recommendation>) -> Self {
        if recommendations.is_empty() {
            Self::NoEligibleCandidates
        } else {
            Self::Generated { recommendations }
        }
    }

    pub fn recommendations(&self) -> &[Recommendation] {
        match self {
            Self::Generated { recommendations } => recommendations,
            Self::NoEligibleCandidates => &[],
        }
    }

    pub fn len(&self) -> usize {
        self.recommendations().len()
    }

    pub fn is_empty(&self) -> bool {
        self.recommendations().is_empty()
    }
}
