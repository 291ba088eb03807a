//! Domain Services
//!
//! Pure computations over domain values: distance, preference overlap,
//! age proximity, weighted compatibility and candidate ranking.

pub mod age_delta;
pub mod compatibility;
pub mod geo_distance;
pub mod ranking;
pub mod set_overlap;

pub use compatibility::{CompatibilityScore, CompatibilityScorer, ScoreComponents, ScoringParams};
pub use ranking::ScoredCandidate;
