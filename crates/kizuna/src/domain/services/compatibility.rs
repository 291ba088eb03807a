//! CompatibilityScorer - Weighted multi-criteria score of a candidate for a viewer
//!
//! The score is directed: the viewer's weights decide how much each
//! criterion counts, so score(A→B) and score(B→A) generally differ.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{age_delta, geo_distance, set_overlap};
use crate::domain::{errors::DomainError, Profile, WeightVector};

/// Tunable decay parameters shared by every viewer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ScoringParams {
    /// Distance at which proximity drops to 0.5
    pub distance_scale_meters: f64,
    /// Age difference at which age proximity drops to 0.5
    pub age_half_life_years: f64,
}

impl Default for ScoringParams {
    fn default() -> Self {
        Self {
            distance_scale_meters: 10_000.0,
            age_half_life_years: 5.0,
        }
    }
}

impl ScoringParams {
    pub fn validate(&self) -> Result<(), DomainError> {
        if !self.distance_scale_meters.is_finite() || self.distance_scale_meters <= 0.0 {
            return Err(DomainError::invalid_input(format!(
                "distance scale must be positive, got {}",
                self.distance_scale_meters
            )));
        }
        if !self.age_half_life_years.is_finite() || self.age_half_life_years <= 0.0 {
            return Err(DomainError::invalid_input(format!(
                "age half-life must be positive, got {}",
                self.age_half_life_years
            )));
        }
        Ok(())
    }
}

/// Unweighted sub-scores, each in [0, 1]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ScoreComponents {
    pub distance: f64,
    pub age: f64,
    pub food: f64,
    pub hobby: f64,
    pub music: f64,
}

/// Directed compatibility of a candidate for a viewer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CompatibilityScore {
    pub score: f64,
    pub distance_meters: f64,
    pub components: ScoreComponents,
}

/// Scores candidates against a viewer as of a reference date
#[derive(Debug, Clone, Copy)]
pub struct CompatibilityScorer {
    params: ScoringParams,
    today: NaiveDate,
}

impl CompatibilityScorer {
    pub fn new(params: ScoringParams, today: NaiveDate) -> Result<Self, DomainError> {
        params.validate()?;
        Ok(Self { params, today })
    }

    /// Reference date for age computation
    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Compute the unweighted sub-scores for a pair of profiles
    pub fn components(
        &self,
        viewer: &Profile,
        candidate: &Profile,
    ) -> Result<(ScoreComponents, f64), DomainError> {
        let distance_meters = geo_distance::haversine_meters(viewer.location, candidate.location);
        let components = ScoreComponents {
            distance: geo_distance::proximity_score(
                distance_meters,
                self.params.distance_scale_meters,
            ),
            age: age_delta::age_proximity(
                viewer.birthdate,
                candidate.birthdate,
                self.today,
                self.params.age_half_life_years,
            )?,
            food: set_overlap::jaccard(&viewer.food, &candidate.food),
            hobby: set_overlap::jaccard(&viewer.hobbies, &candidate.hobbies),
            music: set_overlap::jaccard(&viewer.music, &candidate.music),
        };
        Ok((components, distance_meters))
    }

    /// Score `candidate` from the perspective of `viewer` using the viewer's weights
    pub fn score(
        &self,
        viewer: &Profile,
        weights: &WeightVector,
        candidate: &Profile,
    ) -> Result<CompatibilityScore, DomainError> {
        let shares = weights.normalized()?;
        let (components, distance_meters) = self.components(viewer, candidate)?;

        let score = shares.distance * components.distance
            + shares.age * components.age
            + shares.food * components.food
            + shares.hobby * components.hobby
            + shares.music * components.music;

        Ok(CompatibilityScore {
            score: score.clamp(0.0, 1.0),
            distance_meters,
            components,
        })
    }
}
