//! Ranking - Eligibility filtering and deterministic ordering of candidates

use std::cmp::Ordering;
use std::collections::HashSet;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::age_delta;
use super::compatibility::{CompatibilityScore, CompatibilityScorer};
use crate::domain::{errors::DomainError, Profile, Recommendation, WeightVector};

/// A candidate together with its score from the viewer's perspective
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredCandidate {
    pub candidate_id: Uuid,
    pub score: CompatibilityScore,
}

/// Higher score first, then the closer candidate, then the smaller id
pub fn compare_candidates(a: &ScoredCandidate, b: &ScoredCandidate) -> Ordering {
    b.score
        .score
        .total_cmp(&a.score.score)
        .then_with(|| a.score.distance_meters.total_cmp(&b.score.distance_meters))
        .then_with(|| a.candidate_id.cmp(&b.candidate_id))
}

/// Score every eligible candidate in `pool` for `viewer`.
///
/// The viewer itself, anyone in `excluded`, repeated pool entries and
/// candidates born after the scorer's reference date are skipped. A viewer
/// born after that date is an error.
pub fn score_pool(
    scorer: &CompatibilityScorer,
    viewer: &Profile,
    weights: &WeightVector,
    pool: &[Profile],
    excluded: &HashSet<Uuid>,
) -> Result<Vec<ScoredCandidate>, DomainError> {
    age_delta::age_in_years(viewer.birthdate, scorer.today())?;

    let mut seen = HashSet::with_capacity(pool.len());
    let mut scored = Vec::with_capacity(pool.len());

    for candidate in pool {
        if candidate.user_id == viewer.user_id
            || excluded.contains(&candidate.user_id)
            || candidate.birthdate > scorer.today()
            || !seen.insert(candidate.user_id)
        {
            continue;
        }
        scored.push(ScoredCandidate {
            candidate_id: candidate.user_id,
            score: scorer.score(viewer, weights, candidate)?,
        });
    }

    Ok(scored)
}

/// Sort, truncate to `limit` and number the survivors from rank 1
pub fn rank(
    viewer_id: Uuid,
    mut scored: Vec<ScoredCandidate>,
    limit: usize,
    generated_at: DateTime<Utc>,
) -> Vec<Recommendation> {
    scored.sort_by(compare_candidates);
    scored.truncate(limit);

    scored
        .into_iter()
        .enumerate()
        .map(|(index, candidate)| Recommendation {
            viewer_id,
            candidate_id: candidate.candidate_id,
            score: candidate.score.score,
            distance_meters: candidate.score.distance_meters,
            rank: index as i32 + 1,
            generated_at,
        })
        .collect()
}
