//! PostgreSQL implementation of RecommendationRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use kizuna::{DomainError, Recommendation, RecommendationRepository};

use super::locks::{self, LockScope};

/// PostgreSQL implementation of RecommendationRepository
pub struct PgRecommendationRepository {
    pool: PgPool,
}

impl PgRecommendationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Internal row type for sqlx mapping
#[derive(sqlx::FromRow)]
struct RecommendationRow {
    viewer_uuid: Uuid,
    candidate_uuid: Uuid,
    score: f64,
    distance: f64,
    rank: i32,
    generated_at: DateTime<Utc>,
}

impl From<RecommendationRow> for Recommendation {
    fn from(row: RecommendationRow) -> Self {
        Self {
            viewer_id: row.viewer_uuid,
            candidate_id: row.candidate_uuid,
            score: row.score,
            distance_meters: row.distance,
            rank: row.rank,
            generated_at: row.generated_at,
        }
    }
}

#[async_trait]
impl RecommendationRepository for PgRecommendationRepository {
    async fn replace_for_viewer(
        &self,
        viewer_id: Uuid,
        entries: &[Recommendation],
    ) -> Result<Vec<Recommendation>, DomainError> {
        let candidates: Vec<Uuid> = entries.iter().map(|e| e.candidate_id).collect();
        let scores: Vec<f64> = entries.iter().map(|e| e.score).collect();
        let distances: Vec<f64> = entries.iter().map(|e| e.distance_meters).collect();
        let ranks: Vec<i32> = entries.iter().map(|e| e.rank).collect();
        let generated: Vec<DateTime<Utc>> = entries.iter().map(|e| e.generated_at).collect();

        // Dropping the transaction before commit rolls everything back
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::Repository(e.to_string()))?;

        locks::acquire(&mut tx, LockScope::Viewer(viewer_id)).await?;

        sqlx::query("DELETE FROM recommendations WHERE viewer_uuid = $1")
            .bind(viewer_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| DomainError::Repository(e.to_string()))?;

        // Pairs that gained a request or connection after scoring are skipped
        let rows = sqlx::query_as::<_, RecommendationRow>(
            r#"
            INSERT INTO recommendations
                (viewer_uuid, candidate_uuid, score, distance, rank, generated_at)
            SELECT $1, e.candidate_uuid, e.score, e.distance, e.rank, e.generated_at
            FROM UNNEST($2::uuid[], $3::float8[], $4::float8[], $5::int4[], $6::timestamptz[])
                AS e(candidate_uuid, score, distance, rank, generated_at)
            WHERE NOT EXISTS (
                SELECT 1 FROM pending_connections p
                WHERE (p.requester_uuid = $1 AND p.target_uuid = e.candidate_uuid)
                   OR (p.requester_uuid = e.candidate_uuid AND p.target_uuid = $1)
            )
            AND NOT EXISTS (
                SELECT 1 FROM connections c
                WHERE c.user_uuid_a = LEAST($1, e.candidate_uuid)
                  AND c.user_uuid_b = GREATEST($1, e.candidate_uuid)
            )
            RETURNING viewer_uuid, candidate_uuid, score, distance, rank, generated_at
            "#,
        )
        .bind(viewer_id)
        .bind(candidates)
        .bind(scores)
        .bind(distances)
        .bind(ranks)
        .bind(generated)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| DomainError::Repository(e.to_string()))?;

        let mut stored: Vec<Recommendation> = rows.into_iter().map(Into::into).collect();
        stored.sort_by_key(|r| r.rank);
        Ok(stored)
    }

    async fn find_by_viewer(&self, viewer_id: Uuid) -> Result<Vec<Recommendation>, DomainError> {
        let rows = sqlx::query_as::<_, RecommendationRow>(
            r#"
            SELECT viewer_uuid, candidate_uuid, score, distance, rank, generated_at
            FROM recommendations
            WHERE viewer_uuid = $1
            ORDER BY rank
            "#,
        )
        .bind(viewer_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
