//! PostgreSQL implementation of ConnectionRepository
//!
//! `pending_connections` holds one row per directed request and
//! `connections` one row per connected pair (`user_uuid_a < user_uuid_b`).

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use kizuna::{
    Connection, ConnectionRepository, ConnectionRequest, DomainError, PairState, PairTransition,
    UserPair,
};

use super::locks::{self, LockScope};

/// PostgreSQL implementation of ConnectionRepository
pub struct PgConnectionRepository {
    pool: PgPool,
}

impl PgConnectionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Internal row type for sqlx mapping
#[derive(sqlx::FromRow)]
struct PendingRow {
    requester_uuid: Uuid,
    target_uuid: Uuid,
    created_at: DateTime<Utc>,
}

impl From<PendingRow> for ConnectionRequest {
    fn from(row: PendingRow) -> Self {
        Self {
            requester_id: row.requester_uuid,
            target_id: row.target_uuid,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ConnectionRow {
    user_uuid_a: Uuid,
    user_uuid_b: Uuid,
    created_at: DateTime<Utc>,
}

impl From<ConnectionRow> for Connection {
    fn from(row: ConnectionRow) -> Self {
        Self {
            user_a: row.user_uuid_a,
            user_b: row.user_uuid_b,
            created_at: row.created_at,
        }
    }
}

/// Read the rows of a pair and rebuild its state.
///
/// With `for_update` the pending rows stay locked until the surrounding
/// transaction ends, so the expiry sweep cannot delete them mid-transition.
async fn load_pair_state(
    conn: &mut PgConnection,
    pair: UserPair,
    for_update: bool,
) -> Result<PairState, DomainError> {
    let pending_sql = if for_update {
        r#"
        SELECT requester_uuid, target_uuid FROM pending_connections
        WHERE (requester_uuid = $1 AND target_uuid = $2)
           OR (requester_uuid = $2 AND target_uuid = $1)
        FOR UPDATE
        "#
    } else {
        r#"
        SELECT requester_uuid, target_uuid FROM pending_connections
        WHERE (requester_uuid = $1 AND target_uuid = $2)
           OR (requester_uuid = $2 AND target_uuid = $1)
        "#
    };

    let pending = sqlx::query_as::<_, (Uuid, Uuid)>(pending_sql)
        .bind(pair.low())
        .bind(pair.high())
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

    let connected = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM connections WHERE user_uuid_a = $1 AND user_uuid_b = $2)",
    )
    .bind(pair.low())
    .bind(pair.high())
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| DomainError::Repository(e.to_string()))?;

    Ok(PairState::from_rows(pair, &pending, connected))
}

#[async_trait]
impl ConnectionRepository for PgConnectionRepository {
    async fn pair_state(&self, pair: UserPair) -> Result<PairState, DomainError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| DomainError::Repository(e.to_string()))?;

        load_pair_state(&mut *conn, pair, false).await
    }

    async fn commit_transition(&self, transition: &PairTransition) -> Result<bool, DomainError> {
        let pair = transition.pair;
        if transition.to == PairState::MutualPending {
            return Err(DomainError::invalid_input(
                "mutual pending is resolved immediately and never committed",
            ));
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::Repository(e.to_string()))?;

        locks::acquire(&mut tx, LockScope::Pair(pair)).await?;
        if transition.clears_recommendations() {
            locks::acquire(&mut tx, LockScope::Viewer(pair.low())).await?;
            locks::acquire(&mut tx, LockScope::Viewer(pair.high())).await?;
        }

        let current = load_pair_state(&mut *tx, pair, true).await?;
        if current != transition.from {
            // Rolled back on drop
            return Ok(false);
        }

        // Remove every pending row of the pair except the one the new state keeps
        let (keep_requester, keep_target) = transition
            .retained_request()
            .map_or((None, None), |(r, t)| (Some(r), Some(t)));
        sqlx::query(
            r#"
            DELETE FROM pending_connections
            WHERE ((requester_uuid = $1 AND target_uuid = $2)
                OR (requester_uuid = $2 AND target_uuid = $1))
              AND NOT (requester_uuid IS NOT DISTINCT FROM $3
                   AND target_uuid IS NOT DISTINCT FROM $4)
            "#,
        )
        .bind(pair.low())
        .bind(pair.high())
        .bind(keep_requester)
        .bind(keep_target)
        .execute(&mut *tx)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        if let Some((requester, target)) = transition.retained_request() {
            sqlx::query(
                r#"
                INSERT INTO pending_connections (requester_uuid, target_uuid)
                VALUES ($1, $2)
                ON CONFLICT (requester_uuid, target_uuid) DO NOTHING
                "#,
            )
            .bind(requester)
            .bind(target)
            .execute(&mut *tx)
            .await
            .map_err(|e| DomainError::Repository(e.to_string()))?;
        }

        if transition.to == PairState::Connected {
            sqlx::query(
                r#"
                INSERT INTO connections (user_uuid_a, user_uuid_b)
                VALUES ($1, $2)
                ON CONFLICT (user_uuid_a, user_uuid_b) DO NOTHING
                "#,
            )
            .bind(pair.low())
            .bind(pair.high())
            .execute(&mut *tx)
            .await
            .map_err(|e| DomainError::Repository(e.to_string()))?;
        }

        if transition.clears_recommendations() {
            sqlx::query(
                r#"
                DELETE FROM recommendations
                WHERE (viewer_uuid = $1 AND candidate_uuid = $2)
                   OR (viewer_uuid = $2 AND candidate_uuid = $1)
                "#,
            )
            .bind(pair.low())
            .bind(pair.high())
            .execute(&mut *tx)
            .await
            .map_err(|e| DomainError::Repository(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(true)
    }

    async fn find_excluded_users(&self, user_id: Uuid) -> Result<HashSet<Uuid>, DomainError> {
        let users = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT target_uuid FROM pending_connections WHERE requester_uuid = $1
            UNION
            SELECT requester_uuid FROM pending_connections WHERE target_uuid = $1
            UNION
            SELECT user_uuid_b FROM connections WHERE user_uuid_a = $1
            UNION
            SELECT user_uuid_a FROM connections WHERE user_uuid_b = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(users.into_iter().collect())
    }

    async fn expire_pending(&self, cutoff: DateTime<Utc>) -> Result<u64, DomainError> {
        let result = sqlx::query("DELETE FROM pending_connections WHERE created_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(result.rows_affected())
    }

    async fn find_connections(&self, user_id: Uuid) -> Result<Vec<Connection>, DomainError> {
        let rows = sqlx::query_as::<_, ConnectionRow>(
            r#"
            SELECT user_uuid_a, user_uuid_b, created_at
            FROM connections
            WHERE user_uuid_a = $1 OR user_uuid_b = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_incoming(&self, user_id: Uuid) -> Result<Vec<ConnectionRequest>, DomainError> {
        let rows = sqlx::query_as::<_, PendingRow>(
            r#"
            SELECT requester_uuid, target_uuid, created_at
            FROM pending_connections
            WHERE target_uuid = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_outgoing(&self, user_id: Uuid) -> Result<Vec<ConnectionRequest>, DomainError> {
        let rows = sqlx::query_as::<_, PendingRow>(
            r#"
            SELECT requester_uuid, target_uuid, created_at
            FROM pending_connections
            WHERE requester_uuid = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
