//! Transaction-scoped advisory locks
//!
//! Locks are released automatically when the transaction commits or rolls
//! back. Lifecycle commits take the pair lock first and then both viewer
//! locks in ascending id order; recommendation replacement takes a single
//! viewer lock. That fixed order keeps the two paths free of lock cycles.

use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use kizuna::{DomainError, UserPair};

const PAIR_NAMESPACE: i32 = 0x4b5a_0001;
const VIEWER_NAMESPACE: i32 = 0x4b5a_0002;

/// What a lock protects
#[derive(Debug, Clone, Copy)]
pub enum LockScope {
    /// Lifecycle rows of one unordered pair
    Pair(UserPair),
    /// Recommendation set of one viewer
    Viewer(Uuid),
}

impl LockScope {
    fn key(&self) -> (i32, String) {
        match self {
            LockScope::Pair(pair) => (PAIR_NAMESPACE, format!("{}:{}", pair.low(), pair.high())),
            LockScope::Viewer(viewer_id) => (VIEWER_NAMESPACE, viewer_id.to_string()),
        }
    }
}

/// Block until the lock for `scope` is held by `tx`
pub async fn acquire(
    tx: &mut Transaction<'_, Postgres>,
    scope: LockScope,
) -> Result<(), DomainError> {
    let (namespace, key) = scope.key();
    sqlx::query("SELECT pg_advisory_xact_lock($1, hashtext($2))")
        .bind(namespace)
        .bind(key)
        .execute(&mut **tx)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;
    Ok(())
}
