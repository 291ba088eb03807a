//! Connection Repository Port
//!
//! Persistence for pending requests and durable connections. The stored
//! rows encode each pair's [`PairState`]; transitions are applied with
//! compare-and-set semantics.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    errors::DomainError, Connection, ConnectionRequest, PairState, PairTransition, UserPair,
};

/// Repository interface for the connection lifecycle
#[async_trait]
pub trait ConnectionRepository: Send + Sync {
    /// Reconstruct the current state of a pair from stored rows
    async fn pair_state(&self, pair: UserPair) -> Result<PairState, DomainError>;

    /// Apply a transition if the pair is still in `transition.from`.
    ///
    /// Returns `Ok(false)` without changing anything when the state moved
    /// on concurrently. On success the rows match `transition.to` and, when
    /// the transition requires it, recommendations between the pair are
    /// deleted in the same atomic unit.
    async fn commit_transition(&self, transition: &PairTransition) -> Result<bool, DomainError>;

    /// Users connected with, or holding a pending request in either
    /// direction with, `user_id`
    async fn find_excluded_users(&self, user_id: Uuid) -> Result<HashSet<Uuid>, DomainError>;

    /// Delete pending requests created before `cutoff`, returning how many
    async fn expire_pending(&self, cutoff: DateTime<Utc>) -> Result<u64, DomainError>;

    /// Connections that include `user_id`, newest first
    async fn find_connections(&self, user_id: Uuid) -> Result<Vec<Connection>, DomainError>;

    /// Pending requests addressed to `user_id`, newest first
    async fn find_incoming(&self, user_id: Uuid) -> Result<Vec<ConnectionRequest>, DomainError>;

    /// Pending requests sent by `user_id`, newest first
    async fn find_outgoing(&self, user_id: Uuid) -> Result<Vec<ConnectionRequest>, DomainError>;
}
