//! Connection Application Service (Use Case)
//!
//! Drives the request → accept/reject → connection lifecycle. Every
//! transition is decided from a freshly loaded pair state and committed
//! with compare-and-set, so concurrent actions on one pair resolve to a
//! single outcome while different pairs proceed in parallel.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use kizuna::{
    Connection, ConnectionOutcome, ConnectionRepository, ConnectionRequest, DomainError,
    PairState, PairTransition, UserPair,
};

use crate::config::EngineConfig;

/// Application service for connection requests and connections
pub struct ConnectionService<C: ConnectionRepository> {
    repo: Arc<C>,
    config: EngineConfig,
}

impl<C: ConnectionRepository> ConnectionService<C> {
    pub fn new(repo: Arc<C>, config: EngineConfig) -> Self {
        Self { repo, config }
    }

    /// `requester` asks `target` to connect.
    ///
    /// If `target` already asked `requester`, the pair connects immediately.
    pub async fn request(
        &self,
        requester: Uuid,
        target: Uuid,
    ) -> Result<ConnectionOutcome, DomainError> {
        let pair = UserPair::new(requester, target)?;
        self.transition(pair, |state| state.request(pair, requester))
            .await
    }

    /// `target` accepts the pending request from `requester`
    pub async fn accept(
        &self,
        target: Uuid,
        requester: Uuid,
    ) -> Result<ConnectionOutcome, DomainError> {
        let pair = UserPair::new(requester, target)?;
        self.transition(pair, |state| state.accept(pair, target))
            .await
    }

    /// `target` declines the pending request from `requester`
    pub async fn reject(
        &self,
        target: Uuid,
        requester: Uuid,
    ) -> Result<ConnectionOutcome, DomainError> {
        let pair = UserPair::new(requester, target)?;
        self.transition(pair, |state| state.reject(pair, target))
            .await
    }

    /// Accept or reject depending on `accept`
    pub async fn respond(
        &self,
        target: Uuid,
        requester: Uuid,
        accept: bool,
    ) -> Result<ConnectionOutcome, DomainError> {
        if accept {
            self.accept(target, requester).await
        } else {
            self.reject(target, requester).await
        }
    }

    /// Current lifecycle state of the pair
    pub async fn pair_status(&self, a: Uuid, b: Uuid) -> Result<PairState, DomainError> {
        self.repo.pair_state(UserPair::new(a, b)?).await
    }

    pub async fn is_connected_or_pending(&self, a: Uuid, b: Uuid) -> Result<bool, DomainError> {
        Ok(self.pair_status(a, b).await?.is_connected_or_pending())
    }

    /// Sweep pending requests older than the configured retention
    pub async fn expire_pending(&self) -> Result<u64, DomainError> {
        let cutoff = Utc::now()
            .checked_sub_signed(self.config.pending_ttl)
            .ok_or_else(|| {
                DomainError::invalid_input(format!(
                    "pending retention {} reaches past the representable date range",
                    self.config.pending_ttl
                ))
            })?;
        let expired = self.repo.expire_pending(cutoff).await?;
        if expired > 0 {
            tracing::info!("Expired {} pending connection request(s) older than {}", expired, cutoff);
        }
        Ok(expired)
    }

    pub async fn list_connections(&self, user_id: Uuid) -> Result<Vec<Connection>, DomainError> {
        self.repo.find_connections(user_id).await
    }

    pub async fn list_incoming(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<ConnectionRequest>, DomainError> {
        self.repo.find_incoming(user_id).await
    }

    pub async fn list_outgoing(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<ConnectionRequest>, DomainError> {
        self.repo.find_outgoing(user_id).await
    }

    async fn transition<F>(&self, pair: UserPair, decide: F) -> Result<ConnectionOutcome, DomainError>
    where
        F: Fn(PairState) -> Result<PairTransition, DomainError> + Send,
    {
        for attempt in 1..=self.config.max_transition_attempts {
            let state = self.repo.pair_state(pair).await?;
            let transition = decide(state)?;

            if self.repo.commit_transition(&transition).await? {
                tracing::info!(
                    "Pair {}: {:?} -> {:?} ({:?})",
                    pair,
                    transition.from,
                    transition.to,
                    transition.outcome
                );
                return Ok(transition.outcome);
            }

            tracing::debug!(
                "Pair {} changed concurrently (attempt {}), re-reading state",
                pair,
                attempt
            );
        }

        Err(DomainError::Conflict(format!(
            "pair {} kept changing after {} attempts",
            pair, self.config.max_transition_attempts
        )))
    }
}
