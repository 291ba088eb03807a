//! Connection Lifecycle - Requests, durable connections and the pair state machine
//!
//! Storage encodes a pair's state as row existence (pending rows per
//! direction plus an optional connection row). The state is reconstructed
//! into [`PairState`] before any transition is decided, and transitions are
//! computed purely here so that persistence only has to apply them.
//!
//! ```text
//!            request(A)              request(B)
//!   None ───────────────► Pending{A} ───────────► Connected
//!    ▲                        │   accept(B)            ▲
//!    │      reject(B)/expire  │────────────────────────┘
//!    └────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{errors::DomainError, UserPair};

/// One-directional, unconfirmed connection request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConnectionRequest {
    pub requester_id: Uuid,
    pub target_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Durable mutual connection, stored with `user_a < user_b`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Connection {
    pub user_a: Uuid,
    pub user_b: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Connection {
    /// The connected user on the other side of `user`
    pub fn other(&self, user: Uuid) -> Option<Uuid> {
        if user == self.user_a {
            Some(self.user_b)
        } else if user == self.user_b {
            Some(self.user_a)
        } else {
            None
        }
    }
}

/// Lifecycle state of an unordered pair
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PairState {
    /// No request, no connection
    None,
    /// `requester` asked the other member of the pair
    Pending { requester: Uuid },
    /// Both sides asked each other; resolved to `Connected` by the next transition
    MutualPending,
    /// Durable connection exists
    Connected,
}

/// What a committed transition achieved
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionOutcome {
    /// A pending request now exists
    Requested,
    /// The pair is connected (accepted or mutual request)
    Connected,
    /// The pending request was declined
    Rejected,
}

/// A decided, not yet committed, state change for a pair.
///
/// Persistence must apply `to` only if the pair is still in `from`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairTransition {
    pub pair: UserPair,
    pub from: PairState,
    pub to: PairState,
    pub outcome: ConnectionOutcome,
}

impl PairTransition {
    /// Recommendations between the pair must be removed once a request or
    /// connection forms.
    pub fn clears_recommendations(&self) -> bool {
        matches!(
            self.to,
            PairState::Pending { .. } | PairState::Connected
        )
    }

    /// Pending row that must remain after commit, as (requester, target)
    pub fn retained_request(&self) -> Option<(Uuid, Uuid)> {
        match self.to {
            PairState::Pending { requester } => {
                self.pair.other(requester).map(|target| (requester, target))
            }
            _ => None,
        }
    }
}

impl PairState {
    /// Reconstruct the state from stored rows.
    ///
    /// `pending` holds (requester, target) rows between the pair members.
    /// A connection row wins over any leftover pending rows.
    pub fn from_rows(pair: UserPair, pending: &[(Uuid, Uuid)], connected: bool) -> Self {
        if connected {
            return Self::Connected;
        }
        let low_asked = pending
            .iter()
            .any(|&(requester, target)| requester == pair.low() && target == pair.high());
        let high_asked = pending
            .iter()
            .any(|&(requester, target)| requester == pair.high() && target == pair.low());

        match (low_asked, high_asked) {
            (true, true) => Self::MutualPending,
            (true, false) => Self::Pending {
                requester: pair.low(),
            },
            (false, true) => Self::Pending {
                requester: pair.high(),
            },
            (false, false) => Self::None,
        }
    }

    pub fn is_connected_or_pending(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// `requester` asks the other member of `pair` to connect
    pub fn request(self, pair: UserPair, requester: Uuid) -> Result<PairTransition, DomainError> {
        let target = counterpart(pair, requester)?;
        let (to, outcome) = match self {
            Self::None => (Self::Pending { requester }, ConnectionOutcome::Requested),
            Self::Pending { requester: existing } if existing == requester => {
                return Err(DomainError::AlreadyPending { requester, target });
            }
            // The other side already asked: mutual interest connects at once
            Self::Pending { .. } | Self::MutualPending => {
                (Self::Connected, ConnectionOutcome::Connected)
            }
            Self::Connected => {
                return Err(DomainError::AlreadyConnected {
                    a: pair.low(),
                    b: pair.high(),
                });
            }
        };
        Ok(PairTransition {
            pair,
            from: self,
            to,
            outcome,
        })
    }

    /// `target` accepts the request made by the other member of `pair`
    pub fn accept(self, pair: UserPair, target: Uuid) -> Result<PairTransition, DomainError> {
        let requester = counterpart(pair, target)?;
        match self {
            Self::Pending { requester: existing } if existing == requester => {}
            Self::MutualPending => {}
            Self::Connected => {
                return Err(DomainError::AlreadyConnected {
                    a: pair.low(),
                    b: pair.high(),
                });
            }
            Self::None | Self::Pending { .. } => {
                return Err(DomainError::NotPending { requester, target });
            }
        }
        Ok(PairTransition {
            pair,
            from: self,
            to: Self::Connected,
            outcome: ConnectionOutcome::Connected,
        })
    }

    /// `target` declines the request made by the other member of `pair`
    pub fn reject(self, pair: UserPair, target: Uuid) -> Result<PairTransition, DomainError> {
        let requester = counterpart(pair, target)?;
        let to = match self {
            Self::Pending { requester: existing } if existing == requester => Self::None,
            // Only the declined direction goes away
            Self::MutualPending => Self::Pending { requester: target },
            Self::None | Self::Pending { .. } | Self::Connected => {
                return Err(DomainError::NotPending { requester, target });
            }
        };
        Ok(PairTransition {
            pair,
            from: self,
            to,
            outcome: ConnectionOutcome::Rejected,
        })
    }
}

fn counterpart(pair: UserPair, user: Uuid) -> Result<Uuid, DomainError> {
    pair.other(user).ok_or_else(|| {
        DomainError::invalid_input(format!("user {} is not a member of pair {}", user, pair))
    })
}
