//! Domain Errors
//!
//! Error types for domain operations.

use thiserror::Error;
use uuid::Uuid;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid weights: {0}")]
    InvalidWeights(String),

    #[error("Missing profile for user {0}")]
    MissingProfile(Uuid),

    #[error("Connection request from {requester} to {target} is already pending")]
    AlreadyPending { requester: Uuid, target: Uuid },

    #[error("Users {a} and {b} are already connected")]
    AlreadyConnected { a: Uuid, b: Uuid },

    #[error("No pending connection request from {requester} to {target}")]
    NotPending { requester: Uuid, target: Uuid },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Repository error: {0}")]
    Repository(String),
}

impl DomainError {
    pub fn invalid_input<T: Into<String>>(message: T) -> Self {
        Self::InvalidInput(message.into())
    }
}
