//! Profile Repository Port
//!
//! Read-only access to profiles and weights maintained by the
//! profile-management collaborator.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{errors::DomainError, Profile, WeightVector};

/// Repository interface for profiles and weight vectors
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Find a complete profile (location and birthdate present)
    async fn find_profile(&self, user_id: Uuid) -> Result<Option<Profile>, DomainError>;

    /// Find the user's configured weights
    async fn find_weights(&self, user_id: Uuid) -> Result<Option<WeightVector>, DomainError>;

    /// All complete profiles other than `viewer_id`
    async fn find_candidates(&self, viewer_id: Uuid) -> Result<Vec<Profile>, DomainError>;

    /// Ids of every user with a complete profile
    async fn list_profile_ids(&self) -> Result<Vec<Uuid>, DomainError>;
}
