//! Recommendation Repository Port

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{errors::DomainError, Recommendation};

/// Repository interface for persisted recommendation sets
#[async_trait]
pub trait RecommendationRepository: Send + Sync {
    /// Atomically replace the viewer's whole recommendation set.
    ///
    /// Implementations must be exclusive per viewer and all-or-nothing: on
    /// error the previous set stays intact. Entries whose pair has gained a
    /// pending request or connection since they were scored are dropped.
    /// Returns the entries actually stored, in rank order.
    async fn replace_for_viewer(
        &self,
        viewer_id: Uuid,
        entries: &[Recommendation],
    ) -> Result<Vec<Recommendation>, DomainError>;

    /// Current set for a viewer, in rank order
    async fn find_by_viewer(&self, viewer_id: Uuid) -> Result<Vec<Recommendation>, DomainError>;
}
