//! The persistence seam behind [`ReviewStore`](crate::ReviewStore).

use async_trait::async_trait;
use reviewglobe_core::review::ValidatedReview;
use reviewglobe_core::types::DbId;
use reviewglobe_db::models::review::Review;

use crate::error::StoreError;

/// The signed-in user on whose behalf a mutation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub user_id: DbId,
}

impl Identity {
    pub fn new(user_id: DbId) -> Self {
        Self { user_id }
    }
}

/// A record store for reviews with last-write-wins semantics.
///
/// Ownership is the backend's concern: `update` and `delete` must refuse
/// with [`StoreError::Forbidden`] when `owner_id` did not create the review
/// and with [`StoreError::NotFound`] when it does not exist.
#[async_trait]
pub trait ReviewBackend: Send + Sync {
    /// Insert a review owned by `owner_id` and return the stored record.
    async fn insert(&self, owner_id: DbId, review: &ValidatedReview)
        -> Result<Review, StoreError>;

    /// All reviews, newest `created_at` first.
    async fn select_all(&self) -> Result<Vec<Review>, StoreError>;

    /// Replace the editable fields of a review and return the stored record.
    async fn update(
        &self,
        id: DbId,
        owner_id: DbId,
        review: &ValidatedReview,
    ) -> Result<Review, StoreError>;

    async fn delete(&self, id: DbId, owner_id: DbId) -> Result<(), StoreError>;

    /// Short name used in log output.
    fn name(&self) -> &'static str;
}
