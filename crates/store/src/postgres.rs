//! [`ReviewBackend`] over PostgreSQL via [`ReviewRepo`].

use async_trait::async_trait;
use reviewglobe_core::review::ValidatedReview;
use reviewglobe_core::types::DbId;
use reviewglobe_db::models::review::Review;
use reviewglobe_db::repositories::ReviewRepo;
use reviewglobe_db::DbPool;

use crate::backend::ReviewBackend;
use crate::error::StoreError;

/// Stores reviews in the `reviews` table.
///
/// Owner-scoped statements act as the access policy; when they match no
/// row, a lookup by id tells "missing" apart from "not yours".
#[derive(Clone)]
pub struct PgReviewBackend {
    pool: DbPool,
}

impl PgReviewBackend {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn refusal(&self, id: DbId, action: &str) -> StoreError {
        match ReviewRepo::find_by_id(&self.pool, id).await {
            Ok(Some(_)) => StoreError::Forbidden(format!("Only the owner may {action} this review")),
            Ok(None) => StoreError::NotFound { id },
            Err(err) => persistence(err),
        }
    }
}

#[async_trait]
impl ReviewBackend for PgReviewBackend {
    async fn insert(
        &self,
        owner_id: DbId,
        review: &ValidatedReview,
    ) -> Result<Review, StoreError> {
        ReviewRepo::create(&self.pool, Some(owner_id), review)
            .await
            .map_err(persistence)
    }

    async fn select_all(&self) -> Result<Vec<Review>, StoreError> {
        ReviewRepo::list(&self.pool).await.map_err(persistence)
    }

    async fn update(
        &self,
        id: DbId,
        owner_id: DbId,
        review: &ValidatedReview,
    ) -> Result<Review, StoreError> {
        match ReviewRepo::update(&self.pool, id, owner_id, review)
            .await
            .map_err(persistence)?
        {
            Some(updated) => Ok(updated),
            None => Err(self.refusal(id, "edit").await),
        }
    }

    async fn delete(&self, id: DbId, owner_id: DbId) -> Result<(), StoreError> {
        let deleted = ReviewRepo::delete(&self.pool, id, owner_id)
            .await
            .map_err(persistence)?;
        if deleted {
            Ok(())
        } else {
            Err(self.refusal(id, "delete").await)
        }
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}

fn persistence(err: sqlx::Error) -> StoreError {
    tracing::error!(error = %err, "Review query failed");
    StoreError::Persistence(err.to_string())
}
