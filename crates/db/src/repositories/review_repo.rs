//! Repository for the `reviews` table.
//!
//! Updates and deletes are scoped to the owner in SQL, so a caller that does
//! not own a review simply matches no row.

use reviewglobe_core::review::ValidatedReview;
use reviewglobe_core::types::DbId;
use sqlx::PgPool;

use crate::models::review::Review;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, text, rating, tags, image_url, location, display_name, \
                       owner_id, created_at, updated_at";

/// Provides CRUD operations for reviews.
pub struct ReviewRepo;

impl ReviewRepo {
    /// Insert a new review, returning the created row.
    pub async fn create(
        pool: &PgPool,
        owner_id: Option<DbId>,
        input: &ValidatedReview,
    ) -> Result<Review, sqlx::Error> {
        let query = format!(
            "INSERT INTO reviews (text, rating, tags, image_url, location, display_name, owner_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Review>(&query)
            .bind(input.text())
            .bind(input.rating())
            .bind(input.tags())
            .bind(input.image_url())
            .bind(input.location())
            .bind(input.display_name())
            .bind(owner_id)
            .fetch_one(pool)
            .await
    }

    /// Find a review by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Review>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM reviews WHERE id = $1");
        sqlx::query_as::<_, Review>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all reviews, newest first. Ties on `created_at` fall back to `id`.
    pub async fn list(pool: &PgPool) -> Result<Vec<Review>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM reviews ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, Review>(&query).fetch_all(pool).await
    }

    /// Replace the editable fields of a review owned by `owner_id`.
    ///
    /// `updated_at` is refreshed by trigger. Returns `None` if no review with
    /// that ID belongs to the owner.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        owner_id: DbId,
        input: &ValidatedReview,
    ) -> Result<Option<Review>, sqlx::Error> {
        let query = format!(
            "UPDATE reviews SET
                text = $3,
                rating = $4,
                tags = $5,
                image_url = $6,
                location = $7,
                display_name = $8
             WHERE id = $1 AND owner_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Review>(&query)
            .bind(id)
            .bind(owner_id)
            .bind(input.text())
            .bind(input.rating())
            .bind(input.tags())
            .bind(input.image_url())
            .bind(input.location())
            .bind(input.display_name())
            .fetch_optional(pool)
            .await
    }

    /// Delete a review owned by `owner_id`. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId, owner_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
