//! Review row model.

use reviewglobe_core::search::Searchable;
use reviewglobe_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `reviews` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Review {
    pub id: DbId,
    pub text: String,
    pub rating: i32,
    /// Lowercase tags in the order they were entered.
    pub tags: Vec<String>,
    /// Data URI or URL of the attached photo.
    pub image_url: Option<String>,
    pub location: Option<String>,
    /// Public name shown with the review; `None` means anonymous.
    pub display_name: Option<String>,
    pub owner_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Review {
    /// Whether `user_id` created this review.
    pub fn is_owned_by(&self, user_id: DbId) -> bool {
        self.owner_id == Some(user_id)
    }
}

impl Searchable for Review {
    fn text(&self) -> &str {
        &self.text
    }

    fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }
}
