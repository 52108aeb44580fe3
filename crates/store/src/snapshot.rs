//! Immutable views of the cached review set.

use reviewglobe_core::search::{apply_filter, available_tags, FilterState};
use reviewglobe_core::types::{DbId, Timestamp};
use reviewglobe_db::models::review::Review;
use serde::Serialize;

/// One complete, immutable copy of the review set as last read from the
/// backend.
#[derive(Debug, Clone, Default)]
pub struct ReviewSnapshot {
    /// Incremented on every successful reload; `0` means never loaded.
    pub version: u64,
    /// Newest first.
    pub reviews: Vec<Review>,
    pub loaded_at: Option<Timestamp>,
    /// Message of the most recent failed reload, cleared by the next success.
    pub last_refresh_error: Option<String>,
}

impl ReviewSnapshot {
    pub fn is_loaded(&self) -> bool {
        self.version > 0
    }

    pub fn get(&self, id: DbId) -> Option<&Review> {
        self.reviews.iter().find(|r| r.id == id)
    }

    pub fn contains(&self, id: DbId) -> bool {
        self.get(id).is_some()
    }

    pub fn available_tags(&self) -> Vec<String> {
        available_tags(&self.reviews)
    }

    pub fn view(&self, filter: &FilterState) -> ReviewView {
        ReviewView::new(self, filter)
    }
}

/// The visible subset of a snapshot under a [`FilterState`].
#[derive(Debug, Clone, Serialize)]
pub struct ReviewView {
    /// Version of the snapshot this view was derived from.
    pub version: u64,
    /// Number of reviews before filtering.
    pub total: usize,
    pub visible_count: usize,
    /// E.g. `Showing 2 reviews for "tacos"`; absent when no filter is active.
    pub summary: Option<String>,
    /// Set when the latest reload failed and this view shows older data.
    pub last_refresh_error: Option<String>,
    pub reviews: Vec<Review>,
}

impl ReviewView {
    pub fn new(snapshot: &ReviewSnapshot, filter: &FilterState) -> Self {
        let filtered = apply_filter(&snapshot.reviews, filter);
        Self {
            version: snapshot.version,
            total: filtered.total,
            visible_count: filtered.visible_count(),
            summary: filtered.summary,
            last_refresh_error: snapshot.last_refresh_error.clone(),
            reviews: filtered.reviews.into_iter().cloned().collect(),
        }
    }

    pub fn ids(&self) -> Vec<DbId> {
        self.reviews.iter().map(|r| r.id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_carries_refresh_error() {
        let snapshot = ReviewSnapshot {
            version: 3,
            last_refresh_error: Some("database unavailable".into()),
            ..Default::default()
        };

        let view = snapshot.view(&FilterState::new());

        assert_eq!(view.version, 3);
        assert_eq!(view.last_refresh_error.as_deref(), Some("database unavailable"));
        assert!(ReviewSnapshot::default().view(&FilterState::new()).last_refresh_error.is_none());
    }
}
