//! A filtered, self-updating view over a [`ReviewStore`].

use std::sync::Arc;

use reviewglobe_core::search::FilterState;
use tokio::sync::watch;

use crate::snapshot::{ReviewSnapshot, ReviewView};
use crate::store::ReviewStore;

/// Pairs a snapshot subscription with one reader's [`FilterState`].
///
/// The visible list is re-derived whenever either the snapshot or the
/// filter changes; the filter itself is never reset by a reload.
pub struct ReviewFeed {
    rx: watch::Receiver<Arc<ReviewSnapshot>>,
    filter: FilterState,
    seen_version: u64,
}

impl ReviewFeed {
    pub fn new(store: &ReviewStore, filter: FilterState) -> Self {
        let rx = store.subscribe();
        let seen_version = rx.borrow().version;
        Self {
            rx,
            filter,
            seen_version,
        }
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn toggle_tag(&mut self, tag: &str) -> bool {
        self.filter.toggle_tag(tag)
    }

    pub fn clear_tags(&mut self) {
        self.filter.clear_tags();
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.filter.set_query(query);
    }

    /// The visible list for the latest snapshot and current filter.
    pub fn current(&mut self) -> ReviewView {
        let snapshot = Arc::clone(&self.rx.borrow_and_update());
        self.seen_version = snapshot.version;
        snapshot.view(&self.filter)
    }

    /// Tags across the whole latest snapshot, not just the visible list.
    pub fn available_tags(&self) -> Vec<String> {
        self.rx.borrow().available_tags()
    }

    /// Wait for a snapshot with a newer version than the last one seen.
    ///
    /// Replacements that keep the version (a failed reload recording its
    /// error) are skipped. Returns `None` once the store is dropped.
    pub async fn next(&mut self) -> Option<ReviewView> {
        loop {
            self.rx.changed().await.ok()?;
            let version = self.rx.borrow_and_update().version;
            if version > self.seen_version {
                return Some(self.current());
            }
        }
    }
}
