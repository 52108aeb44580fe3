//! The cached review set and its mutation contract.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use reviewglobe_core::review::ReviewDraft;
use reviewglobe_core::search::FilterState;
use reviewglobe_core::types::DbId;
use reviewglobe_db::models::review::Review;
use tokio::sync::watch;

use crate::backend::{Identity, ReviewBackend};
use crate::error::StoreError;
use crate::snapshot::{ReviewSnapshot, ReviewView};

// ---------------------------------------------------------------------------
// In-flight bookkeeping
// ---------------------------------------------------------------------------

/// Counts backend mutations of one kind that have not resolved yet.
#[derive(Default)]
struct InFlight(AtomicUsize);

impl InFlight {
    fn begin(&self) -> InFlightGuard<'_> {
        self.0.fetch_add(1, Ordering::SeqCst);
        InFlightGuard(&self.0)
    }

    fn is_active(&self) -> bool {
        self.0.load(Ordering::SeqCst) > 0
    }
}

struct InFlightGuard<'a>(&'a AtomicUsize);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Bumps the settled-write counter once a backend mutation has resolved or
/// been abandoned, so a reload that never ran is still owed.
struct SettleOnDrop<'a>(&'a AtomicU64);

impl Drop for SettleOnDrop<'_> {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EditKind {
    Update,
    Delete,
}

/// Review ids with a mutation in flight. At most one mutation per id.
#[derive(Default)]
struct EditRegistry(Mutex<HashMap<DbId, EditKind>>);

impl EditRegistry {
    fn begin(&self, id: DbId, kind: EditKind) -> Result<EditGuard<'_>, StoreError> {
        let mut edits = self
            .0
            .lock()
            .map_err(|_| StoreError::Persistence("edit registry lock poisoned".into()))?;

        if let Some(running) = edits.get(&id) {
            tracing::debug!(review_id = id, ?running, ?kind, "Rejecting overlapping mutation");
            return Err(StoreError::Busy { id });
        }
        edits.insert(id, kind);
        Ok(EditGuard { registry: self, id })
    }
}

struct EditGuard<'a> {
    registry: &'a EditRegistry,
    id: DbId,
}

impl Drop for EditGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut edits) = self.registry.0.lock() {
            edits.remove(&self.id);
        }
    }
}

// ---------------------------------------------------------------------------
// ReviewStore
// ---------------------------------------------------------------------------

/// Cached, versioned access to the review set.
///
/// Mutations are validated and authorized locally, forwarded to the
/// backend, and followed by a full reload. Reloads are serialized so that
/// snapshot versions are published in the order their reads started.
///
/// Every mutation that reached the backend counts as settled, even when the
/// caller was cancelled before its reload ran. A snapshot read before the
/// latest settled write is stale and [`ensure_loaded`](Self::ensure_loaded)
/// reloads it.
pub struct ReviewStore {
    backend: Arc<dyn ReviewBackend>,
    snapshot: watch::Sender<Arc<ReviewSnapshot>>,
    reload: tokio::sync::Mutex<()>,
    settled_writes: AtomicU64,
    synced_writes: AtomicU64,
    creating: InFlight,
    updating: InFlight,
    deleting: InFlight,
    edits: EditRegistry,
}

impl ReviewStore {
    pub fn new(backend: Arc<dyn ReviewBackend>) -> Self {
        let (snapshot, _) = watch::channel(Arc::new(ReviewSnapshot::default()));
        Self {
            backend,
            snapshot,
            reload: tokio::sync::Mutex::new(()),
            settled_writes: AtomicU64::new(0),
            synced_writes: AtomicU64::new(0),
            creating: InFlight::default(),
            updating: InFlight::default(),
            deleting: InFlight::default(),
            edits: EditRegistry::default(),
        }
    }

    // -- reads ---------------------------------------------------------------

    /// Reload every review from the backend and publish a new snapshot.
    ///
    /// On failure the previous snapshot stays in place (with the error
    /// recorded on it) and the error is returned; no partial data is
    /// published.
    pub async fn list(&self) -> Result<Arc<ReviewSnapshot>, StoreError> {
        let _reload = self.reload.lock().await;
        self.reload_locked().await
    }

    /// Caller must hold the reload lock.
    async fn reload_locked(&self) -> Result<Arc<ReviewSnapshot>, StoreError> {
        // Writes settled after this point may be missing from the read.
        let observed = self.settled_writes.load(Ordering::SeqCst);

        match self.backend.select_all().await {
            Ok(reviews) => {
                self.synced_writes.fetch_max(observed, Ordering::SeqCst);
                let version = self.snapshot.borrow().version + 1;
                let next = Arc::new(ReviewSnapshot {
                    version,
                    reviews,
                    loaded_at: Some(Utc::now()),
                    last_refresh_error: None,
                });
                self.snapshot.send_replace(Arc::clone(&next));
                tracing::debug!(
                    version,
                    count = next.reviews.len(),
                    backend = self.backend.name(),
                    "Review snapshot reloaded",
                );
                Ok(next)
            }
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    backend = self.backend.name(),
                    "Review reload failed, keeping previous snapshot",
                );
                let message = err.to_string();
                self.snapshot.send_modify(|current| {
                    let mut kept = ReviewSnapshot::clone(current);
                    kept.last_refresh_error = Some(message);
                    *current = Arc::new(kept);
                });
                Err(err)
            }
        }
    }

    /// Load the set unless the cached snapshot is loaded and current.
    ///
    /// A snapshot is reloaded when a write settled after it was read or when
    /// the last reload failed. If that reload fails again but an older
    /// snapshot exists, the older one is returned with the error recorded on
    /// it. Only a store that never loaded reports the error.
    pub async fn ensure_loaded(&self) -> Result<Arc<ReviewSnapshot>, StoreError> {
        let current = self.snapshot();
        if self.is_current(&current) {
            return Ok(current);
        }

        let _reload = self.reload.lock().await;
        let current = self.snapshot();
        if self.is_current(&current) {
            return Ok(current);
        }

        match self.reload_locked().await {
            Ok(next) => Ok(next),
            Err(_) if current.is_loaded() => Ok(self.snapshot()),
            Err(err) => Err(err),
        }
    }

    /// True when a write has settled since the current snapshot was read.
    pub fn is_stale(&self) -> bool {
        self.synced_writes.load(Ordering::SeqCst) < self.settled_writes.load(Ordering::SeqCst)
    }

    fn is_current(&self, snapshot: &ReviewSnapshot) -> bool {
        snapshot.is_loaded() && snapshot.last_refresh_error.is_none() && !self.is_stale()
    }

    /// The current snapshot, without I/O.
    pub fn snapshot(&self) -> Arc<ReviewSnapshot> {
        Arc::clone(&self.snapshot.borrow())
    }

    /// A receiver that is notified whenever the snapshot is replaced.
    pub fn subscribe(&self) -> watch::Receiver<Arc<ReviewSnapshot>> {
        self.snapshot.subscribe()
    }

    pub fn get(&self, id: DbId) -> Option<Review> {
        self.snapshot().get(id).cloned()
    }

    pub fn view(&self, filter: &FilterState) -> ReviewView {
        self.snapshot().view(filter)
    }

    pub fn available_tags(&self) -> Vec<String> {
        self.snapshot().available_tags()
    }

    pub fn is_creating(&self) -> bool {
        self.creating.is_active()
    }

    pub fn is_updating(&self) -> bool {
        self.updating.is_active()
    }

    pub fn is_deleting(&self) -> bool {
        self.deleting.is_active()
    }

    // -- mutations -----------------------------------------------------------

    /// Create a review owned by `identity`.
    pub async fn create(
        &self,
        identity: Option<&Identity>,
        draft: &ReviewDraft,
    ) -> Result<Review, StoreError> {
        let review = draft.validate()?;
        let identity = identity.ok_or(StoreError::AuthRequired)?;

        let created = {
            let _settle = SettleOnDrop(&self.settled_writes);
            let _pending = self.creating.begin();
            self.backend.insert(identity.user_id, &review).await?
        };
        tracing::info!(review_id = created.id, user_id = identity.user_id, "Review created");

        self.refresh_after_mutation().await;
        Ok(created)
    }

    /// Replace the fields of review `id`. Only its owner may do this; the
    /// backend enforces that.
    pub async fn update(
        &self,
        identity: Option<&Identity>,
        id: DbId,
        draft: &ReviewDraft,
    ) -> Result<Review, StoreError> {
        let review = draft.validate()?;
        let identity = identity.ok_or(StoreError::AuthRequired)?;

        let updated = {
            let _edit = self.edits.begin(id, EditKind::Update)?;
            let _settle = SettleOnDrop(&self.settled_writes);
            let _pending = self.updating.begin();
            self.backend.update(id, identity.user_id, &review).await?
        };
        tracing::info!(review_id = id, user_id = identity.user_id, "Review updated");

        self.refresh_after_mutation().await;
        Ok(updated)
    }

    /// Permanently remove review `id`.
    pub async fn delete(&self, identity: Option<&Identity>, id: DbId) -> Result<(), StoreError> {
        let identity = identity.ok_or(StoreError::AuthRequired)?;

        {
            let _edit = self.edits.begin(id, EditKind::Delete)?;
            let _settle = SettleOnDrop(&self.settled_writes);
            let _pending = self.deleting.begin();
            self.backend.delete(id, identity.user_id).await?;
        }
        tracing::info!(review_id = id, user_id = identity.user_id, "Review deleted");

        self.refresh_after_mutation().await;
        Ok(())
    }

    /// The mutation already succeeded; a failed reload only leaves the
    /// previous snapshot in place and the store stale.
    async fn refresh_after_mutation(&self) {
        if let Err(err) = self.list().await {
            tracing::warn!(error = %err, "Snapshot is stale after a successful mutation");
        }
    }
}
