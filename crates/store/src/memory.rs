//! In-process [`ReviewBackend`] for tests and local experiments.
//!
//! Besides storing reviews in a `Vec`, it can be told to fail reads or writes
//! and to hold either until resumed, which lets callers exercise the store's
//! failure and concurrency paths deterministically.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use reviewglobe_core::review::ValidatedReview;
use reviewglobe_core::types::DbId;
use reviewglobe_db::models::review::Review;
use tokio::sync::watch;

use crate::backend::ReviewBackend;
use crate::error::StoreError;

#[derive(Default)]
struct Table {
    next_id: DbId,
    rows: Vec<Review>,
}

pub struct MemoryBackend {
    table: Mutex<Table>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    paused: watch::Sender<bool>,
    reads_paused: watch::Sender<bool>,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        let (paused, _) = watch::channel(false);
        let (reads_paused, _) = watch::channel(false);
        Self {
            table: Mutex::new(Table::default()),
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
            paused,
            reads_paused,
            reads: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
        }
    }

    /// Make every subsequent `select_all` fail until switched off.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent write fail until switched off.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Hold writes that start from now on until [`resume_writes`](Self::resume_writes).
    pub fn pause_writes(&self) {
        self.paused.send_replace(true);
    }

    pub fn resume_writes(&self) {
        self.paused.send_replace(false);
    }

    /// Hold reads that start from now on until [`resume_reads`](Self::resume_reads).
    pub fn pause_reads(&self) {
        self.reads_paused.send_replace(true);
    }

    pub fn resume_reads(&self) {
        self.reads_paused.send_replace(false);
    }

    /// Number of `select_all` calls received.
    pub fn read_calls(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of insert/update/delete calls received.
    pub fn write_calls(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    async fn begin_write(&self) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);

        let mut paused = self.paused.subscribe();
        let _ = paused.wait_for(|held| !*held).await;

        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Persistence("write rejected by memory backend".into()));
        }
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Table>, StoreError> {
        self.table
            .lock()
            .map_err(|_| StoreError::Persistence("memory backend lock poisoned".into()))
    }
}

fn check_owner(row: &Review, owner_id: DbId, action: &str) -> Result<(), StoreError> {
    if row.is_owned_by(owner_id) {
        Ok(())
    } else {
        Err(StoreError::Forbidden(format!("Only the owner may {action} this review")))
    }
}

#[async_trait]
impl ReviewBackend for MemoryBackend {
    async fn insert(
        &self,
        owner_id: DbId,
        review: &ValidatedReview,
    ) -> Result<Review, StoreError> {
        self.begin_write().await?;

        let mut table = self.lock()?;
        table.next_id += 1;
        let now = Utc::now();
        let row = Review {
            id: table.next_id,
            text: review.text().to_string(),
            rating: review.rating(),
            tags: review.tags().to_vec(),
            image_url: review.image_url().map(str::to_string),
            location: review.location().map(str::to_string),
            display_name: review.display_name().map(str::to_string),
            owner_id: Some(owner_id),
            created_at: now,
            updated_at: now,
        };
        table.rows.push(row.clone());
        Ok(row)
    }

    async fn select_all(&self) -> Result<Vec<Review>, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);

        let mut paused = self.reads_paused.subscribe();
        let _ = paused.wait_for(|held| !*held).await;

        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Persistence("read rejected by memory backend".into()));
        }

        let mut rows = self.lock()?.rows.clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn update(
        &self,
        id: DbId,
        owner_id: DbId,
        review: &ValidatedReview,
    ) -> Result<Review, StoreError> {
        self.begin_write().await?;

        let mut table = self.lock()?;
        let row = table
            .rows
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(StoreError::NotFound { id })?;
        check_owner(row, owner_id, "edit")?;

        row.text = review.text().to_string();
        row.rating = review.rating();
        row.tags = review.tags().to_vec();
        row.image_url = review.image_url().map(str::to_string);
        row.location = review.location().map(str::to_string);
        row.display_name = review.display_name().map(str::to_string);
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn delete(&self, id: DbId, owner_id: DbId) -> Result<(), StoreError> {
        self.begin_write().await?;

        let mut table = self.lock()?;
        let index = table
            .rows
            .iter()
            .position(|r| r.id == id)
            .ok_or(StoreError::NotFound { id })?;
        check_owner(&table.rows[index], owner_id, "delete")?;
        table.rows.remove(index);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
