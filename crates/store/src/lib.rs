//! Review store access.
//!
//! [`ReviewStore`] owns the cached, versioned review set. It is the only
//! writer of that set: every successful create/update/delete triggers a full
//! reload from the [`ReviewBackend`], and readers observe whole snapshots
//! through [`ReviewStore::snapshot`], [`ReviewStore::subscribe`] or a
//! [`ReviewFeed`].

pub mod backend;
pub mod error;
pub mod feed;
pub mod memory;
pub mod postgres;
pub mod snapshot;
pub mod store;

pub use backend::{Identity, ReviewBackend};
pub use error::StoreError;
pub use feed::ReviewFeed;
pub use memory::MemoryBackend;
pub use postgres::PgReviewBackend;
pub use snapshot::{ReviewSnapshot, ReviewView};
pub use store::ReviewStore;
