use std::sync::Arc;

use reviewglobe_store::{PgReviewBackend, ReviewStore};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything heavy sits behind an `Arc` or the pool.
#[derive(Clone)]
pub struct AppState {
    pub pool: reviewglobe_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// The cached review set, backed by Postgres.
    pub reviews: Arc<ReviewStore>,
}

impl AppState {
    pub fn new(pool: reviewglobe_db::DbPool, config: ServerConfig) -> Self {
        let backend = Arc::new(PgReviewBackend::new(pool.clone()));
        Self {
            pool,
            config: Arc::new(config),
            reviews: Arc::new(ReviewStore::new(backend)),
        }
    }
}
