//! Handlers for the `/reviews` resource.
//!
//! Reads are served from the cached snapshot held by
//! [`ReviewStore`](reviewglobe_store::ReviewStore); mutations go through the
//! store so validation, the sign-in check and the post-write reload happen
//! in one place.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use reviewglobe_core::review::ReviewDraft;
use reviewglobe_core::search::FilterState;
use reviewglobe_core::types::DbId;
use reviewglobe_store::StoreError;
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::auth::MaybeAuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /reviews`.
#[derive(Debug, Default, Deserialize)]
pub struct ReviewListParams {
    /// Comma-separated tag selection, e.g. `coffee,paris`.
    pub tags: Option<String>,
    /// Free-text search over text, location and name.
    pub q: Option<String>,
    /// Reload from the database before filtering.
    #[serde(default)]
    pub refresh: bool,
}

/// GET /api/v1/reviews
///
/// The visible list for the requested filter, newest first, with the total
/// count and a results summary when a filter is active. When the last reload
/// failed the cached set is served with `last_refresh_error` set.
pub async fn list_reviews(
    State(state): State<AppState>,
    Query(params): Query<ReviewListParams>,
) -> AppResult<impl IntoResponse> {
    let snapshot = if params.refresh {
        state.reviews.list().await?
    } else {
        state.reviews.ensure_loaded().await?
    };

    let filter = FilterState::from_params(params.tags.as_deref(), params.q.as_deref());
    Ok(Json(DataResponse {
        data: snapshot.view(&filter),
    }))
}

/// GET /api/v1/reviews/tags
///
/// Every distinct tag in the cached set, sorted.
pub async fn list_tags(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let snapshot = state.reviews.ensure_loaded().await?;
    Ok(Json(DataResponse {
        data: snapshot.available_tags(),
    }))
}

/// GET /api/v1/reviews/{id}
pub async fn get_review(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let snapshot = state.reviews.ensure_loaded().await?;
    let review = snapshot.get(id).cloned().ok_or(StoreError::NotFound { id })?;
    Ok(Json(DataResponse { data: review }))
}

/// POST /api/v1/reviews
pub async fn create_review(
    auth: MaybeAuthUser,
    State(state): State<AppState>,
    Json(draft): Json<ReviewDraft>,
) -> AppResult<impl IntoResponse> {
    let identity = auth.identity();
    let review = state.reviews.create(identity.as_ref(), &draft).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: review })))
}

/// PUT /api/v1/reviews/{id}
///
/// Replace every editable field. Only the review's author may do this.
pub async fn update_review(
    auth: MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(draft): Json<ReviewDraft>,
) -> AppResult<impl IntoResponse> {
    let identity = auth.identity();
    let review = state.reviews.update(identity.as_ref(), id, &draft).await?;
    Ok(Json(DataResponse { data: review }))
}

/// DELETE /api/v1/reviews/{id}
pub async fn delete_review(
    auth: MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let identity = auth.identity();
    state.reviews.delete(identity.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
