use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use photofeed_storage::PurgeOutcome;
use serde_json::json;

use crate::error::HttpAppError;
use crate::state::AppState;

/// `DELETE /images` — bulk purge. An empty store is a distinct 404 outcome
/// so operators can tell it apart from a failed delete.
pub async fn purge_images(State(state): State<Arc<AppState>>) -> Result<Response, HttpAppError> {
    match state.store.delete_all().await? {
        PurgeOutcome::Empty => Ok((
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "No image found to delete." })),
        )
            .into_response()),
        PurgeOutcome::Deleted(deleted) => {
            tracing::info!(deleted, "Bulk image purge completed");
            Ok(Json(json!({ "deleted": deleted })).into_response())
        }
    }
}
