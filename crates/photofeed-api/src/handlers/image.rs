use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use futures::StreamExt;
use photofeed_core::AppError;
use uuid::Uuid;

use crate::error::HttpAppError;
use crate::state::AppState;

/// `GET /images/{id}` — stream the blob with its stored content type.
/// A malformed id is indistinguishable from an unknown one: 404.
pub async fn stream_image(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, HttpAppError> {
    let id = Uuid::parse_str(&id)
        .map_err(|_| AppError::NotFound("Image not found".to_string()))?;

    let image = state
        .store
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Image not found".to_string()))?;

    tracing::debug!(image_id = %id, storage_key = %image.storage_key, "Streaming blob");

    let stream = state.store.read_stream(id).await?;
    let body_stream = stream.map(|result| {
        result.map_err(|e| std::io::Error::other(format!("Storage stream error: {}", e)))
    });

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, image.meta.content_type)
        .header(header::CONTENT_LENGTH, image.length)
        .body(Body::from_stream(body_stream))
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to build response");
            HttpAppError(AppError::Internal(e.to_string()))
        })?;

    Ok(response.into_response())
}
