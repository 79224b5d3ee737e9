use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use photofeed_core::models::ImagePage;
use serde::Deserialize;

use crate::error::HttpAppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    page: Option<String>,
}

impl PageQuery {
    /// Non-numeric or missing values fall back to page 1.
    fn page(&self) -> i64 {
        self.page
            .as_deref()
            .and_then(|p| p.parse().ok())
            .unwrap_or(1)
    }
}

/// `GET /` — one page of stored images, most recent first, plus pagination
/// metadata.
pub async fn list_images(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> Result<Json<ImagePage>, HttpAppError> {
    let page = state.listing.list_page(query.page()).await?;
    Ok(Json(page))
}
