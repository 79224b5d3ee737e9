//! Route configuration and setup.

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get},
    Router,
};
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Setup all application routes
pub fn setup_routes(state: Arc<AppState>) -> Router {
    // Whole images are buffered per request, so in-flight requests are what
    // bound memory use.
    let concurrency_limit = std::env::var("HTTP_CONCURRENCY_LIMIT")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(64)
        .max(1);
    tracing::info!(concurrency_limit, "HTTP concurrency limit layer enabled");

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::gallery::list_images))
        .route(
            "/upload",
            get(handlers::upload::upload_form)
                .post(handlers::upload::upload_image)
                // The detection service's own request-size policy governs;
                // no local body cap on uploads.
                .layer(DefaultBodyLimit::disable()),
        )
        .route("/images", delete(handlers::purge::purge_images))
        .route("/images/{id}", get(handlers::image::stream_image))
        .route(
            "/subscribe",
            get(handlers::subscribe::subscribe_form).post(handlers::subscribe::subscribe),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(ConcurrencyLimitLayer::new(concurrency_limit))
        .with_state(state)
}
