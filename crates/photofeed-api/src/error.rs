//! HTTP error response conversion
//!
//! `HttpAppError` wraps `AppError` so the external `IntoResponse` trait can
//! be implemented here (orphan rules). Conversion logs the detailed error at
//! the variant's severity and sends only the client-safe message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use photofeed_core::{AppError, LogLevel};
use photofeed_detect::DetectionError;
use photofeed_storage::StorageError;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

/// Wrapper type for AppError to implement IntoResponse.
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

/// Map a storage failure to the request-level error. Unknown blob ids become
/// 404s; everything else is a server-side storage fault.
pub(crate) fn storage_error(err: StorageError) -> AppError {
    match err {
        StorageError::NotFound(_) => AppError::NotFound("Image not found".to_string()),
        other => AppError::Storage(other.to_string()),
    }
}

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        HttpAppError(storage_error(err))
    }
}

impl From<DetectionError> for HttpAppError {
    fn from(err: DetectionError) -> Self {
        HttpAppError(AppError::Upstream(err.to_string()))
    }
}

fn log_error(error: &AppError) {
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, code = error.error_code(), "Request failed");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, code = error.error_code(), "Request failed");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, code = error.error_code(), "Request failed");
        }
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        let body = Json(ErrorResponse {
            error: app_error.client_message(),
            code: app_error.error_code().to_string(),
        });

        (status, body).into_response()
    }
}
