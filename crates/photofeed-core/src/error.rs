//! Error types module
//!
//! All request-level failures are unified under the `AppError` enum. Each
//! variant knows its HTTP status code, the message safe to show a client,
//! and the severity it should be logged at. Internal detail (database errors,
//! upstream response bodies) stays server-side.

use sqlx::Error as SqlxError;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues
    Warn,
    /// Error level - for unexpected failures
    Error,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] SqlxError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Upstream service error: {0}")]
    Upstream(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            AppError::InvalidInput(_) => 400,
            AppError::NotFound(_) => 404,
            AppError::Database(_)
            | AppError::Upstream(_)
            | AppError::Storage(_)
            | AppError::Internal(_) => 500,
        }
    }

    /// Message safe to return to the client. 5xx variants collapse to a
    /// generic message; the detailed one is logged server-side.
    pub fn client_message(&self) -> String {
        match self {
            AppError::InvalidInput(msg) => msg.clone(),
            AppError::NotFound(msg) => msg.clone(),
            AppError::Upstream(_) | AppError::Storage(_) => {
                "Error processing image".to_string()
            }
            AppError::Database(_) | AppError::Internal(_) => {
                "Internal server error".to_string()
            }
        }
    }

    /// Machine-readable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::InvalidInput(_) => "INVALID_INPUT",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Upstream(_) => "UPSTREAM_ERROR",
            AppError::Storage(_) => "STORAGE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Log level for this error.
    pub fn log_level(&self) -> LogLevel {
        match self {
            AppError::InvalidInput(_) | AppError::NotFound(_) => LogLevel::Debug,
            AppError::Upstream(_) => LogLevel::Warn,
            AppError::Database(_) | AppError::Storage(_) | AppError::Internal(_) => {
                LogLevel::Error
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_client_visible() {
        let err = AppError::InvalidInput("No file uploaded.".to_string());
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(err.client_message(), "No file uploaded.");
        assert_eq!(err.log_level(), LogLevel::Debug);
    }

    #[test]
    fn upstream_detail_is_hidden_from_clients() {
        let err = AppError::Upstream("connect refused: 10.0.0.5:5000".to_string());
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.client_message(), "Error processing image");
        assert!(err.to_string().contains("10.0.0.5"));
    }

    #[test]
    fn not_found_maps_to_404() {
        let err = AppError::NotFound("Image not found".to_string());
        assert_eq!(err.http_status_code(), 404);
        assert_eq!(err.error_code(), "NOT_FOUND");
    }
}
