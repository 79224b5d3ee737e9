//! Photofeed API Library
//!
//! HTTP handlers, the upload orchestrator and notifier services, and the
//! application setup.

// Module declarations
mod handlers;
mod telemetry;

// Public modules
pub mod error;
pub mod services;
pub mod setup;
pub mod state;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
pub use services::listing::ListingService;
pub use services::notifier::{Mailer, Notifier, NotifyReport, SmtpMailer};
pub use services::upload::UploadService;
