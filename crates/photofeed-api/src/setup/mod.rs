//! Application setup and initialization
//!
//! Everything main.rs needs to get from a loaded `Config` to a running
//! router: telemetry, the database pool and migrations, the injected
//! services, and the route table.

pub mod database;
pub mod routes;
pub mod server;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use photofeed_core::Config;
use photofeed_db::{PgSubscriberStore, SubscriberStore};
use photofeed_detect::{DetectionClient, Detector};
use photofeed_storage::{BlobStore, PgBlobStore};

use crate::services::notifier::Notifier;
use crate::state::AppState;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    config.validate().context("Configuration validation failed")?;

    crate::telemetry::init_telemetry();
    tracing::info!("Configuration loaded and validated successfully");

    // Database pool plus migrations, then the explicitly constructed
    // collaborators wired into the state.
    let pool = database::setup_database(&config).await?;

    let store: Arc<dyn BlobStore> = Arc::new(PgBlobStore::new(pool.clone()));
    let subscribers: Arc<dyn SubscriberStore> = Arc::new(PgSubscriberStore::new(pool));

    let detector: Arc<dyn Detector> = Arc::new(
        DetectionClient::new(
            config.detection_url.clone(),
            Duration::from_secs(config.detection_timeout_secs),
        )
        .context("Failed to create detection client")?,
    );

    let notifier = Notifier::from_config(&config, subscribers.clone()).map(Arc::new);
    if notifier.is_none() {
        tracing::warn!("SMTP not configured, subscriber notifications disabled");
    }

    let state = Arc::new(AppState::new(store, subscribers, detector, notifier, &config));

    let router = routes::setup_routes(state.clone());

    Ok((state, router))
}
