//! Application state.
//!
//! All collaborators are constructed explicitly in `setup` and injected here;
//! handlers receive the state via axum's `State` extractor.

use std::sync::Arc;
use std::time::Duration;

use photofeed_core::Config;
use photofeed_db::SubscriberStore;
use photofeed_detect::Detector;
use photofeed_storage::BlobStore;

use crate::services::listing::ListingService;
use crate::services::notifier::Notifier;
use crate::services::upload::UploadService;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn BlobStore>,
    pub subscribers: Arc<dyn SubscriberStore>,
    pub uploads: UploadService,
    pub listing: ListingService,
}

impl AppState {
    pub fn new(
        store: Arc<dyn BlobStore>,
        subscribers: Arc<dyn SubscriberStore>,
        detector: Arc<dyn Detector>,
        notifier: Option<Arc<Notifier>>,
        config: &Config,
    ) -> Self {
        let uploads = UploadService::new(
            store.clone(),
            detector,
            notifier,
            Duration::from_secs(config.storage_timeout_secs),
        );
        let listing = ListingService::new(store.clone());
        Self {
            store,
            subscribers,
            uploads,
            listing,
        }
    }
}

fn _assert_app_state_send_sync() {
    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}
    assert_send::<AppState>();
    assert_sync::<AppState>();
}
