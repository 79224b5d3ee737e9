//! Test helpers: build AppState and router for integration tests.
//!
//! Run from workspace root: `cargo test -p photofeed-api --test upload_test`
//! or `cargo test -p photofeed-api`. Everything runs over in-memory doubles;
//! no database or SMTP server is needed.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum_test::TestServer;
use bytes::Bytes;
use photofeed_api::services::notifier::{Mailer, Notifier};
use photofeed_api::setup::routes::setup_routes;
use photofeed_api::state::AppState;
use photofeed_core::models::{Detection, ImageMeta};
use photofeed_core::Config;
use photofeed_db::MemorySubscriberStore;
use photofeed_detect::{DetectionError, Detector};
use photofeed_storage::{BlobStore, MemoryBlobStore};

/// What the mock detection service should report.
#[derive(Debug, Clone, Copy)]
pub enum DetectorMode {
    /// N "person" boxes.
    People(usize),
    /// Connection-level failure.
    Unreachable,
}

pub struct MockDetector {
    mode: Mutex<DetectorMode>,
    pub calls: AtomicUsize,
}

impl MockDetector {
    pub fn new(mode: DetectorMode) -> Self {
        Self {
            mode: Mutex::new(mode),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn set_mode(&self, mode: DetectorMode) {
        *self.mode.lock().unwrap() = mode;
    }
}

#[async_trait]
impl Detector for MockDetector {
    async fn detect(
        &self,
        _bytes: Bytes,
        _filename: &str,
        _content_type: &str,
        _min_confidence: f32,
    ) -> Result<Vec<Detection>, DetectionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match *self.mode.lock().unwrap() {
            DetectorMode::People(n) => Ok((0..n)
                .map(|i| Detection {
                    x_min: i as i32 * 10,
                    y_min: 0,
                    x_max: i as i32 * 10 + 5,
                    y_max: 20,
                    confidence: 0.9,
                })
                .collect()),
            DetectorMode::Unreachable => Err(DetectionError::Unreachable(
                "connection refused".to_string(),
            )),
        }
    }
}

/// Records every delivered mail.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, to: &str, _subject: &str, body_html: &str) -> Result<(), String> {
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), body_html.to_string()));
        Ok(())
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub store: Arc<MemoryBlobStore>,
    pub subscribers: Arc<MemorySubscriberStore>,
    pub detector: Arc<MockDetector>,
    pub mailer: Arc<RecordingMailer>,
}

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://localhost/unused".to_string(),
        server_port: 3000,
        environment: "test".to_string(),
        db_max_connections: 1,
        db_timeout_seconds: 5,
        detection_url: "http://localhost:5000/v1/vision/detection".to_string(),
        detection_timeout_secs: 5,
        storage_timeout_secs: 5,
        smtp_host: None,
        smtp_port: 465,
        smtp_user: None,
        smtp_password: None,
        from_email: None,
        base_url: "http://localhost:3000".to_string(),
    }
}

pub fn setup_test_app() -> TestApp {
    let store = Arc::new(MemoryBlobStore::new());
    let subscribers = Arc::new(MemorySubscriberStore::new());
    let detector = Arc::new(MockDetector::new(DetectorMode::People(0)));
    let mailer = Arc::new(RecordingMailer::default());

    let notifier = Arc::new(Notifier::new(
        subscribers.clone(),
        mailer.clone(),
        "http://localhost:3000".to_string(),
    ));

    let state = Arc::new(AppState::new(
        store.clone(),
        subscribers.clone(),
        detector.clone(),
        Some(notifier),
        &test_config(),
    ));

    let server = TestServer::new(setup_routes(state)).expect("test server");

    TestApp {
        server,
        store,
        subscribers,
        detector,
        mailer,
    }
}

/// Seed a committed blob directly into the store.
pub async fn seed_image(store: &MemoryBlobStore, key: &str, bytes: &[u8], people: usize) {
    let detections = (0..people)
        .map(|i| Detection {
            x_min: i as i32,
            y_min: 0,
            x_max: i as i32 + 1,
            y_max: 1,
            confidence: 0.8,
        })
        .collect();
    let meta = ImageMeta::new(None, "image/jpeg".to_string(), detections, key);
    let mut writer = store.open_write(key, meta).await.expect("open");
    writer.write(bytes).await.expect("write");
    writer.commit().await.expect("commit");
}

/// Wait (bounded) for the spawned notification task to deliver.
pub async fn wait_for_mail(mailer: &RecordingMailer, expected: usize) {
    for _ in 0..100 {
        if mailer.sent.lock().unwrap().len() >= expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!(
        "Expected {} delivered mails, got {}",
        expected,
        mailer.sent.lock().unwrap().len()
    );
}
