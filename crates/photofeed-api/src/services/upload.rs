//! Upload orchestrator.
//!
//! The pipeline for one upload: validate, generate a collision-resistant
//! storage key, run people detection, stream the bytes into the blob store,
//! and — only after a durable commit — fan out subscriber notifications on a
//! detached task. Detection and storage failures abort the request with no
//! side effects; notification failures never reach the uploader.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use photofeed_core::models::{ImageMeta, StoredImage};
use photofeed_core::AppError;
use photofeed_detect::Detector;
use photofeed_storage::{BlobStore, CommittedBlob, StorageResult, CHUNK_SIZE_BYTES};
use rand::RngCore;

use crate::error::storage_error;
use crate::services::notifier::Notifier;

/// Detection threshold forwarded to the service. The service-side filter is
/// authoritative; boxes below this never come back.
pub const MIN_CONFIDENCE: f32 = 0.4;

/// Coordinates one upload end to end. Collaborators are injected; the
/// service holds no global state.
#[derive(Clone)]
pub struct UploadService {
    store: Arc<dyn BlobStore>,
    detector: Arc<dyn Detector>,
    notifier: Option<Arc<Notifier>>,
    storage_timeout: Duration,
}

impl UploadService {
    pub fn new(
        store: Arc<dyn BlobStore>,
        detector: Arc<dyn Detector>,
        notifier: Option<Arc<Notifier>>,
        storage_timeout: Duration,
    ) -> Self {
        Self {
            store,
            detector,
            notifier,
            storage_timeout,
        }
    }

    #[tracing::instrument(skip(self, bytes), fields(size_bytes = bytes.len()))]
    pub async fn handle_upload(
        &self,
        bytes: Bytes,
        original_filename: &str,
        content_type: &str,
        description: Option<String>,
    ) -> Result<StoredImage, AppError> {
        if bytes.is_empty() {
            return Err(AppError::InvalidInput("No file uploaded.".to_string()));
        }

        let storage_key = generate_storage_key(original_filename);

        let detections = self
            .detector
            .detect(bytes.clone(), &storage_key, content_type, MIN_CONFIDENCE)
            .await
            .map_err(|e| AppError::Upstream(e.to_string()))?;

        let meta = ImageMeta::new(
            description.clone(),
            content_type.to_string(),
            detections,
            &storage_key,
        );
        let people_detected = meta.people_detected;

        let committed = tokio::time::timeout(
            self.storage_timeout,
            self.write_blob(&storage_key, meta.clone(), &bytes),
        )
        .await
        .map_err(|_| AppError::Storage("Blob write timed out".to_string()))?
        .map_err(storage_error)?;

        tracing::info!(
            image_id = %committed.id,
            storage_key = %storage_key,
            people_detected,
            "Image upload committed"
        );

        // Notification is decoupled from the response: the upload is already
        // successful, so the fan-out runs on its own task and only logs.
        if let Some(notifier) = &self.notifier {
            let notifier = notifier.clone();
            let description = description.clone();
            let image_id = committed.id;
            tokio::spawn(async move {
                match notifier
                    .notify_all(description.as_deref(), people_detected, image_id)
                    .await
                {
                    Ok(report) => tracing::info!(
                        image_id = %image_id,
                        sent = report.sent,
                        failed = report.failed,
                        "Subscriber notification fan-out finished"
                    ),
                    Err(e) => tracing::error!(
                        image_id = %image_id,
                        error = %e,
                        "Subscriber notification fan-out failed"
                    ),
                }
            });
        }

        Ok(StoredImage {
            id: committed.id,
            storage_key,
            length: bytes.len() as i64,
            upload_date: committed.upload_date,
            meta,
        })
    }

    async fn write_blob(
        &self,
        storage_key: &str,
        meta: ImageMeta,
        bytes: &Bytes,
    ) -> StorageResult<CommittedBlob> {
        let mut writer = self.store.open_write(storage_key, meta).await?;
        for chunk in bytes.chunks(CHUNK_SIZE_BYTES) {
            writer.write(chunk).await?;
        }
        writer.commit().await
    }
}

/// Random hex key plus the original extension. The key carries nothing of the
/// original filename stem.
pub fn generate_storage_key(original_filename: &str) -> String {
    let mut key = [0u8; 16];
    rand::rng().fill_bytes(&mut key);
    let extension = Path::new(original_filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e))
        .unwrap_or_default();
    format!("{}{}", hex::encode(key), extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_key_is_hex_plus_extension() {
        let key = generate_storage_key("holiday photo.JPG");
        let (stem, ext) = key.split_at(32);
        assert_eq!(ext, ".JPG");
        assert!(stem.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(!key.contains("holiday"));
    }

    #[test]
    fn storage_key_without_extension_is_bare_hex() {
        let key = generate_storage_key("noextension");
        assert_eq!(key.len(), 32);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn storage_keys_do_not_collide() {
        let a = generate_storage_key("same.jpg");
        let b = generate_storage_key("same.jpg");
        assert_ne!(a, b);
    }
}
