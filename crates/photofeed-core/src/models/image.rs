use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Placeholder rendered wherever a record has no description.
pub const NO_DESCRIPTION: &str = "No description";

/// One bounding box classified "person" by the detection service.
/// Field names match the service's prediction objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub x_min: i32,
    pub y_min: i32,
    pub x_max: i32,
    pub y_max: i32,
    pub confidence: f32,
}

/// Metadata attached to an image blob at write time. Stored as JSONB next to
/// the chunk index; immutable once the blob is committed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageMeta {
    pub description: Option<String>,
    pub content_type: String,
    pub people_detected: i64,
    pub detections: Vec<Detection>,
    /// Informational relative path; retrieval goes through the blob id.
    pub image_url: String,
}

impl ImageMeta {
    /// Build metadata for a freshly detected upload. `people_detected` is
    /// derived from the detection list, keeping the count/len invariant by
    /// construction.
    pub fn new(
        description: Option<String>,
        content_type: String,
        detections: Vec<Detection>,
        storage_key: &str,
    ) -> Self {
        ImageMeta {
            description,
            content_type,
            people_detected: detections.len() as i64,
            detections,
            image_url: format!("/images/{}", storage_key),
        }
    }

    /// Description for display, falling back to the placeholder.
    pub fn display_description(&self) -> &str {
        self.description.as_deref().unwrap_or(NO_DESCRIPTION)
    }
}

/// A committed blob: store-assigned identity plus the metadata written with it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredImage {
    pub id: Uuid,
    pub storage_key: String,
    pub length: i64,
    pub upload_date: DateTime<Utc>,
    pub meta: ImageMeta,
}

/// One page of the reverse-chronological listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImagePage {
    pub entries: Vec<StoredImage>,
    pub page: i64,
    pub total_pages: i64,
}
