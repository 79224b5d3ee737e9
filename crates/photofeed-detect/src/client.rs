use async_trait::async_trait;
use bytes::Bytes;
use photofeed_core::models::Detection;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

const PERSON_LABEL: &str = "person";

#[derive(Debug, Error)]
pub enum DetectionError {
    #[error("Detection service unreachable: {0}")]
    Unreachable(String),

    #[error("Detection service bad response: {0}")]
    BadResponse(String),
}

/// People detection over an image payload.
#[async_trait]
pub trait Detector: Send + Sync {
    /// Returns every "person" bounding box the service reports at or above
    /// `min_confidence`. Zero detections is a valid success.
    async fn detect(
        &self,
        bytes: Bytes,
        filename: &str,
        content_type: &str,
        min_confidence: f32,
    ) -> Result<Vec<Detection>, DetectionError>;
}

/// HTTP client for the detection endpoint.
pub struct DetectionClient {
    http_client: reqwest::Client,
    endpoint: String,
}

impl DetectionClient {
    pub fn new(endpoint: String, timeout: Duration) -> Result<Self, DetectionError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                DetectionError::Unreachable(format!("Failed to create HTTP client: {}", e))
            })?;
        Ok(Self {
            http_client,
            endpoint,
        })
    }

    /// Keep predictions labeled "person" (case-sensitive exact match).
    fn filter_people(response: DetectResponse) -> Vec<Detection> {
        response
            .predictions
            .unwrap_or_default()
            .into_iter()
            .filter(|p| p.label == PERSON_LABEL)
            .map(|p| Detection {
                x_min: p.x_min,
                y_min: p.y_min,
                x_max: p.x_max,
                y_max: p.y_max,
                confidence: p.confidence,
            })
            .collect()
    }
}

#[async_trait]
impl Detector for DetectionClient {
    async fn detect(
        &self,
        bytes: Bytes,
        filename: &str,
        content_type: &str,
        min_confidence: f32,
    ) -> Result<Vec<Detection>, DetectionError> {
        let part = reqwest::multipart::Part::bytes(bytes.to_vec())
            .file_name(filename.to_string())
            .mime_str(content_type)
            .map_err(|e| {
                DetectionError::BadResponse(format!("Invalid content type {}: {}", content_type, e))
            })?;
        // The threshold rides along as a form field; the service drops
        // low-confidence boxes before they ever reach us.
        let form = reqwest::multipart::Form::new()
            .part("image", part)
            .text("min_confidence", min_confidence.to_string());

        let response = self
            .http_client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| DetectionError::Unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(DetectionError::BadResponse(format!(
                "{} - {}",
                status, error_text
            )));
        }

        let detect_response: DetectResponse = response
            .json()
            .await
            .map_err(|e| DetectionError::BadResponse(e.to_string()))?;

        let detections = Self::filter_people(detect_response);
        tracing::debug!(
            filename = %filename,
            people = detections.len(),
            "Detection completed"
        );
        Ok(detections)
    }
}

// Detection service response types
#[derive(Debug, Deserialize)]
struct DetectResponse {
    predictions: Option<Vec<Prediction>>,
}

#[derive(Debug, Deserialize)]
struct Prediction {
    label: String,
    confidence: f32,
    x_min: i32,
    y_min: i32,
    x_max: i32,
    y_max: i32,
}
