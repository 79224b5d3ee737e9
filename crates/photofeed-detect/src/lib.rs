//! Client for the external object-detection service.
//!
//! A single operation: submit image bytes as a multipart form, get back
//! labeled bounding boxes, keep the ones classified "person". The service's
//! own `min_confidence` parameter is authoritative for confidence filtering;
//! locally only the label filter is applied.

mod client;

pub use client::{DetectionClient, DetectionError, Detector};
