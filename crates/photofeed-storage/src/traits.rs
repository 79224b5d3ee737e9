//! Storage abstraction traits
//!
//! All blob store backends implement [`BlobStore`]. Writes are streamed
//! through a [`BlobWriter`]: the blob only becomes visible to readers when
//! `commit` succeeds, and a writer dropped before commit leaves nothing
//! behind.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::Stream;
use photofeed_core::models::{ImageMeta, StoredImage};
use std::pin::Pin;
use thiserror::Error;
use uuid::Uuid;

/// Chunk size for blob writes and reads. Matches the store's internal paging
/// and bounds per-request memory while streaming.
pub const CHUNK_SIZE_BYTES: usize = 1_048_576;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Commit failed: {0}")]
    CommitFailed(String),

    #[error("Read failed: {0}")]
    ReadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Blob not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Stream of blob content chunks.
pub type ByteStream = Pin<Box<dyn Stream<Item = StorageResult<Bytes>> + Send>>;

/// Identity assigned by the store when a write stream commits.
#[derive(Debug, Clone, Copy)]
pub struct CommittedBlob {
    pub id: Uuid,
    pub upload_date: DateTime<Utc>,
}

/// Result of a bulk purge. `Empty` is a distinct, non-fatal outcome so
/// callers can tell "nothing there" apart from "deleted N".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurgeOutcome {
    Deleted(u64),
    Empty,
}

/// An in-progress blob write. Bytes pushed through `write` are chunked at
/// [`CHUNK_SIZE_BYTES`]; `commit` makes the blob and its metadata visible
/// under a freshly assigned id.
#[async_trait]
pub trait BlobWriter: Send {
    async fn write(&mut self, chunk: &[u8]) -> StorageResult<()>;

    async fn commit(self: Box<Self>) -> StorageResult<CommittedBlob>;
}

/// Blob store abstraction.
///
/// Commit is atomic from the caller's perspective: either the full byte
/// stream plus metadata becomes visible under a new id, or nothing does.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Open a write stream for a named blob with attached metadata.
    async fn open_write(
        &self,
        storage_key: &str,
        meta: ImageMeta,
    ) -> StorageResult<Box<dyn BlobWriter>>;

    /// Fetch a committed blob's record by id.
    async fn get(&self, id: Uuid) -> StorageResult<Option<StoredImage>>;

    /// Stream a committed blob's bytes. Unknown id fails with `NotFound`.
    async fn read_stream(&self, id: Uuid) -> StorageResult<ByteStream>;

    /// Page of records ordered by upload date, most recent first.
    async fn list_page(&self, limit: i64, offset: i64) -> StorageResult<Vec<StoredImage>>;

    /// Every stored record, most recent first.
    async fn list_all(&self) -> StorageResult<Vec<StoredImage>>;

    async fn count(&self) -> StorageResult<i64>;

    /// Remove one blob (metadata and chunks).
    async fn delete(&self, id: Uuid) -> StorageResult<()>;

    /// Bulk purge: list every stored entry and remove each.
    async fn delete_all(&self) -> StorageResult<PurgeOutcome> {
        let files = self.list_all().await?;
        if files.is_empty() {
            return Ok(PurgeOutcome::Empty);
        }
        let mut deleted = 0u64;
        for file in &files {
            self.delete(file.id).await?;
            deleted += 1;
        }
        tracing::info!(deleted, "Purged all stored images");
        Ok(PurgeOutcome::Deleted(deleted))
    }
}
