//! In-memory blob store for tests and local development.
//!
//! Implements the same contract as [`crate::PgBlobStore`], including
//! commit-time id/date assignment and the chunked read stream. Commit
//! failures can be injected to exercise the storage-failure path.

use crate::traits::{
    BlobStore, BlobWriter, ByteStream, CommittedBlob, StorageError, StorageResult,
    CHUNK_SIZE_BYTES,
};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use photofeed_core::models::{ImageMeta, StoredImage};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

struct Entry {
    image: StoredImage,
    bytes: Bytes,
    /// Commit order tiebreak: `Utc::now()` can collide within a test run.
    seq: u64,
}

#[derive(Clone, Default)]
pub struct MemoryBlobStore {
    entries: Arc<Mutex<Vec<Entry>>>,
    commit_seq: Arc<AtomicU64>,
    fail_commits: Arc<AtomicBool>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `commit` fail, for exercising the
    /// storage-failure path.
    pub fn fail_commits(&self, fail: bool) {
        self.fail_commits.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn open_write(
        &self,
        storage_key: &str,
        meta: ImageMeta,
    ) -> StorageResult<Box<dyn BlobWriter>> {
        Ok(Box::new(MemoryBlobWriter {
            store: self.clone(),
            storage_key: storage_key.to_string(),
            meta,
            buf: Vec::new(),
        }))
    }

    async fn get(&self, id: Uuid) -> StorageResult<Option<StoredImage>> {
        let entries = self.entries.lock().expect("store lock");
        Ok(entries
            .iter()
            .find(|e| e.image.id == id)
            .map(|e| e.image.clone()))
    }

    async fn read_stream(&self, id: Uuid) -> StorageResult<ByteStream> {
        let bytes = {
            let entries = self.entries.lock().expect("store lock");
            entries
                .iter()
                .find(|e| e.image.id == id)
                .map(|e| e.bytes.clone())
                .ok_or_else(|| StorageError::NotFound(id.to_string()))?
        };
        let chunks: Vec<StorageResult<Bytes>> = bytes
            .chunks(CHUNK_SIZE_BYTES)
            .map(|c| Ok(Bytes::copy_from_slice(c)))
            .collect();
        Ok(Box::pin(futures::stream::iter(chunks)))
    }

    async fn list_page(&self, limit: i64, offset: i64) -> StorageResult<Vec<StoredImage>> {
        let all = self.list_all().await?;
        Ok(all
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn list_all(&self) -> StorageResult<Vec<StoredImage>> {
        let entries = self.entries.lock().expect("store lock");
        let mut sorted: Vec<(u64, StoredImage)> = entries
            .iter()
            .map(|e| (e.seq, e.image.clone()))
            .collect();
        sorted.sort_by(|a, b| {
            b.1.upload_date
                .cmp(&a.1.upload_date)
                .then(b.0.cmp(&a.0))
        });
        Ok(sorted.into_iter().map(|(_, image)| image).collect())
    }

    async fn count(&self) -> StorageResult<i64> {
        let entries = self.entries.lock().expect("store lock");
        Ok(entries.len() as i64)
    }

    async fn delete(&self, id: Uuid) -> StorageResult<()> {
        let mut entries = self.entries.lock().expect("store lock");
        let before = entries.len();
        entries.retain(|e| e.image.id != id);
        if entries.len() == before {
            return Err(StorageError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

struct MemoryBlobWriter {
    store: MemoryBlobStore,
    storage_key: String,
    meta: ImageMeta,
    buf: Vec<u8>,
}

#[async_trait]
impl BlobWriter for MemoryBlobWriter {
    async fn write(&mut self, chunk: &[u8]) -> StorageResult<()> {
        self.buf.extend_from_slice(chunk);
        Ok(())
    }

    async fn commit(self: Box<Self>) -> StorageResult<CommittedBlob> {
        if self.store.fail_commits.load(Ordering::SeqCst) {
            return Err(StorageError::CommitFailed(
                "injected commit failure".to_string(),
            ));
        }
        let committed = CommittedBlob {
            id: Uuid::new_v4(),
            upload_date: Utc::now(),
        };
        let image = StoredImage {
            id: committed.id,
            storage_key: self.storage_key,
            length: self.buf.len() as i64,
            upload_date: committed.upload_date,
            meta: self.meta,
        };
        let mut entries = self.store.entries.lock().expect("store lock");
        entries.push(Entry {
            image,
            bytes: Bytes::from(self.buf),
            seq: self.store.commit_seq.fetch_add(1, Ordering::SeqCst),
        });
        Ok(committed)
    }
}
