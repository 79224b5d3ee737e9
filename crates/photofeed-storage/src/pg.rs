//! Postgres-backed chunked blob store.
//!
//! Bytes land in `image_chunks` as fixed-size rows keyed by `(file_id, seq)`;
//! the `image_files` row carrying length and metadata is inserted last, and
//! the whole write happens inside one transaction. Readers only ever see
//! fully committed blobs, and a writer dropped mid-stream rolls back without
//! a trace.

use crate::traits::{
    BlobStore, BlobWriter, ByteStream, CommittedBlob, StorageError, StorageResult,
    CHUNK_SIZE_BYTES,
};
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use chrono::{DateTime, Utc};
use photofeed_core::models::{ImageMeta, StoredImage};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

/// Row type for the image_files table.
#[derive(Debug, sqlx::FromRow)]
struct ImageFileRow {
    id: Uuid,
    storage_key: String,
    length: i64,
    upload_date: DateTime<Utc>,
    metadata: serde_json::Value,
}

impl ImageFileRow {
    fn to_stored_image(self) -> StorageResult<StoredImage> {
        let meta: ImageMeta = serde_json::from_value(self.metadata).map_err(|e| {
            StorageError::Backend(format!("Malformed metadata for blob {}: {}", self.id, e))
        })?;
        Ok(StoredImage {
            id: self.id,
            storage_key: self.storage_key,
            length: self.length,
            upload_date: self.upload_date,
            meta,
        })
    }
}

const SELECT_FILE: &str =
    "SELECT id, storage_key, length, upload_date, metadata FROM image_files";

/// Postgres chunked blob store. Constructed explicitly from a connected pool
/// and injected into the services that need it.
#[derive(Clone)]
pub struct PgBlobStore {
    pool: PgPool,
}

impl PgBlobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BlobStore for PgBlobStore {
    async fn open_write(
        &self,
        storage_key: &str,
        meta: ImageMeta,
    ) -> StorageResult<Box<dyn BlobWriter>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgBlobWriter {
            tx,
            file_id: Uuid::new_v4(),
            storage_key: storage_key.to_string(),
            meta,
            buf: BytesMut::with_capacity(CHUNK_SIZE_BYTES),
            next_seq: 0,
            written: 0,
        }))
    }

    async fn get(&self, id: Uuid) -> StorageResult<Option<StoredImage>> {
        let row: Option<ImageFileRow> =
            sqlx::query_as(&format!("{} WHERE id = $1", SELECT_FILE))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        row.map(ImageFileRow::to_stored_image).transpose()
    }

    async fn read_stream(&self, id: Uuid) -> StorageResult<ByteStream> {
        if self.get(id).await?.is_none() {
            return Err(StorageError::NotFound(id.to_string()));
        }

        // One query per chunk keeps the stream owned and bounds memory to a
        // single chunk regardless of blob size.
        let pool = self.pool.clone();
        let stream = futures::stream::try_unfold((pool, id, 0i32), |(pool, id, seq)| async move {
            let data: Option<Vec<u8>> = sqlx::query_scalar(
                "SELECT data FROM image_chunks WHERE file_id = $1 AND seq = $2",
            )
            .bind(id)
            .bind(seq)
            .fetch_optional(&pool)
            .await?;
            Ok(data.map(|bytes| (Bytes::from(bytes), (pool, id, seq + 1))))
        });
        Ok(Box::pin(stream))
    }

    async fn list_page(&self, limit: i64, offset: i64) -> StorageResult<Vec<StoredImage>> {
        let rows: Vec<ImageFileRow> = sqlx::query_as(&format!(
            "{} ORDER BY upload_date DESC, id DESC LIMIT $1 OFFSET $2",
            SELECT_FILE
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter()
            .map(ImageFileRow::to_stored_image)
            .collect()
    }

    async fn list_all(&self) -> StorageResult<Vec<StoredImage>> {
        let rows: Vec<ImageFileRow> = sqlx::query_as(&format!(
            "{} ORDER BY upload_date DESC, id DESC",
            SELECT_FILE
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter()
            .map(ImageFileRow::to_stored_image)
            .collect()
    }

    async fn count(&self) -> StorageResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM image_files")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn delete(&self, id: Uuid) -> StorageResult<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM image_chunks WHERE file_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM image_files WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(id.to_string()));
        }
        tx.commit().await?;
        Ok(())
    }
}

/// Write stream over an open transaction. Chunks flush as they fill; the
/// file row is inserted at commit so the blob id only ever refers to a
/// complete byte stream.
struct PgBlobWriter {
    tx: Transaction<'static, Postgres>,
    file_id: Uuid,
    storage_key: String,
    meta: ImageMeta,
    buf: BytesMut,
    next_seq: i32,
    written: i64,
}

impl PgBlobWriter {
    async fn flush_chunk(&mut self, data: Bytes) -> StorageResult<()> {
        sqlx::query("INSERT INTO image_chunks (file_id, seq, data) VALUES ($1, $2, $3)")
            .bind(self.file_id)
            .bind(self.next_seq)
            .bind(data.to_vec())
            .execute(&mut *self.tx)
            .await
            .map_err(|e| StorageError::WriteFailed(format!("chunk {}: {}", self.next_seq, e)))?;
        self.next_seq += 1;
        Ok(())
    }
}

#[async_trait]
impl BlobWriter for PgBlobWriter {
    async fn write(&mut self, chunk: &[u8]) -> StorageResult<()> {
        self.buf.extend_from_slice(chunk);
        self.written += chunk.len() as i64;
        while self.buf.len() >= CHUNK_SIZE_BYTES {
            let data = self.buf.split_to(CHUNK_SIZE_BYTES).freeze();
            self.flush_chunk(data).await?;
        }
        Ok(())
    }

    async fn commit(mut self: Box<Self>) -> StorageResult<CommittedBlob> {
        if !self.buf.is_empty() {
            let data = self.buf.split().freeze();
            self.flush_chunk(data).await?;
        }

        let metadata = serde_json::to_value(&self.meta)
            .map_err(|e| StorageError::CommitFailed(format!("metadata encoding: {}", e)))?;

        let upload_date: DateTime<Utc> = sqlx::query_scalar(
            r#"
            INSERT INTO image_files (id, storage_key, length, chunk_size, metadata)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING upload_date
            "#,
        )
        .bind(self.file_id)
        .bind(&self.storage_key)
        .bind(self.written)
        .bind(CHUNK_SIZE_BYTES as i32)
        .bind(metadata)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| StorageError::CommitFailed(e.to_string()))?;

        self.tx
            .commit()
            .await
            .map_err(|e| StorageError::CommitFailed(e.to_string()))?;

        tracing::info!(
            blob_id = %self.file_id,
            storage_key = %self.storage_key,
            size_bytes = self.written,
            chunks = self.next_seq,
            "Blob committed"
        );

        Ok(CommittedBlob {
            id: self.file_id,
            upload_date,
        })
    }
}
