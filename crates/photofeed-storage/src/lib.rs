//! Chunked blob storage for image bytes plus attached metadata.
//!
//! The [`BlobStore`] trait is the only surface the rest of the system sees:
//! open a write stream for a named blob, push bytes, and commit — at which
//! point the store assigns the blob id and upload date atomically. Two
//! backends exist: [`PgBlobStore`] (Postgres, production) and
//! [`MemoryBlobStore`] (tests and local development).

pub mod memory;
pub mod pg;
pub mod traits;

pub use memory::MemoryBlobStore;
pub use pg::PgBlobStore;
pub use traits::{
    BlobStore, BlobWriter, ByteStream, CommittedBlob, PurgeOutcome, StorageError,
    StorageResult, CHUNK_SIZE_BYTES,
};
