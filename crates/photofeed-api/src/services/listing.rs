//! Paginated listing over the blob store's metadata index.

use std::sync::Arc;

use photofeed_core::models::ImagePage;
use photofeed_core::AppError;
use photofeed_storage::BlobStore;

use crate::error::storage_error;

pub const PAGE_SIZE: i64 = 10;

#[derive(Clone)]
pub struct ListingService {
    store: Arc<dyn BlobStore>,
}

impl ListingService {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self { store }
    }

    /// One page of records, most recent first. Pages are 1-indexed; anything
    /// below 1 reads as page 1, and a page past the end is an empty page,
    /// not an error.
    pub async fn list_page(&self, page: i64) -> Result<ImagePage, AppError> {
        let page = page.max(1);
        let total = self.store.count().await.map_err(storage_error)?;
        let total_pages = (total + PAGE_SIZE - 1) / PAGE_SIZE;

        let entries = if page > total_pages {
            Vec::new()
        } else {
            self.store
                .list_page(PAGE_SIZE, (page - 1) * PAGE_SIZE)
                .await
                .map_err(storage_error)?
        };

        Ok(ImagePage {
            entries,
            page,
            total_pages,
        })
    }
}
