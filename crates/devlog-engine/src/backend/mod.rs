//! Persistence seams: a table of posts and a bucket of uploaded images.
//!
//! [`rest::RestBackend`] talks to a hosted PostgREST/storage service;
//! [`memory::MemoryStore`] and [`memory::MemoryStorage`] keep everything in
//! process for tests and offline use.

pub mod memory;
pub mod rest;

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{Document, PostId, PostSummary};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("could not decode response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("post {0} not found")]
    NotFound(PostId),
    #[error("insert did not return an id")]
    MissingId,
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("upload request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("storage returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("upload of {0} rejected")]
    Rejected(String),
}

/// Inclusive row range, zero based
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub from: usize,
    pub to: usize,
}

impl PageRange {
    /// Rows of the 1-based `page` at `page_size` rows per page
    pub fn for_page(page: usize, page_size: usize) -> Self {
        let page = page.max(1);
        let page_size = page_size.max(1);
        Self {
            from: (page - 1) * page_size,
            to: page * page_size - 1,
        }
    }

    pub fn len(&self) -> usize {
        self.to + 1 - self.from
    }
}

/// One page of rows plus the size of the whole table
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub total: usize,
    pub rows: Vec<T>,
}

#[async_trait]
pub trait PostStore: Send + Sync {
    async fn fetch(&self, id: &PostId) -> Result<Document, StoreError>;

    /// Posts newest first by save time
    async fn fetch_page(&self, range: PageRange) -> Result<Page<PostSummary>, StoreError>;

    async fn insert(&self, document: &Document) -> Result<PostId, StoreError>;

    async fn update(&self, id: &PostId, document: &Document) -> Result<(), StoreError>;

    async fn delete(&self, id: &PostId) -> Result<(), StoreError>;
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError>;

    /// Publicly readable URL of an uploaded object
    fn public_url(&self, path: &str) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1, 10, 0, 9)]
    #[case(3, 10, 20, 29)]
    #[case(0, 10, 0, 9)]
    #[case(2, 5, 5, 9)]
    fn test_page_range(
        #[case] page: usize,
        #[case] size: usize,
        #[case] from: usize,
        #[case] to: usize,
    ) {
        let range = PageRange::for_page(page, size);
        assert_eq!(range, PageRange { from, to });
        assert_eq!(range.len(), to - from + 1);
    }
}
