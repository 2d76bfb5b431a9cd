//! Paginated list of saved posts, newest first.

use log::{error, info};

use crate::backend::{Page, PageRange, PostStore, StoreError};
use crate::model::PostSummary;
use crate::navigation::{Navigation, Notice};

/// Rows shown per page unless configured otherwise
pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct PostList {
    page_size: usize,
    page: usize,
    total: usize,
    rows: Vec<PostSummary>,
    loading: bool,
}

impl Default for PostList {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl PostList {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            page: 1,
            total: 0,
            rows: Vec::new(),
            loading: false,
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn rows(&self) -> &[PostSummary] {
        &self.rows
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn total_pages(&self) -> usize {
        self.total.div_ceil(self.page_size)
    }

    /// Every page number, for the page buttons
    pub fn pages(&self) -> std::ops::RangeInclusive<usize> {
        1..=self.total_pages()
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    /// Move to `page` if it exists. The caller loads it afterwards.
    pub fn go_to(&mut self, page: usize) -> bool {
        if page < 1 || page > self.total_pages() {
            return false;
        }
        self.page = page;
        true
    }

    pub fn previous(&mut self) -> bool {
        self.page > 1 && self.go_to(self.page - 1)
    }

    pub fn next(&mut self) -> bool {
        self.go_to(self.page + 1)
    }

    /// Rows of the current page
    pub fn begin_load(&mut self) -> PageRange {
        self.loading = true;
        PageRange::for_page(self.page, self.page_size)
    }

    pub fn finish_load(&mut self, result: Result<Page<PostSummary>, StoreError>) -> Option<Notice> {
        self.loading = false;
        match result {
            Ok(page) => {
                info!("Listed {} of {} posts", page.rows.len(), page.total);
                self.total = page.total;
                self.rows = page.rows;
                None
            }
            Err(err) => {
                error!("Failed to list posts: {err}");
                self.rows.clear();
                Some(Notice::error("Could not load the post list."))
            }
        }
    }

    pub async fn load_page(&mut self, store: &dyn PostStore, page: usize) -> Option<Notice> {
        self.page = page.max(1);
        let range = self.begin_load();
        let result = store.fetch_page(range).await;
        self.finish_load(result)
    }

    pub fn open(&self, row: &PostSummary) -> Navigation {
        Navigation::Post(row.id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::memory::{MemoryStore, StoreOp};
    use crate::model::{Document, PostId};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn with_total(total: usize) -> PostList {
        let mut list = PostList::new(10);
        list.finish_load(Ok(Page {
            total,
            rows: Vec::new(),
        }));
        list
    }

    #[rstest]
    #[case(0, 0)]
    #[case(1, 1)]
    #[case(10, 1)]
    #[case(11, 2)]
    #[case(25, 3)]
    fn test_total_pages(#[case] total: usize, #[case] pages: usize) {
        assert_eq!(with_total(total).total_pages(), pages);
    }

    #[test]
    fn test_go_to_rejects_out_of_range() {
        let mut list = with_total(25);

        assert!(!list.go_to(0));
        assert!(!list.go_to(4));
        assert_eq!(list.page(), 1);
        assert!(list.go_to(3));
        assert!(!list.has_next());
        assert!(!list.next());
        assert!(list.previous());
        assert_eq!(list.page(), 2);
    }

    #[test]
    fn test_empty_list_has_no_pages() {
        let mut list = with_total(0);
        assert!(list.pages().is_empty());
        assert!(!list.has_previous());
        assert!(!list.go_to(1));
    }

    #[tokio::test]
    async fn test_failure_leaves_list_empty_with_notice() {
        let store = MemoryStore::new();
        store.insert(&Document::empty()).await.unwrap();
        let mut list = PostList::new(10);
        assert_eq!(list.load_page(&store, 1).await, None);
        assert_eq!(list.rows().len(), 1);

        store.fail(StoreOp::FetchPage);
        let notice = list.load_page(&store, 1).await;

        assert!(notice.is_some());
        assert!(list.rows().is_empty());
        assert!(!list.is_loading());
    }

    #[test]
    fn test_rows_open_their_post() {
        let list = PostList::default();
        let row = PostSummary {
            id: PostId::from("12"),
            title: "hello".into(),
            saved_at: None,
        };
        assert_eq!(list.open(&row), Navigation::Post(PostId::from("12")));
    }
}
