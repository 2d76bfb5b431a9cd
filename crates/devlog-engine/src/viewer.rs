//! Read-only display of one post, with edit and delete actions.

use log::{error, info};

use crate::backend::{PostStore, StoreError};
use crate::model::{Document, PostId};
use crate::navigation::{Navigation, Notice, Redirect};

pub const DELETE_PROMPT: &str = "Delete this post? This cannot be undone.";

#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    Loading,
    Loaded(Document),
    /// Fetched, but with neither a title nor any blocks
    NotFound,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeleteOutcome {
    Deleted(Redirect),
    Failed(Notice),
    /// Delete was not confirmed first, or one is already running
    Ignored,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PostViewer {
    id: PostId,
    state: ViewState,
    confirming: bool,
    deleting: bool,
}

impl PostViewer {
    pub fn new(id: PostId) -> Self {
        Self {
            id,
            state: ViewState::Loading,
            confirming: false,
            deleting: false,
        }
    }

    pub fn id(&self) -> &PostId {
        &self.id
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn document(&self) -> Option<&Document> {
        match &self.state {
            ViewState::Loaded(document) => Some(document),
            _ => None,
        }
    }

    pub fn finish_load(&mut self, result: Result<Document, StoreError>) -> Result<(), Redirect> {
        match result {
            Ok(document) if document.is_blank() => {
                self.state = ViewState::NotFound;
                Ok(())
            }
            Ok(document) => {
                self.state = ViewState::Loaded(document);
                Ok(())
            }
            Err(err) => {
                error!("Failed to load post {}: {err}", self.id);
                Err(Redirect {
                    notice: Notice::error("Could not load the post."),
                    to: Navigation::PostList,
                })
            }
        }
    }

    pub async fn load(&mut self, store: &dyn PostStore) -> Result<(), Redirect> {
        info!("Viewing post {}", self.id);
        let result = store.fetch(&self.id).await;
        self.finish_load(result)
    }

    pub fn edit_target(&self) -> Navigation {
        Navigation::Edit(self.id.clone())
    }

    /// Ask for confirmation before deleting; returns the question to show
    pub fn request_delete(&mut self) -> &'static str {
        self.confirming = true;
        DELETE_PROMPT
    }

    pub fn is_confirming(&self) -> bool {
        self.confirming
    }

    pub fn is_deleting(&self) -> bool {
        self.deleting
    }

    pub fn cancel_delete(&mut self) {
        self.confirming = false;
    }

    /// Confirmation given. Returns false when there was nothing to confirm.
    pub fn begin_delete(&mut self) -> bool {
        if !self.confirming || self.deleting {
            return false;
        }
        self.confirming = false;
        self.deleting = true;
        true
    }

    pub fn finish_delete(&mut self, result: Result<(), StoreError>) -> DeleteOutcome {
        self.deleting = false;
        match result {
            Ok(()) => {
                info!("Deleted post {}", self.id);
                DeleteOutcome::Deleted(Redirect {
                    notice: Notice::info("The post was deleted."),
                    to: Navigation::PostList,
                })
            }
            Err(err) => {
                error!("Failed to delete post {}: {err}", self.id);
                DeleteOutcome::Failed(Notice::error(format!("Deleting the post failed: {err}")))
            }
        }
    }

    pub async fn confirm_delete(&mut self, store: &dyn PostStore) -> DeleteOutcome {
        if !self.begin_delete() {
            return DeleteOutcome::Ignored;
        }
        let result = store.delete(&self.id).await;
        self.finish_delete(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::memory::{MemoryStore, StoreOp};
    use crate::tests::text_block;
    use pretty_assertions::assert_eq;

    async fn stored(store: &MemoryStore, title: &str) -> PostId {
        store
            .insert(&Document {
                title: title.into(),
                blocks: vec![text_block("a", 0.0, 0.0)],
                saved_at: None,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_loads_document() {
        let store = MemoryStore::new();
        let id = stored(&store, "hello").await;
        let mut viewer = PostViewer::new(id.clone());

        viewer.load(&store).await.unwrap();

        assert_eq!(viewer.document().unwrap().title, "hello");
        assert_eq!(viewer.edit_target(), Navigation::Edit(id));
    }

    #[tokio::test]
    async fn test_missing_post_redirects_to_list() {
        let store = MemoryStore::new();
        let mut viewer = PostViewer::new(PostId::from("404"));

        let redirect = viewer.load(&store).await.unwrap_err();
        assert_eq!(redirect.to, Navigation::PostList);
    }

    #[test]
    fn test_blank_post_is_not_found() {
        let mut viewer = PostViewer::new(PostId::from("1"));
        viewer.finish_load(Ok(Document::empty())).unwrap();
        assert_eq!(viewer.state(), &ViewState::NotFound);
    }

    #[tokio::test]
    async fn test_delete_needs_confirmation() {
        let store = MemoryStore::new();
        let id = stored(&store, "x").await;
        let mut viewer = PostViewer::new(id);

        assert_eq!(viewer.confirm_delete(&store).await, DeleteOutcome::Ignored);
        assert_eq!(store.len(), 1);

        viewer.request_delete();
        viewer.cancel_delete();
        assert_eq!(viewer.confirm_delete(&store).await, DeleteOutcome::Ignored);

        assert_eq!(viewer.request_delete(), DELETE_PROMPT);
        let outcome = viewer.confirm_delete(&store).await;
        assert!(matches!(
            outcome,
            DeleteOutcome::Deleted(Redirect {
                to: Navigation::PostList,
                ..
            })
        ));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_failed_delete_stays() {
        let store = MemoryStore::new();
        let id = stored(&store, "x").await;
        store.fail(StoreOp::Delete);
        let mut viewer = PostViewer::new(id);

        viewer.request_delete();
        assert!(matches!(
            viewer.confirm_delete(&store).await,
            DeleteOutcome::Failed(_)
        ));
        assert!(!viewer.is_deleting());
        assert_eq!(store.len(), 1);
    }
}
