//! Editing session for one post.
//!
//! [`CanvasController`] owns the block list, title and selection. Every
//! block change arrives through [`CanvasController::on_update`], every
//! keyboard or background event through [`CanvasController::handle_input`].
//! Network work is split into a `begin_*` step that snapshots state, an
//! async call against a backend trait, and a `finish_*` step that applies the
//! result, so the UI never holds controller state across an await.

pub mod upload;

use chrono::{DateTime, Utc};
use log::{debug, error, info};
use serde_json::Value;
use thiserror::Error;

use crate::backend::{PostStore, StoreError};
use crate::layout;
use crate::model::{self, Block, BlockId, BlockUpdate, Document, PostId, Position, Size};
use crate::navigation::{Navigation, Notice, Redirect};

pub use upload::{PickedFile, UploadJob, plan_uploads, upload_images};

/// Content of a text block added from the toolbar
pub const NEW_TEXT_PLACEHOLDER: &str = "New text block";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanvasState {
    Loading,
    Ready,
}

/// Selected block and, for text blocks, the handle of its editing engine
#[derive(Debug, Clone, PartialEq)]
pub struct Selection<H> {
    pub id: BlockId,
    pub handle: Option<H>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanvasKey {
    Delete,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanvasInput {
    Key(CanvasKey),
    /// Click that reached the canvas surface; `target_is_root` is false when
    /// it started on a child element
    BackgroundClick { target_is_root: bool },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SaveError {
    #[error("a save is already in progress")]
    InFlight,
    #[error("the post is still loading")]
    NotReady,
}

/// Snapshot of the document taken when a save starts
#[derive(Debug, Clone, PartialEq)]
pub struct SaveRequest {
    seq: u64,
    pub post_id: Option<PostId>,
    pub document: Document,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    Saved {
        id: PostId,
        notice: Notice,
        navigate: Navigation,
    },
    Failed {
        notice: Notice,
    },
    /// A newer save superseded this one; nothing to do
    Stale,
}

pub async fn load_post(store: &dyn PostStore, id: &PostId) -> Result<Document, StoreError> {
    info!("Loading post {id} for editing");
    store.fetch(id).await
}

/// Update the existing row, or insert when the post has never been saved
pub async fn save_post(store: &dyn PostStore, request: &SaveRequest) -> Result<PostId, StoreError> {
    match &request.post_id {
        Some(id) => {
            store.update(id, &request.document).await?;
            Ok(id.clone())
        }
        None => store.insert(&request.document).await,
    }
}

#[derive(Debug, Clone)]
pub struct CanvasController<H> {
    post_id: Option<PostId>,
    state: CanvasState,
    title: String,
    blocks: Vec<Block>,
    selection: Option<Selection<H>>,
    editor_focus: Option<BlockId>,
    viewport_height: f64,
    canvas_height: f64,
    uploading: bool,
    save_seq: u64,
    saving: Option<u64>,
}

impl<H> CanvasController<H> {
    /// Start a session; with an id the post must be loaded before editing
    pub fn open(post_id: Option<PostId>, viewport_height: f64) -> Self {
        let state = if post_id.is_some() {
            CanvasState::Loading
        } else {
            CanvasState::Ready
        };
        Self {
            post_id,
            state,
            title: String::new(),
            blocks: Vec::new(),
            selection: None,
            editor_focus: None,
            viewport_height,
            canvas_height: layout::canvas_height(&[], viewport_height),
            uploading: false,
            save_seq: 0,
            saving: None,
        }
    }

    pub fn post_id(&self) -> Option<&PostId> {
        self.post_id.as_ref()
    }

    pub fn state(&self) -> CanvasState {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == CanvasState::Loading
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn block(&self, id: &BlockId) -> Option<&Block> {
        self.blocks.iter().find(|block| &block.id == id)
    }

    pub fn selection(&self) -> Option<&Selection<H>> {
        self.selection.as_ref()
    }

    pub fn selected_id(&self) -> Option<&BlockId> {
        self.selection.as_ref().map(|selection| &selection.id)
    }

    pub fn is_selected(&self, id: &BlockId) -> bool {
        self.selected_id() == Some(id)
    }

    /// Engine handle of the selected text block, for the toolbar
    pub fn selected_handle(&self) -> Option<&H> {
        self.selection.as_ref()?.handle.as_ref()
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading
    }

    pub fn is_saving(&self) -> bool {
        self.saving.is_some()
    }

    /// Minimum height of the canvas surface
    pub fn canvas_height(&self) -> f64 {
        self.canvas_height
    }

    pub fn set_viewport_height(&mut self, viewport_height: f64) {
        self.viewport_height = viewport_height;
        self.relayout();
    }

    fn relayout(&mut self) {
        self.canvas_height = layout::canvas_height(&self.blocks, self.viewport_height);
    }

    /// Install a fetched post, or send the user back to the list
    pub fn finish_load(&mut self, result: Result<Document, StoreError>) -> Result<(), Redirect> {
        match result {
            Ok(document) => {
                self.title = document.title;
                self.blocks = document.blocks;
                self.selection = None;
                self.editor_focus = None;
                self.state = CanvasState::Ready;
                self.relayout();
                Ok(())
            }
            Err(err) => {
                error!("Failed to load post for editing: {err}");
                Err(Redirect {
                    notice: Notice::error("Could not load the post for editing."),
                    to: Navigation::PostList,
                })
            }
        }
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn add_text_block(&mut self) -> BlockId {
        let block = Block::new_text(
            Value::String(NEW_TEXT_PLACEHOLDER.to_string()),
            Position::new(50.0, 50.0),
            Size::px(300.0, 100.0),
        );
        let id = block.id.clone();
        debug!("Adding text block {id}");
        self.blocks.push(block);
        self.relayout();
        id
    }

    /// The single path through which blocks change.
    ///
    /// Updates for blocks that no longer exist (a debounced edit landing after
    /// a delete) are dropped.
    pub fn on_update(&mut self, id: &BlockId, update: BlockUpdate) -> bool {
        let applied = model::apply(&mut self.blocks, id, update);
        if applied {
            debug!("Updated block {id}");
            self.relayout();
        }
        applied
    }

    pub fn on_select(&mut self, id: BlockId, handle: Option<H>) {
        debug!("Selected block {id}");
        if self.editor_focus.as_ref().is_some_and(|focused| focused != &id) {
            self.editor_focus = None;
        }
        self.selection = Some(Selection { id, handle });
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
        self.editor_focus = None;
    }

    /// Returns whether the selection was cleared
    pub fn on_background_click(&mut self, target_is_root: bool) -> bool {
        if !target_is_root || self.selection.is_none() {
            return false;
        }
        debug!("Background click cleared selection");
        self.clear_selection();
        true
    }

    pub fn on_editor_focus(&mut self, id: &BlockId) {
        self.editor_focus = Some(id.clone());
    }

    pub fn on_editor_blur(&mut self, id: &BlockId) {
        if self.editor_focus.as_ref() == Some(id) {
            self.editor_focus = None;
        }
    }

    /// Whether keystrokes currently belong to the selected block's editor
    pub fn editor_has_focus(&self) -> bool {
        self.editor_focus.is_some() && self.editor_focus.as_ref() == self.selected_id()
    }

    /// Returns whether the canvas changed
    pub fn handle_input(&mut self, input: CanvasInput) -> bool {
        match input {
            CanvasInput::BackgroundClick { target_is_root } => {
                self.on_background_click(target_is_root)
            }
            // an image batch in flight holds the block list
            CanvasInput::Key(CanvasKey::Delete) if self.uploading => false,
            CanvasInput::Key(CanvasKey::Delete) => self.delete_selected(),
            CanvasInput::Key(CanvasKey::Other) => false,
        }
    }

    fn delete_selected(&mut self) -> bool {
        if self.editor_has_focus() {
            return false;
        }
        let Some(selection) = self.selection.take() else {
            return false;
        };
        self.blocks.retain(|block| block.id != selection.id);
        self.editor_focus = None;
        info!("Deleted block {}", selection.id);
        self.relayout();
        true
    }

    /// Mark an image batch as in flight. Returns false when one already is.
    pub fn begin_upload_batch(&mut self) -> bool {
        if self.uploading {
            return false;
        }
        self.uploading = true;
        true
    }

    /// Append every uploaded image at once and clear the busy flag
    pub fn finish_upload_batch(&mut self, blocks: Vec<Block>) {
        self.uploading = false;
        if blocks.is_empty() {
            return;
        }
        self.blocks.extend(blocks);
        self.relayout();
    }

    pub fn begin_save(&mut self, now: DateTime<Utc>) -> Result<SaveRequest, SaveError> {
        if self.is_loading() {
            return Err(SaveError::NotReady);
        }
        if self.saving.is_some() {
            return Err(SaveError::InFlight);
        }
        self.save_seq += 1;
        self.saving = Some(self.save_seq);
        Ok(SaveRequest {
            seq: self.save_seq,
            post_id: self.post_id.clone(),
            document: Document {
                title: self.title.clone(),
                blocks: self.blocks.clone(),
                saved_at: Some(now),
            },
        })
    }

    pub fn finish_save(
        &mut self,
        request: &SaveRequest,
        result: Result<PostId, StoreError>,
    ) -> SaveOutcome {
        if self.saving != Some(request.seq) {
            return SaveOutcome::Stale;
        }
        self.saving = None;
        match result {
            Ok(id) => {
                info!("Saved post {id}");
                self.post_id = Some(id.clone());
                SaveOutcome::Saved {
                    notice: Notice::info("Saved."),
                    navigate: Navigation::Post(id.clone()),
                    id,
                }
            }
            Err(err) => {
                error!("Failed to save post: {err}");
                SaveOutcome::Failed {
                    notice: Notice::error("Saving failed. Your changes are still here."),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::memory::{MemoryStore, StoreOp};
    use crate::model::BlockKind;
    use crate::tests::{image_block, text_block};
    use pretty_assertions::assert_eq;

    type Controller = CanvasController<&'static str>;

    fn ready_with(blocks: Vec<Block>) -> Controller {
        let mut canvas = Controller::open(Some(PostId::from("1")), 1000.0);
        canvas
            .finish_load(Ok(Document {
                title: "t".into(),
                blocks,
                saved_at: None,
            }))
            .unwrap();
        canvas
    }

    #[test]
    fn test_new_post_is_ready_and_blank() {
        let canvas = Controller::open(None, 1000.0);
        assert_eq!(canvas.state(), CanvasState::Ready);
        assert_eq!(canvas.title(), "");
        assert!(canvas.blocks().is_empty());
        assert_eq!(canvas.canvas_height(), 800.0);
    }

    #[test]
    fn test_load_failure_redirects_to_list() {
        let mut canvas = Controller::open(Some(PostId::from("4")), 1000.0);
        assert!(canvas.is_loading());

        let redirect = canvas
            .finish_load(Err(StoreError::NotFound(PostId::from("4"))))
            .unwrap_err();
        assert_eq!(redirect.to, Navigation::PostList);
        assert!(canvas.is_loading());
    }

    #[test]
    fn test_add_text_block_defaults() {
        let mut canvas = Controller::open(None, 1000.0);
        let id = canvas.add_text_block();

        let block = canvas.block(&id).unwrap();
        assert_eq!(block.position, Position::new(50.0, 50.0));
        assert_eq!(
            block.kind,
            BlockKind::Text {
                content: Value::String(NEW_TEXT_PLACEHOLDER.into()),
                size: Some(Size::px(300.0, 100.0)),
            }
        );
    }

    #[test]
    fn test_update_changes_canvas_height() {
        let mut canvas = ready_with(vec![text_block("a", 0.0, 0.0)]);
        assert_eq!(canvas.canvas_height(), 800.0);

        canvas.on_update(
            &BlockId::from("a"),
            BlockUpdate::new().with_position(Position::new(0.0, 1000.0)),
        );
        assert_eq!(canvas.canvas_height(), 1200.0);
    }

    #[test]
    fn test_update_for_deleted_block_is_dropped() {
        let mut canvas = ready_with(vec![text_block("a", 0.0, 0.0)]);
        let before = canvas.blocks().to_vec();

        assert!(!canvas.on_update(
            &BlockId::from("gone"),
            BlockUpdate::new().with_src("x")
        ));
        assert_eq!(canvas.blocks(), before.as_slice());
    }

    #[test]
    fn test_delete_removes_selected_block() {
        let mut canvas = ready_with(vec![
            text_block("a", 0.0, 0.0),
            image_block("b", 0.0, 0.0),
            text_block("c", 0.0, 0.0),
        ]);
        canvas.on_select(BlockId::from("b"), None);

        assert!(canvas.handle_input(CanvasInput::Key(CanvasKey::Delete)));

        let ids: Vec<_> = canvas.blocks().iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(canvas.selection(), None);
        assert!(!canvas.handle_input(CanvasInput::Key(CanvasKey::Delete)));
    }

    #[test]
    fn test_delete_is_suppressed_while_editor_focused() {
        let mut canvas = ready_with(vec![text_block("a", 0.0, 0.0)]);
        let id = BlockId::from("a");
        canvas.on_select(id.clone(), Some("engine-a"));
        canvas.on_editor_focus(&id);

        assert!(!canvas.handle_input(CanvasInput::Key(CanvasKey::Delete)));
        assert_eq!(canvas.blocks().len(), 1);

        canvas.on_editor_blur(&id);
        assert!(canvas.handle_input(CanvasInput::Key(CanvasKey::Delete)));
        assert!(canvas.blocks().is_empty());
    }

    #[test]
    fn test_background_click_only_on_root() {
        let mut canvas = ready_with(vec![text_block("a", 0.0, 0.0)]);
        canvas.on_select(BlockId::from("a"), Some("engine-a"));
        assert_eq!(canvas.selected_handle(), Some(&"engine-a"));

        assert!(!canvas.handle_input(CanvasInput::BackgroundClick {
            target_is_root: false
        }));
        assert!(canvas.selection().is_some());

        assert!(canvas.handle_input(CanvasInput::BackgroundClick {
            target_is_root: true
        }));
        assert_eq!(canvas.selected_handle(), None);
    }

    #[test]
    fn test_other_keys_do_nothing() {
        let mut canvas = ready_with(vec![text_block("a", 0.0, 0.0)]);
        canvas.on_select(BlockId::from("a"), None);
        assert!(!canvas.handle_input(CanvasInput::Key(CanvasKey::Other)));
        assert_eq!(canvas.blocks().len(), 1);
    }

    #[test]
    fn test_upload_batch_appends_all_at_once() {
        let mut canvas = ready_with(vec![]);
        assert!(canvas.begin_upload_batch());
        assert!(!canvas.begin_upload_batch());

        canvas.finish_upload_batch(vec![image_block("x", 0.0, 0.0), image_block("y", 0.0, 0.0)]);
        assert!(!canvas.is_uploading());
        assert_eq!(canvas.blocks().len(), 2);
    }

    #[test]
    fn test_second_save_while_in_flight_is_rejected() {
        let mut canvas = ready_with(vec![]);
        let first = canvas.begin_save(Utc::now()).unwrap();

        assert_eq!(canvas.begin_save(Utc::now()), Err(SaveError::InFlight));
        assert!(canvas.is_saving());

        let outcome = canvas.finish_save(&first, Ok(PostId::from("1")));
        assert!(matches!(outcome, SaveOutcome::Saved { .. }));
        assert!(!canvas.is_saving());
        // a late duplicate completion changes nothing
        assert_eq!(canvas.finish_save(&first, Ok(PostId::from("1"))), SaveOutcome::Stale);
    }

    #[test]
    fn test_save_refused_while_loading() {
        let mut canvas = Controller::open(Some(PostId::from("1")), 1000.0);
        assert_eq!(canvas.begin_save(Utc::now()), Err(SaveError::NotReady));
    }

    async fn save(canvas: &mut Controller, store: &MemoryStore) -> SaveOutcome {
        let request = canvas.begin_save(Utc::now()).unwrap();
        let result = save_post(store, &request).await;
        canvas.finish_save(&request, result)
    }

    #[test]
    fn test_delete_waits_for_upload_batch() {
        let mut canvas = ready_with(vec![text_block("a", 0.0, 0.0)]);
        canvas.on_select(BlockId::from("a"), None);
        assert!(canvas.begin_upload_batch());

        assert!(!canvas.handle_input(CanvasInput::Key(CanvasKey::Delete)));
        assert_eq!(canvas.blocks().len(), 1);

        canvas.finish_upload_batch(vec![]);
        assert!(canvas.handle_input(CanvasInput::Key(CanvasKey::Delete)));
        assert!(canvas.blocks().is_empty());
    }

    #[tokio::test]
    async fn test_failed_save_keeps_edits() {
        let store = MemoryStore::new();
        store.fail(StoreOp::Insert);
        let mut canvas = Controller::open(None, 1000.0);
        canvas.set_title("draft");
        canvas.add_text_block();

        let outcome = save(&mut canvas, &store).await;

        assert!(matches!(outcome, SaveOutcome::Failed { .. }));
        assert_eq!(canvas.title(), "draft");
        assert_eq!(canvas.blocks().len(), 1);
        assert_eq!(canvas.post_id(), None);
        assert!(!canvas.is_saving());
    }

    #[tokio::test]
    async fn test_save_updates_existing_post() {
        let store = MemoryStore::new();
        let id = store.insert(&Document::empty()).await.unwrap();
        let mut canvas = Controller::open(Some(id.clone()), 1000.0);
        canvas.finish_load(load_post(&store, &id).await).unwrap();
        canvas.set_title("renamed");

        let outcome = save(&mut canvas, &store).await;

        let SaveOutcome::Saved { navigate, .. } = outcome else {
            panic!("expected save to succeed");
        };
        assert_eq!(navigate, Navigation::Post(id.clone()));
        assert_eq!(store.get(&id).unwrap().title, "renamed");
        assert_eq!(store.len(), 1);
    }
}
