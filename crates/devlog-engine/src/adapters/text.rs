use std::time::{Duration, Instant};

use log::debug;
use serde_json::Value;

use crate::debounce::Debouncer;
use crate::model::{BlockId, BlockUpdate, Dimension, Position, Size};
use crate::richtext::RichTextEngine;

/// Reported upward when a text block's editor gains focus through the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusReport {
    pub id: BlockId,
}

/// What a selection change asked the editor to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    None,
    Focus,
    Blur,
}

/// Snapshot of a text block waiting in the debouncer
#[derive(Debug, Clone, PartialEq)]
pub struct PendingContent {
    pub id: BlockId,
    /// `None` until the first content edit; geometry commits alone
    pub content: Option<Value>,
    pub position: Position,
    pub size: Option<Size>,
}

impl PendingContent {
    pub fn into_update(self) -> (BlockId, BlockUpdate) {
        let mut update = BlockUpdate::new().with_position(self.position);
        if let Some(content) = self.content {
            update = update.with_content(content);
        }
        if let Some(size) = self.size {
            update = update.with_size(size);
        }
        (self.id, update)
    }
}

/// Bridges one text block's editing engine to the block model.
///
/// Content changes, drags and resizes all go through one trailing-edge
/// debouncer, so a burst of keystrokes becomes a single update. Focus is
/// tracked locally and compared against selection; programmatic focus or
/// blur updates the local flag first so the echoed DOM event is a no-op.
#[derive(Debug)]
pub struct RichTextAdapter {
    id: BlockId,
    editable: bool,
    focused: bool,
    position: Position,
    size: Option<Size>,
    content: Option<Value>,
    seen_revision: u64,
    debouncer: Debouncer<PendingContent>,
}

impl RichTextAdapter {
    pub fn new(
        id: BlockId,
        editable: bool,
        position: Position,
        size: Option<Size>,
        delay: Duration,
    ) -> Self {
        Self {
            id,
            editable,
            focused: false,
            position,
            size,
            content: None,
            seen_revision: 0,
            debouncer: Debouncer::new(delay),
        }
    }

    pub fn id(&self) -> &BlockId {
        &self.id
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Dragging a text block is locked while its editor has focus
    pub fn drag_enabled(&self) -> bool {
        self.editable && !self.focused
    }

    /// Engine content changed. Returns whether an update was queued.
    pub fn on_change<E: RichTextEngine>(&mut self, engine: &E, now: Instant) -> bool {
        if !self.editable || engine.revision() == self.seen_revision {
            return false;
        }
        self.seen_revision = engine.revision();
        self.content = Some(engine.document());
        self.queue(now);
        true
    }

    pub fn on_drag_stop(&mut self, position: Position, now: Instant) {
        if !self.drag_enabled() {
            return;
        }
        self.position = position;
        self.queue(now);
    }

    pub fn on_resize_stop(&mut self, width: f64, height: f64, position: Position, now: Instant) {
        if !self.editable {
            return;
        }
        self.position = position;
        self.size = Some(Size::new(Dimension::Px(width), Dimension::Px(height)));
        self.queue(now);
    }

    fn queue(&mut self, now: Instant) {
        self.debouncer.call(
            PendingContent {
                id: self.id.clone(),
                content: self.content.clone(),
                position: self.position,
                size: self.size,
            },
            now,
        );
    }

    /// Coalesced update once the quiet period has passed
    pub fn poll(&mut self, now: Instant) -> Option<(BlockId, BlockUpdate)> {
        self.debouncer.poll(now).map(Self::release)
    }

    /// Pending update right away, for teardown and before saving
    pub fn flush(&mut self) -> Option<(BlockId, BlockUpdate)> {
        self.debouncer.flush().map(Self::release)
    }

    fn release(pending: PendingContent) -> (BlockId, BlockUpdate) {
        let (id, update) = pending.into_update();
        debug!("Committing text block {id}");
        (id, update)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// DOM focus arrived. Reports upward only for a user-initiated focus on
    /// an editable block.
    pub fn on_focus<E: RichTextEngine>(&mut self, engine: &mut E) -> Option<FocusReport> {
        if self.focused {
            return None;
        }
        self.focused = true;
        engine.focus();
        self.editable.then(|| FocusReport {
            id: self.id.clone(),
        })
    }

    /// DOM blur arrived. Clears focus only; selection is left alone.
    pub fn on_blur<E: RichTextEngine>(&mut self, engine: &mut E) {
        self.focused = false;
        engine.blur();
    }

    /// Bring editor focus in line with the canvas selection
    pub fn sync_selection<E: RichTextEngine>(&mut self, selected: bool, engine: &mut E) -> SyncAction {
        if selected && self.editable && !self.focused {
            self.focused = true;
            engine.focus();
            SyncAction::Focus
        } else if !selected && self.focused {
            self.focused = false;
            engine.blur();
            SyncAction::Blur
        } else {
            SyncAction::None
        }
    }

    /// Adopt externally changed geometry without queueing anything
    pub fn sync_geometry(&mut self, position: Position, size: Option<Size>) {
        self.position = position;
        self.size = size;
    }
}
