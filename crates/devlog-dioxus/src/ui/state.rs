//! Shared UI state handed down through Dioxus context.

use std::collections::HashMap;

use devlog_engine::{
    BlockId, BlockUpdate, CanvasController, Gesture, GestureFrame, Navigation, Notice,
    NoticeLevel, Position, Redirect, RichTextAdapter, TextEngine,
};
use dioxus::prelude::*;
use log::{debug, error, info};

/// Selection handle for text blocks: the block's editing engine
pub type EngineHandle = Signal<TextEngine>;

pub type Canvas = CanvasController<EngineHandle>;

/// Blocking messages waiting for the user, oldest first
#[derive(Clone, Copy, PartialEq)]
pub struct NoticeQueue(Signal<Vec<Notice>>);

impl NoticeQueue {
    pub fn new() -> Self {
        Self(Signal::new(Vec::new()))
    }

    pub fn push(mut self, notice: Notice) {
        match notice.level {
            NoticeLevel::Info => info!("Notice: {}", notice.message),
            NoticeLevel::Error => error!("Notice: {}", notice.message),
        }
        self.0.write().push(notice);
    }

    pub fn current(&self) -> Option<Notice> {
        self.0.read().first().cloned()
    }

    pub fn dismiss(mut self) {
        let mut queue = self.0.write();
        if !queue.is_empty() {
            queue.remove(0);
        }
    }
}

/// Which screen is showing; pages call it instead of a router
#[derive(Clone, Copy, PartialEq)]
pub struct Navigator {
    current: Signal<Navigation>,
    notices: NoticeQueue,
}

impl Navigator {
    pub fn new(notices: NoticeQueue) -> Self {
        Self {
            current: Signal::new(Navigation::PostList),
            notices,
        }
    }

    pub fn current(&self) -> Navigation {
        self.current.read().clone()
    }

    pub fn go(mut self, to: Navigation) {
        info!("Navigating to {to}");
        self.current.set(to);
    }

    pub fn notify(self, notice: Notice) {
        self.notices.push(notice);
    }

    pub fn redirect(self, redirect: Redirect) {
        self.notify(redirect.notice);
        self.go(redirect.to);
    }
}

/// Pointer gesture in progress on the canvas.
///
/// The canvas surface owns mouse move and release so a gesture keeps
/// tracking when the pointer leaves the block it started on.
#[derive(Clone)]
pub struct ActiveGesture {
    pub block: BlockId,
    pub gesture: Gesture,
    pub on_move: Callback<GestureFrame>,
    /// `None` when the pointer never moved
    pub on_finish: Callback<Option<GestureFrame>>,
}

#[derive(Clone, Copy, PartialEq)]
pub struct GestureSlot(Signal<Option<ActiveGesture>>);

impl GestureSlot {
    pub fn new() -> Self {
        Self(Signal::new(None))
    }

    pub fn begin(mut self, active: ActiveGesture) {
        debug!("Gesture {:?} started on block {}", active.gesture.kind, active.block);
        self.0.set(Some(active));
    }

    pub fn is_active(&self) -> bool {
        self.0.read().is_some()
    }

    pub fn track(mut self, pointer: Position) {
        let active = {
            let mut slot = self.0.write();
            let Some(active) = slot.as_mut() else {
                return;
            };
            active.gesture.track(pointer);
            active.clone()
        };
        active.on_move.call(active.gesture.frame());
    }

    pub fn finish(mut self) {
        let Some(active) = std::mem::take(&mut *self.0.write()) else {
            return;
        };
        let frame = active.gesture.moved().then(|| active.gesture.frame());
        active.on_finish.call(frame);
    }
}

/// Rich-text adapters mounted on the current canvas, so pending edits can be
/// pushed into the model before a save.
#[derive(Clone, Copy, PartialEq)]
pub struct FlushRegistry(CopyValue<HashMap<BlockId, Signal<RichTextAdapter>>>);

impl FlushRegistry {
    pub fn new() -> Self {
        Self(CopyValue::new(HashMap::new()))
    }

    pub fn register(mut self, id: BlockId, adapter: Signal<RichTextAdapter>) {
        self.0.write().insert(id, adapter);
    }

    pub fn unregister(mut self, id: &BlockId) {
        self.0.write().remove(id);
    }

    pub fn flush_all(&self) -> Vec<(BlockId, BlockUpdate)> {
        self.0
            .read()
            .values()
            .filter_map(|adapter| {
                let mut adapter = *adapter;
                adapter.try_write().ok().and_then(|mut adapter| adapter.flush())
            })
            .collect()
    }
}
