//! Per-block adapters between interaction surfaces and the block model.
//!
//! Each rendered block owns a [`DragResizeAdapter`]; text blocks also own a
//! [`RichTextAdapter`]. Adapters never mutate blocks themselves: they return
//! [`BlockUpdate`](crate::model::BlockUpdate)s for the canvas controller's
//! single update path.

pub mod drag;
pub mod gesture;
pub mod text;

pub use drag::{ClickOutcome, DragResizeAdapter};
pub use gesture::{Gesture, GestureFrame, GestureKind, ResizeHandle};
pub use text::{FocusReport, PendingContent, RichTextAdapter, SyncAction};
