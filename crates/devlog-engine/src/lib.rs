pub mod adapters;
pub mod backend;
pub mod canvas;
pub mod debounce;
pub mod layout;
pub mod listing;
pub mod model;
pub mod navigation;
pub mod richtext;
pub mod viewer;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use adapters::{
    ClickOutcome, DragResizeAdapter, FocusReport, Gesture, GestureFrame, GestureKind, ResizeHandle,
    RichTextAdapter, SyncAction,
};
pub use backend::{ObjectStorage, Page, PageRange, PostStore, StorageError, StoreError};
pub use canvas::{
    CanvasController, CanvasInput, CanvasKey, CanvasState, PickedFile, SaveError, SaveOutcome,
    SaveRequest, Selection,
};
pub use debounce::Debouncer;
pub use listing::PostList;
pub use model::*;
pub use navigation::{Navigation, Notice, NoticeLevel, Redirect};
pub use richtext::{EngineError, FormatCommand, FormatState, Marks, RichTextEngine, TextEngine};
pub use viewer::{DeleteOutcome, PostViewer, ViewState};
