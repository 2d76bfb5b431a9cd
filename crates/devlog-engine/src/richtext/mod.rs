//! Rich-text editing engine seam.
//!
//! The canvas treats a text block's content as an opaque JSON document. The
//! adapter and the formatting toolbar talk to whatever edits that document
//! through [`RichTextEngine`] only; [`TextEngine`] is the implementation
//! shipped with the app.

pub mod doc;
pub mod engine;

pub use doc::{Marks, RichDoc};
pub use engine::TextEngine;

use serde_json::Value;
use thiserror::Error;

/// Font sizes offered by the toolbar
pub const FONT_SIZES: [&str; 7] = ["12px", "14px", "16px", "18px", "20px", "24px", "30px"];

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    #[error("editor is read-only")]
    ReadOnly,
    #[error("nothing to undo")]
    NothingToUndo,
    #[error("nothing to redo")]
    NothingToRedo,
}

/// Formatting command issued by the toolbar
#[derive(Debug, Clone, PartialEq)]
pub enum FormatCommand {
    ToggleBold,
    ToggleItalic,
    ToggleStrike,
    ToggleUnderline,
    SetColor(String),
    /// `None` clears the size back to the default
    SetFontSize(Option<String>),
    Undo,
    Redo,
}

/// What the toolbar needs to draw its controls
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormatState {
    pub marks: Marks,
    pub can_undo: bool,
    pub can_redo: bool,
    pub focused: bool,
}

/// Capability handed across the select/update boundary for one text block
pub trait RichTextEngine {
    /// Current document as JSON
    fn document(&self) -> Value;

    fn focus(&mut self);

    fn blur(&mut self);

    fn is_focused(&self) -> bool;

    fn run_command(&mut self, command: FormatCommand) -> Result<(), EngineError>;

    /// Incremented on every content change; observers compare revisions to
    /// detect change events.
    fn revision(&self) -> u64;

    fn formatting(&self) -> FormatState;
}
