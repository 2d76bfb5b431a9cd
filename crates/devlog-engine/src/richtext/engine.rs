use serde_json::Value;

use crate::richtext::{EngineError, FormatCommand, FormatState, Marks, RichDoc, RichTextEngine};

/// Undo entries kept per block
const HISTORY_LIMIT: usize = 100;

/// Editing engine for one text block.
///
/// Holds the block's [`RichDoc`], a bounded undo/redo history and the focus
/// flag. A read-only engine rejects every mutation.
#[derive(Debug, Clone)]
pub struct TextEngine {
    doc: RichDoc,
    editable: bool,
    focused: bool,
    revision: u64,
    undo_stack: Vec<RichDoc>,
    redo_stack: Vec<RichDoc>,
}

impl TextEngine {
    pub fn new(content: &Value, editable: bool) -> Self {
        Self {
            doc: RichDoc::from_value(content),
            editable,
            focused: false,
            revision: 0,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        }
    }

    pub fn is_editable(&self) -> bool {
        self.editable
    }

    pub fn plain_text(&self) -> String {
        self.doc.plain_text()
    }

    pub fn to_html(&self) -> String {
        self.doc.to_html()
    }

    pub fn active_marks(&self) -> Marks {
        self.doc.marks()
    }

    /// Replace the text with `text`.
    ///
    /// Only the span that differs from the current text is rewritten, so
    /// headings, lists and per-run formatting around it survive. Returns
    /// `Ok(false)` when the text is unchanged.
    pub fn set_text(&mut self, text: &str) -> Result<bool, EngineError> {
        if !self.editable {
            return Err(EngineError::ReadOnly);
        }
        let current: Vec<char> = self.doc.plain_text().chars().collect();
        let wanted: Vec<char> = text.chars().collect();
        if current == wanted {
            return Ok(false);
        }
        let prefix = current
            .iter()
            .zip(&wanted)
            .take_while(|(a, b)| a == b)
            .count();
        let suffix = current[prefix..]
            .iter()
            .rev()
            .zip(wanted[prefix..].iter().rev())
            .take_while(|(a, b)| a == b)
            .count();
        let inserted: String = wanted[prefix..wanted.len() - suffix].iter().collect();

        let mut next = self.doc.clone();
        next.replace_range(prefix, current.len() - suffix, &inserted);
        self.commit(next);
        Ok(true)
    }

    fn commit(&mut self, next: RichDoc) {
        let previous = std::mem::replace(&mut self.doc, next);
        self.undo_stack.push(previous);
        if self.undo_stack.len() > HISTORY_LIMIT {
            self.undo_stack.remove(0);
        }
        self.redo_stack.clear();
        self.revision += 1;
    }

    fn with_doc(&mut self, change: impl FnOnce(&mut RichDoc)) {
        let mut next = self.doc.clone();
        change(&mut next);
        if next != self.doc {
            self.commit(next);
        }
    }
}

impl RichTextEngine for TextEngine {
    fn document(&self) -> Value {
        self.doc.to_value()
    }

    fn focus(&mut self) {
        self.focused = true;
    }

    fn blur(&mut self) {
        self.focused = false;
    }

    fn is_focused(&self) -> bool {
        self.focused
    }

    fn run_command(&mut self, command: FormatCommand) -> Result<(), EngineError> {
        if !self.editable {
            return Err(EngineError::ReadOnly);
        }
        let marks = self.doc.marks();
        match command {
            FormatCommand::ToggleBold => self.with_doc(|d| d.set_mark("bold", !marks.bold)),
            FormatCommand::ToggleItalic => self.with_doc(|d| d.set_mark("italic", !marks.italic)),
            FormatCommand::ToggleStrike => self.with_doc(|d| d.set_mark("strike", !marks.strike)),
            FormatCommand::ToggleUnderline => {
                self.with_doc(|d| d.set_mark("underline", !marks.underline))
            }
            FormatCommand::SetColor(color) => {
                self.with_doc(|d| d.set_text_style("color", Some(&color)))
            }
            FormatCommand::SetFontSize(size) => {
                let size = size.filter(|s| !s.is_empty());
                self.with_doc(|d| d.set_text_style("fontSize", size.as_deref()))
            }
            FormatCommand::Undo => {
                let previous = self.undo_stack.pop().ok_or(EngineError::NothingToUndo)?;
                let current = std::mem::replace(&mut self.doc, previous);
                self.redo_stack.push(current);
                self.revision += 1;
            }
            FormatCommand::Redo => {
                let next = self.redo_stack.pop().ok_or(EngineError::NothingToRedo)?;
                let current = std::mem::replace(&mut self.doc, next);
                self.undo_stack.push(current);
                self.revision += 1;
            }
        }
        Ok(())
    }

    fn revision(&self) -> u64 {
        self.revision
    }

    fn formatting(&self) -> FormatState {
        FormatState {
            marks: self.doc.marks(),
            can_undo: self.editable && !self.undo_stack.is_empty(),
            can_redo: self.editable && !self.redo_stack.is_empty(),
            focused: self.focused,
        }
    }
}
