use serde_json::Value;

use crate::model::{Block, BlockId, BlockKind, Dimension, Position, Size};

/// Per-axis position change; `None` leaves that axis untouched
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PositionUpdate {
    pub x: Option<f64>,
    pub y: Option<f64>,
}

impl From<Position> for PositionUpdate {
    fn from(position: Position) -> Self {
        Self {
            x: Some(position.x),
            y: Some(position.y),
        }
    }
}

/// Partial update for a single block. Unset fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockUpdate {
    pub position: Option<PositionUpdate>,
    pub width: Option<Dimension>,
    pub height: Option<Dimension>,
    pub src: Option<String>,
    pub content: Option<Value>,
}

impl BlockUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_position(mut self, position: impl Into<PositionUpdate>) -> Self {
        self.position = Some(position.into());
        self
    }

    pub fn with_size(mut self, size: Size) -> Self {
        self.width = Some(size.width);
        self.height = Some(size.height);
        self
    }

    pub fn with_src(mut self, src: impl Into<String>) -> Self {
        self.src = Some(src.into());
        self
    }

    pub fn with_content(mut self, content: Value) -> Self {
        self.content = Some(content);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl Block {
    /// Merge `update` into this block.
    ///
    /// Width/height land in `size` for text blocks and in the top-level
    /// fields for images. `src` only applies to images and `content` only to
    /// text.
    pub fn apply_update(&mut self, update: BlockUpdate) {
        if let Some(position) = update.position {
            if let Some(x) = position.x {
                self.position.x = x;
            }
            if let Some(y) = position.y {
                self.position.y = y;
            }
        }

        match &mut self.kind {
            BlockKind::Text { content, size } => {
                if update.width.is_some() || update.height.is_some() {
                    let current = size.unwrap_or(Size::new(Dimension::Auto, Dimension::Auto));
                    *size = Some(Size::new(
                        update.width.unwrap_or(current.width),
                        update.height.unwrap_or(current.height),
                    ));
                }
                if let Some(new_content) = update.content {
                    *content = new_content;
                }
            }
            BlockKind::Image { src, width, height } => {
                if let Some(new_width) = update.width {
                    *width = Some(new_width);
                }
                if let Some(new_height) = update.height {
                    *height = Some(new_height);
                }
                if let Some(new_src) = update.src {
                    *src = new_src;
                }
            }
        }
    }
}

/// Apply `update` to the block with `id`.
///
/// Returns `false` without touching anything when no block has that id.
/// Block order is never changed.
pub fn apply(blocks: &mut [Block], id: &BlockId, update: BlockUpdate) -> bool {
    match blocks.iter_mut().find(|block| &block.id == id) {
        Some(block) => {
            block.apply_update(update);
            true
        }
        None => false,
    }
}
