use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::sync::LazyLock;

use crate::layout::{DEFAULT_BLOCK_WIDTH, DEFAULT_IMAGE_HEIGHT, DEFAULT_TEXT_HEIGHT};
use crate::model::BlockId;

static LEADING_INTEGER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([+-]?\d+)").expect("valid regex"));

/// Top-left corner of a block in canvas-local pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A block width or height: a pixel length or `"auto"`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Dimension {
    Px(f64),
    Auto,
}

impl Dimension {
    /// Pixel value, `None` for `auto`
    pub fn px(self) -> Option<f64> {
        match self {
            Dimension::Px(value) => Some(value),
            Dimension::Auto => None,
        }
    }

    pub fn to_css(self) -> String {
        match self {
            Dimension::Px(value) => format!("{value}px"),
            Dimension::Auto => "auto".to_string(),
        }
    }
}

impl Serialize for Dimension {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Dimension::Px(value) => serializer.serialize_f64(*value),
            Dimension::Auto => serializer.serialize_str("auto"),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDimension {
    Number(f64),
    Text(String),
}

impl<'de> Deserialize<'de> for Dimension {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawDimension::deserialize(deserializer)? {
            RawDimension::Number(value) => Dimension::Px(value),
            RawDimension::Text(text) => parse_dimension(&text),
        })
    }
}

/// Strings such as `"300"` or `"300px"` keep their leading integer;
/// anything unparseable is treated as `auto`.
fn parse_dimension(text: &str) -> Dimension {
    LEADING_INTEGER
        .captures(text)
        .and_then(|caps| caps[1].parse::<f64>().ok())
        .map(Dimension::Px)
        .unwrap_or(Dimension::Auto)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: Dimension,
    pub height: Dimension,
}

impl Size {
    pub fn new(width: Dimension, height: Dimension) -> Self {
        Self { width, height }
    }

    pub fn px(width: f64, height: f64) -> Self {
        Self::new(Dimension::Px(width), Dimension::Px(height))
    }
}

/// One positioned unit of content on the canvas.
///
/// Serialized in the row's `raw_elements` array as a flat object tagged by
/// `type` (`"text"` or `"image"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    pub position: Position,
    #[serde(flatten)]
    pub kind: BlockKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BlockKind {
    Text {
        /// Structured rich-text document, opaque at this level
        content: Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        size: Option<Size>,
    },
    Image {
        src: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        width: Option<Dimension>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        height: Option<Dimension>,
    },
}

impl Block {
    pub fn new_text(content: Value, position: Position, size: Size) -> Self {
        Self {
            id: BlockId::generate(),
            position,
            kind: BlockKind::Text {
                content,
                size: Some(size),
            },
        }
    }

    pub fn new_image(
        src: impl Into<String>,
        position: Position,
        width: Dimension,
        height: Dimension,
    ) -> Self {
        Self {
            id: BlockId::generate(),
            position,
            kind: BlockKind::Image {
                src: src.into(),
                width: Some(width),
                height: Some(height),
            },
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, BlockKind::Text { .. })
    }

    /// Height used for layout bounds; absent or `auto` heights fall back to
    /// the per-kind default.
    pub fn effective_height(&self) -> f64 {
        match &self.kind {
            BlockKind::Text { size, .. } => size
                .and_then(|size| size.height.px())
                .unwrap_or(DEFAULT_TEXT_HEIGHT),
            BlockKind::Image { height, .. } => height
                .and_then(|height| height.px())
                .unwrap_or(DEFAULT_IMAGE_HEIGHT),
        }
    }

    pub fn effective_width(&self) -> f64 {
        let width = match &self.kind {
            BlockKind::Text { size, .. } => size.map(|size| size.width),
            BlockKind::Image { width, .. } => *width,
        };
        width
            .and_then(|width| width.px())
            .unwrap_or(DEFAULT_BLOCK_WIDTH)
    }

    /// Lowest y coordinate covered by this block
    pub fn bottom(&self) -> f64 {
        self.position.y + self.effective_height()
    }

    /// Stacking order: insertion order within a kind, selection on top
    pub fn z_index(&self, selected: bool) -> u32 {
        match (selected, &self.kind) {
            (true, _) => 100,
            (false, BlockKind::Text { .. }) => 1,
            (false, BlockKind::Image { .. }) => 10,
        }
    }
}
