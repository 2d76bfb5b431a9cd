use serde_json::json;

use crate::model::{Block, BlockId, BlockKind, Dimension, Position, Size};

/// Test helper: text block with a fixed id at (x, y), 300x100
pub fn text_block(id: &str, x: f64, y: f64) -> Block {
    Block {
        id: BlockId::from(id),
        position: Position::new(x, y),
        kind: BlockKind::Text {
            content: json!({
                "type": "doc",
                "content": [{"type": "paragraph", "content": [{"type": "text", "text": id}]}]
            }),
            size: Some(Size::px(300.0, 100.0)),
        },
    }
}

/// Test helper: image block with a fixed id at (x, y), 400 wide, auto height
pub fn image_block(id: &str, x: f64, y: f64) -> Block {
    Block {
        id: BlockId::from(id),
        position: Position::new(x, y),
        kind: BlockKind::Image {
            src: format!("https://cdn.example/public/{id}.png"),
            width: Some(Dimension::Px(400.0)),
            height: Some(Dimension::Auto),
        },
    }
}
