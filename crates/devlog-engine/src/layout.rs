//! Canvas sizing derived from the block list.

use crate::model::Block;

/// Layout height of a text block with no explicit height
pub const DEFAULT_TEXT_HEIGHT: f64 = 100.0;
/// Layout height of an image block with no explicit height
pub const DEFAULT_IMAGE_HEIGHT: f64 = 300.0;
/// Width of any block with no explicit width
pub const DEFAULT_BLOCK_WIDTH: f64 = 300.0;
/// Free space kept below the lowest block
pub const CANVAS_BOTTOM_PADDING: f64 = 100.0;
/// Minimum canvas height as a fraction of the viewport
pub const VIEWPORT_FRACTION: f64 = 0.8;

/// Minimum height of the canvas surface so every block fits with padding
/// below, and never less than 80% of the viewport.
pub fn canvas_height(blocks: &[Block], viewport_height: f64) -> f64 {
    let lowest = blocks.iter().map(Block::bottom).fold(0.0, f64::max);
    (viewport_height * VIEWPORT_FRACTION).max(lowest + CANVAS_BOTTOM_PADDING)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BlockId, BlockKind, Dimension, Position};
    use crate::tests::{image_block, text_block};
    use rstest::rstest;

    #[test]
    fn test_empty_canvas_uses_viewport() {
        assert_eq!(canvas_height(&[], 1000.0), 800.0);
        assert_eq!(canvas_height(&[], 50.0), 100.0);
    }

    #[test]
    fn test_canvas_grows_below_lowest_block() {
        let blocks = vec![text_block("a", 0.0, 50.0), image_block("b", 0.0, 900.0)];

        // image height is auto -> 300px default
        assert_eq!(canvas_height(&blocks, 1000.0), 900.0 + 300.0 + 100.0);
    }

    #[test]
    fn test_explicit_image_height_is_used() {
        let block = crate::model::Block {
            id: BlockId::from("img"),
            position: Position::new(0.0, 700.0),
            kind: BlockKind::Image {
                src: String::new(),
                width: None,
                height: Some(Dimension::Px(50.0)),
            },
        };

        assert_eq!(canvas_height(&[block], 1000.0), 850.0);
    }

    #[rstest]
    #[case(0.0, 400.0)]
    #[case(250.0, 1080.0)]
    #[case(5000.0, 720.0)]
    #[case(-40.0, 900.0)]
    fn test_height_lower_bounds(#[case] y: f64, #[case] viewport: f64) {
        let blocks = vec![text_block("a", 10.0, y), image_block("b", 10.0, y / 2.0)];
        let height = canvas_height(&blocks, viewport);
        let lowest = blocks.iter().map(|b| b.bottom()).fold(f64::MIN, f64::max);

        assert!(height >= viewport * VIEWPORT_FRACTION);
        assert!(height >= lowest + CANVAS_BOTTOM_PADDING);
    }
}
