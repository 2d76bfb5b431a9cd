use crate::model::{Block, Position};

/// Smallest width or height a resize can produce
pub const MIN_BLOCK_SIZE: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeHandle {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl ResizeHandle {
    pub const ALL: [ResizeHandle; 4] = [
        ResizeHandle::TopLeft,
        ResizeHandle::TopRight,
        ResizeHandle::BottomLeft,
        ResizeHandle::BottomRight,
    ];

    fn moves_left_edge(self) -> bool {
        matches!(self, ResizeHandle::TopLeft | ResizeHandle::BottomLeft)
    }

    fn moves_top_edge(self) -> bool {
        matches!(self, ResizeHandle::TopLeft | ResizeHandle::TopRight)
    }

    /// CSS class suffix for the handle element
    pub fn css_class(self) -> &'static str {
        match self {
            ResizeHandle::TopLeft => "top-left",
            ResizeHandle::TopRight => "top-right",
            ResizeHandle::BottomLeft => "bottom-left",
            ResizeHandle::BottomRight => "bottom-right",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureKind {
    Drag,
    Resize(ResizeHandle),
}

/// Block geometry produced by a gesture at some pointer location
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureFrame {
    pub position: Position,
    pub width: f64,
    pub height: f64,
}

impl GestureFrame {
    /// Current geometry of a block, with layout defaults for auto sizes
    pub fn of(block: &Block) -> Self {
        Self {
            position: block.position,
            width: block.effective_width(),
            height: block.effective_height(),
        }
    }
}

/// One pointer-driven drag or resize, from press to release.
///
/// Positions are clamped to the canvas origin so a block cannot be pushed
/// past the top or left edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gesture {
    pub kind: GestureKind,
    start_pointer: Position,
    start: GestureFrame,
    pointer: Position,
}

impl Gesture {
    /// Start from a block's current frame
    pub fn begin(kind: GestureKind, pointer: Position, from: GestureFrame) -> Self {
        Self::new(kind, pointer, from.position, from.width, from.height)
    }

    pub fn drag(pointer: Position, position: Position, width: f64, height: f64) -> Self {
        Self::new(GestureKind::Drag, pointer, position, width, height)
    }

    pub fn resize(
        handle: ResizeHandle,
        pointer: Position,
        position: Position,
        width: f64,
        height: f64,
    ) -> Self {
        Self::new(GestureKind::Resize(handle), pointer, position, width, height)
    }

    fn new(kind: GestureKind, pointer: Position, position: Position, width: f64, height: f64) -> Self {
        Self {
            kind,
            start_pointer: pointer,
            start: GestureFrame {
                position,
                width,
                height,
            },
            pointer,
        }
    }

    pub fn track(&mut self, pointer: Position) {
        self.pointer = pointer;
    }

    /// Whether the pointer moved at all since the press
    pub fn moved(&self) -> bool {
        self.pointer != self.start_pointer
    }

    pub fn frame(&self) -> GestureFrame {
        let dx = self.pointer.x - self.start_pointer.x;
        let dy = self.pointer.y - self.start_pointer.y;
        let start = self.start;

        match self.kind {
            GestureKind::Drag => GestureFrame {
                position: Position::new(
                    (start.position.x + dx).max(0.0),
                    (start.position.y + dy).max(0.0),
                ),
                ..start
            },
            GestureKind::Resize(handle) => {
                let mut left = start.position.x;
                let mut top = start.position.y;
                let mut right = left + start.width;
                let mut bottom = top + start.height;

                if handle.moves_left_edge() {
                    left = (left + dx).max(0.0).min(right - MIN_BLOCK_SIZE);
                } else {
                    right = (right + dx).max(left + MIN_BLOCK_SIZE);
                }
                if handle.moves_top_edge() {
                    top = (top + dy).max(0.0).min(bottom - MIN_BLOCK_SIZE);
                } else {
                    bottom = (bottom + dy).max(top + MIN_BLOCK_SIZE);
                }

                GestureFrame {
                    position: Position::new(left, top),
                    width: right - left,
                    height: bottom - top,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_drag_follows_pointer_delta() {
        let mut gesture = Gesture::drag(
            Position::new(100.0, 100.0),
            Position::new(50.0, 50.0),
            300.0,
            100.0,
        );
        gesture.track(Position::new(130.0, 90.0));

        assert_eq!(gesture.frame().position, Position::new(80.0, 40.0));
        assert_eq!(gesture.frame().width, 300.0);
        assert!(gesture.moved());
    }

    #[test]
    fn test_frame_of_auto_sized_image_uses_defaults() {
        let block = crate::tests::image_block("img", 10.0, 20.0);

        let mut gesture = Gesture::begin(
            GestureKind::Resize(ResizeHandle::BottomRight),
            Position::new(0.0, 0.0),
            GestureFrame::of(&block),
        );
        gesture.track(Position::new(10.0, 10.0));

        assert_eq!(gesture.frame().position, Position::new(10.0, 20.0));
        assert_eq!(gesture.frame().height, 310.0);
    }

    #[test]
    fn test_drag_clamps_to_canvas_origin() {
        let mut gesture = Gesture::drag(Position::new(0.0, 0.0), Position::new(10.0, 10.0), 1.0, 1.0);
        gesture.track(Position::new(-50.0, -5.0));

        assert_eq!(gesture.frame().position, Position::new(0.0, 5.0));
    }

    #[test]
    fn test_top_left_resize_moves_anchor() {
        let mut gesture = Gesture::resize(
            ResizeHandle::TopLeft,
            Position::new(50.0, 50.0),
            Position::new(50.0, 50.0),
            300.0,
            100.0,
        );
        gesture.track(Position::new(20.0, 40.0));

        assert_eq!(
            gesture.frame(),
            GestureFrame {
                position: Position::new(20.0, 40.0),
                width: 330.0,
                height: 110.0,
            }
        );
    }

    #[test]
    fn test_resize_respects_minimum_size() {
        let mut gesture = Gesture::resize(
            ResizeHandle::BottomRight,
            Position::new(350.0, 150.0),
            Position::new(50.0, 50.0),
            300.0,
            100.0,
        );
        gesture.track(Position::new(0.0, 0.0));

        let frame = gesture.frame();
        assert_eq!(frame.position, Position::new(50.0, 50.0));
        assert_eq!(frame.width, MIN_BLOCK_SIZE);
        assert_eq!(frame.height, MIN_BLOCK_SIZE);
    }

    #[test]
    fn test_untouched_gesture_has_not_moved() {
        let gesture = Gesture::resize(
            ResizeHandle::TopRight,
            Position::new(1.0, 1.0),
            Position::new(0.0, 0.0),
            80.0,
            80.0,
        );
        assert!(!gesture.moved());
        assert_eq!(gesture.frame().width, 80.0);
    }
}
