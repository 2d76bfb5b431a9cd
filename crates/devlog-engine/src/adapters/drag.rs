use crate::model::{BlockId, BlockUpdate, Dimension, Position, Size};

/// Result of a click on a block
#[derive(Debug, Clone, PartialEq)]
pub struct ClickOutcome {
    /// Always set: a block click must never reach the canvas background
    pub stop_propagation: bool,
    /// Block to select, only for editable blocks
    pub select: Option<BlockId>,
}

/// Tracks the on-screen position of one block while it is dragged or
/// resized, and turns terminal interaction results into block updates.
///
/// Pointer motion only moves the local position so the element follows the
/// pointer; the block model hears about it at drag-stop or resize-stop.
#[derive(Debug, Clone, PartialEq)]
pub struct DragResizeAdapter {
    id: BlockId,
    editable: bool,
    position: Position,
    dragging: bool,
    drag_locked: bool,
}

impl DragResizeAdapter {
    pub fn new(id: BlockId, position: Position, editable: bool) -> Self {
        Self {
            id,
            editable,
            position,
            dragging: false,
            drag_locked: false,
        }
    }

    pub fn id(&self) -> &BlockId {
        &self.id
    }

    /// Position to draw the block at right now
    pub fn position(&self) -> Position {
        self.position
    }

    pub fn is_editable(&self) -> bool {
        self.editable
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Text blocks lock dragging while their editor has input focus
    pub fn set_drag_locked(&mut self, locked: bool) {
        self.drag_locked = locked;
    }

    pub fn drag_enabled(&self) -> bool {
        self.editable && !self.drag_locked
    }

    pub fn resize_enabled(&self) -> bool {
        self.editable
    }

    /// Pointer moved during a drag: visual only
    pub fn on_drag(&mut self, position: Position) {
        if !self.drag_enabled() {
            return;
        }
        self.dragging = true;
        self.position = position;
    }

    pub fn on_drag_stop(&mut self, position: Position) -> Option<BlockUpdate> {
        self.dragging = false;
        if !self.drag_enabled() {
            return None;
        }
        self.position = position;
        Some(BlockUpdate::new().with_position(position))
    }

    /// Final size in pixels plus the post-resize anchor, which moves when a
    /// top or left edge was dragged
    pub fn on_resize_stop(
        &mut self,
        width: f64,
        height: f64,
        position: Position,
    ) -> Option<BlockUpdate> {
        if !self.resize_enabled() {
            return None;
        }
        self.position = position;
        Some(
            BlockUpdate::new()
                .with_position(position)
                .with_size(Size::new(Dimension::Px(width), Dimension::Px(height))),
        )
    }

    /// Adopt an externally changed position (reload, undo).
    ///
    /// Never produces an update, so a prop change cannot echo back into the
    /// model. Returns whether the local position changed.
    pub fn sync_position(&mut self, position: Position) -> bool {
        if self.dragging || self.position == position {
            return false;
        }
        self.position = position;
        true
    }

    pub fn on_click(&self) -> ClickOutcome {
        ClickOutcome {
            stop_propagation: true,
            select: self.editable.then(|| self.id.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn adapter(editable: bool) -> DragResizeAdapter {
        DragResizeAdapter::new(BlockId::from("b"), Position::new(50.0, 50.0), editable)
    }

    #[test]
    fn test_drag_motion_stays_local_until_stop() {
        let mut adapter = adapter(true);

        adapter.on_drag(Position::new(60.0, 70.0));
        adapter.on_drag(Position::new(80.0, 90.0));
        assert_eq!(adapter.position(), Position::new(80.0, 90.0));
        assert!(adapter.is_dragging());

        let update = adapter.on_drag_stop(Position::new(85.0, 95.0));
        assert_eq!(
            update,
            Some(BlockUpdate::new().with_position(Position::new(85.0, 95.0)))
        );
        assert!(!adapter.is_dragging());
    }

    #[test]
    fn test_resize_commits_size_and_anchor() {
        let mut adapter = adapter(true);

        let update = adapter
            .on_resize_stop(320.0, 140.0, Position::new(30.0, 50.0))
            .unwrap();

        assert_eq!(update.width, Some(Dimension::Px(320.0)));
        assert_eq!(update.height, Some(Dimension::Px(140.0)));
        assert_eq!(update.position, Some(Position::new(30.0, 50.0).into()));
        assert_eq!(adapter.position(), Position::new(30.0, 50.0));
    }

    #[test]
    fn test_read_only_block_emits_nothing() {
        let mut adapter = adapter(false);

        adapter.on_drag(Position::new(1.0, 1.0));
        assert_eq!(adapter.on_drag_stop(Position::new(1.0, 1.0)), None);
        assert_eq!(
            adapter.on_resize_stop(1.0, 1.0, Position::new(1.0, 1.0)),
            None
        );
        assert_eq!(adapter.position(), Position::new(50.0, 50.0));
    }

    #[test]
    fn test_locked_drag_is_ignored() {
        let mut adapter = adapter(true);
        adapter.set_drag_locked(true);

        adapter.on_drag(Position::new(10.0, 10.0));
        assert_eq!(adapter.on_drag_stop(Position::new(10.0, 10.0)), None);
        assert!(!adapter.drag_enabled());
        assert!(adapter.resize_enabled());

        adapter.set_drag_locked(false);
        assert!(adapter.drag_enabled());
    }

    #[test]
    fn test_sync_position_overwrites_without_update() {
        let mut adapter = adapter(true);

        assert!(!adapter.sync_position(Position::new(50.0, 50.0)));
        assert!(adapter.sync_position(Position::new(5.0, 6.0)));
        assert_eq!(adapter.position(), Position::new(5.0, 6.0));
    }

    #[test]
    fn test_sync_during_drag_keeps_pointer_position() {
        let mut adapter = adapter(true);
        adapter.on_drag(Position::new(200.0, 200.0));

        assert!(!adapter.sync_position(Position::new(50.0, 50.0)));
        assert_eq!(adapter.position(), Position::new(200.0, 200.0));
    }

    #[test]
    fn test_click_selects_only_when_editable() {
        assert_eq!(
            adapter(true).on_click(),
            ClickOutcome {
                stop_propagation: true,
                select: Some(BlockId::from("b")),
            }
        );
        assert_eq!(
            adapter(false).on_click(),
            ClickOutcome {
                stop_propagation: true,
                select: None,
            }
        );
    }
}
