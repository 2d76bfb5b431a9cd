use devlog_engine::{
    Block, BlockId, BlockKind, BlockUpdate, Dimension, DragResizeAdapter, GestureFrame,
    GestureKind,
};
use dioxus::prelude::*;
use log::debug;

use super::BlockFrame;
use crate::ui::state::EngineHandle;

#[component]
pub fn ImageBlock(
    block: Block,
    selected: bool,
    editable: bool,
    on_update: EventHandler<(BlockId, BlockUpdate)>,
    on_select: EventHandler<(BlockId, Option<EngineHandle>)>,
) -> Element {
    let mut adapter =
        use_signal(|| DragResizeAdapter::new(block.id.clone(), block.position, editable));

    use_effect(use_reactive((&block.position,), move |(position,)| {
        if adapter.write().sync_position(position) {
            debug!("Image block moved externally to ({}, {})", position.x, position.y);
        }
    }));

    let BlockKind::Image { src, width, height } = &block.kind else {
        return rsx! {};
    };
    let width_css = width.unwrap_or(Dimension::Auto).to_css();
    let height_css = height.unwrap_or(Dimension::Auto).to_css();
    let resting = GestureFrame::of(&block);
    let drag_enabled = adapter.read().drag_enabled();
    let resizable = adapter.read().resize_enabled();

    rsx! {
        BlockFrame {
            id: block.id.clone(),
            resting,
            width_css,
            height_css,
            class: "image-block",
            z_index: block.z_index(selected),
            selected: selected && editable,
            drag_enabled,
            resizable,
            on_click: move |_| {
                if let Some(id) = adapter.peek().on_click().select {
                    on_select.call((id, None));
                }
            },
            on_gesture_move: move |(kind, frame): (GestureKind, GestureFrame)| {
                if kind == GestureKind::Drag {
                    adapter.write().on_drag(frame.position);
                }
            },
            on_gesture_end: move |(kind, frame): (GestureKind, GestureFrame)| {
                let mut adapter = adapter.write();
                let update = match kind {
                    GestureKind::Drag => adapter.on_drag_stop(frame.position),
                    GestureKind::Resize(_) => {
                        adapter.on_resize_stop(frame.width, frame.height, frame.position)
                    }
                };
                let id = adapter.id().clone();
                drop(adapter);
                if let Some(update) = update {
                    on_update.call((id, update));
                }
            },
            img {
                src: "{src}",
                alt: "content image",
                draggable: false,
            }
        }
    }
}
