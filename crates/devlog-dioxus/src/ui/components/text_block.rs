use std::rc::Rc;
use std::time::Instant;

use devlog_engine::{
    Block, BlockId, BlockKind, BlockUpdate, Dimension, DragResizeAdapter, GestureFrame,
    GestureKind, RichTextAdapter, Size, SyncAction, TextEngine,
};
use dioxus::prelude::*;
use log::{debug, warn};

use super::BlockFrame;
use crate::services::Services;
use crate::ui::state::{EngineHandle, FlushRegistry};

/// Editable rich-text block.
///
/// Content, drag and resize results pass through the block's
/// [`RichTextAdapter`], which holds them for the debounce delay before one
/// combined update reaches the canvas.
#[component]
pub fn TextBlock(
    block: Block,
    selected: bool,
    editable: bool,
    on_update: EventHandler<(BlockId, BlockUpdate)>,
    on_select: EventHandler<(BlockId, Option<EngineHandle>)>,
    on_editor_focus: EventHandler<BlockId>,
    on_editor_blur: EventHandler<BlockId>,
) -> Element {
    let services = use_context::<Services>();
    let registry = use_context::<FlushRegistry>();

    let (content, size) = match &block.kind {
        BlockKind::Text { content, size } => (content.clone(), *size),
        BlockKind::Image { .. } => (Default::default(), None),
    };
    let id = block.id.clone();

    let mut engine: EngineHandle = use_signal(|| TextEngine::new(&content, editable));
    let mut adapter = use_signal(|| {
        RichTextAdapter::new(id.clone(), editable, block.position, size, services.debounce)
    });
    let mut drag = use_signal(|| DragResizeAdapter::new(id.clone(), block.position, editable));
    let mut local_size = use_signal(|| size);
    let mut editor = use_signal(|| None::<Rc<MountedData>>);

    use_hook(|| registry.register(id.clone(), adapter));
    use_drop({
        let id = id.clone();
        move || {
            registry.unregister(&id);
            let pending = adapter.try_write().ok().and_then(|mut adapter| adapter.flush());
            if let Some(update) = pending {
                on_update.call(update);
            }
        }
    });

    // Poll once the quiet period is over; an earlier wake-up finds the
    // deadline moved and does nothing.
    let schedule_commit = use_callback(move |_: ()| {
        let Some(deadline) = adapter.peek().deadline() else {
            return;
        };
        spawn(async move {
            tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await;
            let ready = adapter.try_write().ok().and_then(|mut adapter| adapter.poll(Instant::now()));
            if let Some(update) = ready {
                on_update.call(update);
            }
        });
    });

    use_effect(move || {
        let engine = engine.read();
        if adapter.write().on_change(&*engine, Instant::now()) {
            schedule_commit.call(());
        }
    });

    use_effect(use_reactive((&block.position, &size), move |(position, size)| {
        drag.write().sync_position(position);
        adapter.write().sync_geometry(position, size);
        local_size.set(size);
    }));

    use_effect(use_reactive((&selected,), move |(selected,)| {
        let action = adapter.write().sync_selection(selected, &mut *engine.write());
        let focus = match action {
            SyncAction::Focus => true,
            SyncAction::Blur => false,
            SyncAction::None => return,
        };
        debug!("Syncing editor focus to {focus}");
        if let Some(element) = editor.peek().clone() {
            spawn(async move {
                if let Err(e) = element.set_focus(focus).await {
                    warn!("Could not move editor focus: {e:?}");
                }
            });
        }
    }));

    let resting = GestureFrame {
        position: drag.read().position(),
        width: local_size
            .read()
            .and_then(|size| size.width.px())
            .unwrap_or_else(|| block.effective_width()),
        height: local_size
            .read()
            .and_then(|size| size.height.px())
            .unwrap_or_else(|| block.effective_height()),
    };
    let width_css = local_size
        .read()
        .map_or(Dimension::Auto, |size| size.width)
        .to_css();
    let height_css = local_size
        .read()
        .map_or(Dimension::Auto, |size| size.height)
        .to_css();
    let drag_enabled = drag.read().drag_enabled();
    let text = engine.read().plain_text();
    let style = engine.read().active_marks().css();

    rsx! {
        BlockFrame {
            id: id.clone(),
            resting,
            width_css,
            height_css,
            class: "text-block",
            z_index: block.z_index(selected),
            selected: selected && editable,
            drag_enabled,
            resizable: drag.read().resize_enabled(),
            on_click: {
                let id = id.clone();
                move |_| {
                    if editable {
                        on_select.call((id.clone(), Some(engine)));
                    }
                }
            },
            on_gesture_move: |_| {},
            on_gesture_end: move |(kind, frame): (GestureKind, GestureFrame)| {
                let now = Instant::now();
                match kind {
                    GestureKind::Drag => {
                        if drag.write().on_drag_stop(frame.position).is_none() {
                            return;
                        }
                        adapter.write().on_drag_stop(frame.position, now);
                    }
                    GestureKind::Resize(_) => {
                        let resized =
                            drag.write().on_resize_stop(frame.width, frame.height, frame.position);
                        if resized.is_none() {
                            return;
                        }
                        local_size.set(Some(Size::px(frame.width, frame.height)));
                        adapter.write().on_resize_stop(frame.width, frame.height, frame.position, now);
                    }
                }
                schedule_commit.call(());
            },
            div { class: "drag-grip" }
            textarea {
                class: "text-editor",
                style: "{style}",
                value: "{text}",
                readonly: !editable,
                spellcheck: false,
                onmounted: move |evt: MountedEvent| editor.set(Some(evt.data())),
                onmousedown: move |evt: MouseEvent| evt.stop_propagation(),
                oninput: move |evt: FormEvent| {
                    if let Err(e) = engine.write().set_text(&evt.value()) {
                        debug!("Ignoring input: {e}");
                    }
                },
                onfocus: {
                    let id = id.clone();
                    move |_| {
                        let report = adapter.write().on_focus(&mut *engine.write());
                        drag.write().set_drag_locked(true);
                        on_editor_focus.call(id.clone());
                        if let Some(report) = report {
                            on_select.call((report.id, Some(engine)));
                        }
                    }
                },
                onblur: {
                    let id = id.clone();
                    move |_| {
                        adapter.write().on_blur(&mut *engine.write());
                        drag.write().set_drag_locked(false);
                        on_editor_blur.call(id.clone());
                    }
                },
            }
        }
    }
}
