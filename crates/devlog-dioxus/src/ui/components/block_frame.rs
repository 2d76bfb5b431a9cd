use devlog_engine::{BlockId, Gesture, GestureFrame, GestureKind, Position, ResizeHandle};
use dioxus::prelude::*;

use crate::ui::state::{ActiveGesture, GestureSlot};

pub fn pointer_position(evt: &MouseEvent) -> Position {
    let point = evt.client_coordinates();
    Position::new(point.x, point.y)
}

/// Absolutely positioned box around one canvas block.
///
/// Starts drag and resize gestures and draws the in-progress geometry.
/// `resting` is where the block sits when no gesture is running; the
/// gesture's last frame stays on screen until `resting` catches up.
#[component]
pub fn BlockFrame(
    id: BlockId,
    resting: GestureFrame,
    width_css: String,
    height_css: String,
    class: String,
    z_index: u32,
    selected: bool,
    drag_enabled: bool,
    resizable: bool,
    on_click: EventHandler<()>,
    on_gesture_move: EventHandler<(GestureKind, GestureFrame)>,
    on_gesture_end: EventHandler<(GestureKind, GestureFrame)>,
    children: Element,
) -> Element {
    let gestures = use_context::<GestureSlot>();
    let mut live = use_signal(|| None::<(GestureKind, GestureFrame)>);

    use_effect(use_reactive((&resting,), move |(_,)| live.set(None)));

    let on_move = use_callback(move |frame: GestureFrame| {
        let Some((kind, _)) = *live.peek() else {
            return;
        };
        live.set(Some((kind, frame)));
        on_gesture_move.call((kind, frame));
    });

    let on_finish = use_callback(move |frame: Option<GestureFrame>| {
        let Some((kind, _)) = *live.peek() else {
            return;
        };
        match frame {
            Some(frame) => {
                live.set(Some((kind, frame)));
                on_gesture_end.call((kind, frame));
            }
            None => live.set(None),
        }
    });

    let start = use_callback(move |(kind, pointer): (GestureKind, Position)| {
        live.set(Some((kind, resting)));
        gestures.begin(ActiveGesture {
            block: id.clone(),
            gesture: Gesture::begin(kind, pointer, resting),
            on_move,
            on_finish,
        });
    });

    let (position, width, height) = match *live.read() {
        Some((GestureKind::Resize(_), frame)) => (
            frame.position,
            format!("{}px", frame.width),
            format!("{}px", frame.height),
        ),
        Some((GestureKind::Drag, frame)) => (frame.position, width_css.clone(), height_css.clone()),
        None => (resting.position, width_css.clone(), height_css.clone()),
    };
    let left = position.x;
    let top = position.y;
    let classes = if selected {
        format!("block {class} selected")
    } else {
        format!("block {class}")
    };
    let cursor = if drag_enabled { "grab" } else { "text" };

    rsx! {
        div {
            class: "{classes}",
            style: "left: {left}px; top: {top}px; width: {width}; height: {height}; z-index: {z_index}; cursor: {cursor};",
            onmousedown: move |evt: MouseEvent| {
                if drag_enabled {
                    start.call((GestureKind::Drag, pointer_position(&evt)));
                }
            },
            onclick: move |evt: MouseEvent| {
                evt.stop_propagation();
                on_click.call(());
            },
            {children}
            if selected && resizable {
                for handle in ResizeHandle::ALL {
                    div {
                        key: "{handle.css_class()}",
                        class: "resize-handle {handle.css_class()}",
                        onmousedown: move |evt: MouseEvent| {
                            evt.stop_propagation();
                            evt.prevent_default();
                            start.call((GestureKind::Resize(handle), pointer_position(&evt)));
                        },
                    }
                }
            }
        }
    }
}
