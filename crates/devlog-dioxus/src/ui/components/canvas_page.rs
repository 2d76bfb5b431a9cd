use chrono::Utc;
use devlog_engine::canvas::{PickedFile, load_post, plan_uploads, save_post, upload_images};
use devlog_engine::{
    BlockId, BlockUpdate, CanvasInput, CanvasKey, FormatCommand, PostId,
    RichTextEngine, SaveOutcome,
};
use dioxus::html::Key;
use dioxus::prelude::*;
use log::{debug, warn};

use super::{ImageBlock, TextBlock, Toolbar};
use crate::services::Services;
use crate::ui::state::{Canvas, EngineHandle, FlushRegistry, GestureSlot, Navigator};

/// Used until the canvas has been measured
const INITIAL_VIEWPORT_HEIGHT: f64 = 800.0;

/// Editing screen for a new post (`post_id` absent) or an existing one
#[component]
pub fn CanvasPage(post_id: Option<PostId>) -> Element {
    let services = use_context::<Services>();
    let navigator = use_context::<Navigator>();
    let gestures = use_context_provider(GestureSlot::new);
    let registry = use_context_provider(FlushRegistry::new);
    let mut canvas = use_signal(|| Canvas::open(post_id.clone(), INITIAL_VIEWPORT_HEIGHT));

    let store = services.store.clone();
    use_hook(move || {
        let Some(id) = canvas.peek().post_id().cloned() else {
            return;
        };
        spawn(async move {
            let result = load_post(&*store, &id).await;
            if let Err(redirect) = canvas.write().finish_load(result) {
                navigator.redirect(redirect);
            }
        });
    });

    let on_update = move |(id, update): (BlockId, BlockUpdate)| {
        // A block flushing during teardown may outlive the canvas
        if let Ok(mut canvas) = canvas.try_write() {
            canvas.on_update(&id, update);
        }
    };
    let on_select = move |(id, handle): (BlockId, Option<EngineHandle>)| {
        canvas.write().on_select(id, handle);
    };
    let on_editor_focus = move |id: BlockId| canvas.write().on_editor_focus(&id);
    let on_editor_blur = move |id: BlockId| {
        if let Ok(mut canvas) = canvas.try_write() {
            canvas.on_editor_blur(&id);
        }
    };

    let store = services.store.clone();
    let save = move |_: MouseEvent| {
        let pending = registry.flush_all();
        {
            let mut canvas = canvas.write();
            for (id, update) in pending {
                canvas.on_update(&id, update);
            }
        }
        let request = match canvas.write().begin_save(Utc::now()) {
            Ok(request) => request,
            Err(e) => {
                debug!("Save not started: {e}");
                return;
            }
        };
        let store = store.clone();
        spawn(async move {
            let result = save_post(&*store, &request).await;
            let outcome = canvas.write().finish_save(&request, result);
            match outcome {
                SaveOutcome::Saved { notice, navigate, .. } => {
                    navigator.notify(notice);
                    navigator.go(navigate);
                }
                SaveOutcome::Failed { notice } => navigator.notify(notice),
                SaveOutcome::Stale => {}
            }
        });
    };

    let storage = services.storage.clone();
    let upload = move |evt: FormEvent| {
        let files = evt.files();
        // claimed before reading so a second pick cannot start a batch
        if files.is_empty() || !canvas.write().begin_upload_batch() {
            return;
        }
        let storage = storage.clone();
        spawn(async move {
            let mut picked = Vec::new();
            for file in files {
                match file.read_bytes().await {
                    Ok(bytes) => picked.push(PickedFile {
                        name: file.name(),
                        bytes: bytes.to_vec(),
                    }),
                    Err(e) => warn!("Could not read {}: {e}", file.name()),
                }
            }
            let jobs = plan_uploads(picked, &mut rand::thread_rng(), Utc::now());
            let blocks = upload_images(&*storage, jobs).await;
            canvas.write().finish_upload_batch(blocks);
        });
    };

    let on_command = move |command: FormatCommand| {
        let Some(mut engine) = canvas.peek().selected_handle().copied() else {
            return;
        };
        if let Ok(mut engine) = engine.try_write() {
            if let Err(e) = engine.run_command(command) {
                debug!("Format command ignored: {e}");
            }
        }
    };

    let state = canvas.read();
    if state.is_loading() {
        return rsx! {
            div { class: "list-status", "Loading post..." }
        };
    }

    let format = state
        .selected_handle()
        .and_then(|engine| engine.try_read().ok().map(|engine| engine.formatting()));
    let busy = state.is_saving() || state.is_uploading();
    let height = state.canvas_height();
    let title = state.title().to_string();
    let blocks = state.blocks().to_vec();
    let selected = state.selected_id().cloned();
    let uploading = state.is_uploading();
    drop(state);

    rsx! {
        div {
            class: "contents",
            aside {
                class: "toolbar-column",
                Toolbar { format, on_command }
            }
            div {
                class: "contents-main",
                onmounted: move |evt: MountedEvent| async move {
                    if let Ok(rect) = evt.get_client_rect().await {
                        canvas.write().set_viewport_height(rect.height());
                    }
                },
                div {
                    class: "contents-title",
                    label { r#for: "title-input", "Title" }
                    input {
                        id: "title-input",
                        r#type: "text",
                        value: "{title}",
                        oninput: move |evt: FormEvent| canvas.write().set_title(evt.value()),
                    }
                    button {
                        class: "save-button",
                        disabled: busy,
                        onclick: save,
                        "Save"
                    }
                }
                div {
                    class: "tool-buttons",
                    button {
                        title: "Add a text box",
                        disabled: uploading,
                        onclick: move |_| {
                            canvas.write().add_text_block();
                        },
                        "T"
                    }
                    label {
                        class: if uploading { "image-button disabled" } else { "image-button" },
                        title: "Add image files",
                        "Image"
                        input {
                            r#type: "file",
                            accept: "image/*",
                            multiple: true,
                            disabled: uploading,
                            onchange: upload,
                        }
                    }
                }
                div {
                    class: "contents-body",
                    tabindex: 0,
                    style: "min-height: {height}px;",
                    onclick: move |_| {
                        canvas.write().handle_input(CanvasInput::BackgroundClick { target_is_root: true });
                    },
                    onkeydown: move |evt: KeyboardEvent| {
                        if evt.key() == Key::Delete {
                            canvas.write().handle_input(CanvasInput::Key(CanvasKey::Delete));
                        }
                    },
                    onmousemove: move |evt: MouseEvent| {
                        if gestures.is_active() {
                            gestures.track(super::block_frame::pointer_position(&evt));
                        }
                    },
                    onmouseup: move |_| gestures.finish(),
                    onmouseleave: move |_| gestures.finish(),
                    if uploading {
                        div {
                            class: "upload-overlay",
                            onclick: move |evt: MouseEvent| evt.stop_propagation(),
                            onmousedown: move |evt: MouseEvent| evt.stop_propagation(),
                            "Uploading images..."
                        }
                    }
                    for block in blocks {
                        if block.is_text() {
                            TextBlock {
                                key: "{block.id}",
                                selected: selected.as_ref() == Some(&block.id),
                                block: block.clone(),
                                editable: true,
                                on_update,
                                on_select,
                                on_editor_focus,
                                on_editor_blur,
                            }
                        } else {
                            ImageBlock {
                                key: "{block.id}",
                                selected: selected.as_ref() == Some(&block.id),
                                block: block.clone(),
                                editable: true,
                                on_update,
                                on_select,
                            }
                        }
                    }
                }
            }
        }
    }
}
