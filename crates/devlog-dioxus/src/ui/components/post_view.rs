use devlog_engine::layout::canvas_height;
use devlog_engine::viewer::DELETE_PROMPT;
use devlog_engine::{DeleteOutcome, Document, Navigation, PostId, PostViewer, ViewState, format_saved_at};
use dioxus::prelude::*;

use super::{ErrorScreen, StaticBlock};
use crate::services::Services;
use crate::ui::state::Navigator;

const VIEW_VIEWPORT_HEIGHT: f64 = 800.0;

#[component]
pub fn PostViewPage(post_id: PostId) -> Element {
    let services = use_context::<Services>();
    let navigator = use_context::<Navigator>();
    let mut viewer = use_signal(|| PostViewer::new(post_id.clone()));

    let store = services.store.clone();
    use_hook(move || {
        spawn(async move {
            let mut loaded = viewer.peek().clone();
            if let Err(redirect) = loaded.load(&*store).await {
                navigator.redirect(redirect);
            }
            viewer.set(loaded);
        });
    });

    let store = services.store.clone();
    let confirm_delete = move |_| {
        if !viewer.write().begin_delete() {
            return;
        }
        let store = store.clone();
        spawn(async move {
            let id = viewer.peek().id().clone();
            let result = store.delete(&id).await;
            let outcome = viewer.write().finish_delete(result);
            match outcome {
                DeleteOutcome::Deleted(redirect) => navigator.redirect(redirect),
                DeleteOutcome::Failed(notice) => navigator.notify(notice),
                DeleteOutcome::Ignored => {}
            }
        });
    };

    let current = viewer.read().clone();
    match current.state() {
        ViewState::Loading => rsx! {
            div { class: "list-status", "Loading..." }
        },
        ViewState::NotFound => rsx! {
            ErrorScreen {
                title: "Post not found",
                message: "This post has no title and no content.",
                details: Navigation::Post(current.id().clone()).path(),
                on_back: move |_| navigator.go(Navigation::PostList),
            }
        },
        ViewState::Loaded(document) => rsx! {
            div {
                class: "post-view",
                div {
                    class: "post-view-header",
                    h1 { "{document.title}" }
                    div {
                        class: "post-actions",
                        button {
                            class: "edit-button",
                            onclick: move |_| {
                                let target = viewer.peek().edit_target();
                                navigator.go(target);
                            },
                            "Edit"
                        }
                        button {
                            class: "delete-button",
                            disabled: current.is_deleting(),
                            onclick: move |_| {
                                viewer.write().request_delete();
                            },
                            "Delete"
                        }
                    }
                }
                if current.is_confirming() {
                    div {
                        class: "confirm-prompt",
                        role: "alertdialog",
                        p { "{DELETE_PROMPT}" }
                        button { class: "delete-button", onclick: confirm_delete, "Confirm" }
                        button {
                            onclick: move |_| viewer.write().cancel_delete(),
                            "Cancel"
                        }
                    }
                }
                PostBody { document: document.clone() }
            }
        },
    }
}

/// Saved time plus the blocks laid out as they were on the canvas
#[component]
pub fn PostBody(document: Document) -> Element {
    let saved_at = format_saved_at(document.saved_at);
    let height = canvas_height(&document.blocks, VIEW_VIEWPORT_HEIGHT);

    rsx! {
        p { class: "post-saved-at", "Saved at: {saved_at}" }
        div {
            class: "canvas readonly",
            style: "height: {height}px;",
            for block in document.blocks.iter() {
                StaticBlock { key: "{block.id}", block: block.clone() }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devlog_engine::{Block, Dimension, Position, Size};
    use dioxus::dioxus_core::VirtualDom;
    use dioxus_ssr::render;
    use serde_json::json;

    #[test]
    fn test_post_body_renders_blocks_in_order() {
        let document = Document {
            title: "Week 3".to_string(),
            blocks: vec![
                Block::new_text(json!("first"), Position::new(0.0, 0.0), Size::px(200.0, 80.0)),
                Block::new_image(
                    "memory://images/public/2_x.png",
                    Position::new(0.0, 900.0),
                    Dimension::Px(400.0),
                    Dimension::Px(300.0),
                ),
            ],
            saved_at: None,
        };

        let mut dom = VirtualDom::new_with_props(PostBody, PostBodyProps { document });
        dom.rebuild_in_place();
        let html = render(&dom);

        assert!(html.contains("Saved at: never"));
        assert!(html.contains("height: 1300px;"));
        let text_at = html.find("first").unwrap();
        let image_at = html.find("2_x.png").unwrap();
        assert!(text_at < image_at);
    }
}
