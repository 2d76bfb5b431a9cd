use devlog_engine::Navigation;
use dioxus::prelude::*;

use super::components::{CanvasPage, Header, NoticeDialog, PostListPage, PostViewPage};
use super::state::{Navigator, NoticeQueue};

const DEVLOG_CSS: &str = include_str!("../assets/devlog.css");

#[component]
pub fn App() -> Element {
    let notices = use_context_provider(NoticeQueue::new);
    let navigator = use_context_provider(|| Navigator::new(notices));

    let current = navigator.current();
    let key = current.path();

    rsx! {
        style { {DEVLOG_CSS} }
        div {
            class: "app-container",
            Header {}
            main {
                class: "main-content",
                {match current {
                    Navigation::PostList => rsx! {
                        PostListPage { key: "{key}" }
                    },
                    Navigation::NewPost => rsx! {
                        CanvasPage { key: "{key}", post_id: None }
                    },
                    Navigation::Edit(id) => rsx! {
                        CanvasPage { key: "{key}", post_id: Some(id) }
                    },
                    Navigation::Post(id) => rsx! {
                        PostViewPage { key: "{key}", post_id: id }
                    },
                }}
            }
            NoticeDialog {}
        }
    }
}
