use devlog_engine::Navigation;
use dioxus::prelude::*;

use crate::ui::state::Navigator;

pub const SITE_TITLE: &str = "My Development Log";

#[component]
pub fn Header() -> Element {
    let navigator = use_context::<Navigator>();

    rsx! {
        header {
            class: "header",
            h1 {
                class: "site-title",
                onclick: move |_| navigator.go(Navigation::PostList),
                "{SITE_TITLE}"
            }
            nav {
                button {
                    class: "nav-link",
                    onclick: move |_| navigator.go(Navigation::PostList),
                    "Posts"
                }
                button {
                    class: "nav-link",
                    onclick: move |_| navigator.go(Navigation::NewPost),
                    "Write"
                }
            }
        }
    }
}
