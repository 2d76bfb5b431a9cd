use dioxus::prelude::*;

/// Stands in for a page whose content could not be shown
#[component]
pub fn ErrorScreen(
    title: String,
    message: String,
    details: Option<String>,
    on_back: Option<EventHandler<()>>,
) -> Element {
    rsx! {
        div {
            class: "error-screen",
            h1 { "{title}" }
            p { "{message}" }
            if let Some(ref detail_text) = details {
                pre { class: "error-details", "{detail_text}" }
            }
            if let Some(on_back) = on_back {
                button {
                    class: "error-back",
                    onclick: move |_| on_back.call(()),
                    "Back to posts"
                }
            }
        }
    }
}
