use devlog_engine::{Notice, NoticeLevel};
use dioxus::prelude::*;

use crate::ui::state::NoticeQueue;

/// Shows the oldest queued notice over everything else until dismissed
#[component]
pub fn NoticeDialog() -> Element {
    let notices = use_context::<NoticeQueue>();

    match notices.current() {
        Some(notice) => rsx! {
            NoticeBox {
                notice,
                on_dismiss: move |_| notices.dismiss(),
            }
        },
        None => rsx! {},
    }
}

#[component]
pub fn NoticeBox(notice: Notice, on_dismiss: EventHandler<()>) -> Element {
    let level_class = match notice.level {
        NoticeLevel::Info => "notice info",
        NoticeLevel::Error => "notice error",
    };

    rsx! {
        div {
            class: "notice-backdrop",
            div {
                class: "{level_class}",
                role: "alertdialog",
                p { "{notice.message}" }
                button {
                    class: "notice-dismiss",
                    autofocus: true,
                    onclick: move |_| on_dismiss.call(()),
                    "OK"
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dioxus::dioxus_core::VirtualDom;
    use dioxus_ssr::render;

    fn render_notice(notice: Notice) -> String {
        let mut dom = VirtualDom::new_with_props(
            |notice: Notice| rsx! { NoticeBox { notice, on_dismiss: |_| {} } },
            notice,
        );
        dom.rebuild_in_place();
        render(&dom)
    }

    #[test]
    fn test_error_notice_is_styled_as_error() {
        let html = render_notice(Notice::error("Could not save the post."));

        assert!(html.contains("notice error"));
        assert!(html.contains("Could not save the post."));
        assert!(html.contains("OK"));
    }

    #[test]
    fn test_info_notice_message_is_escaped() {
        let html = render_notice(Notice::info("Saved <draft>"));

        assert!(html.contains("notice info"));
        assert!(html.contains("Saved &lt;draft&gt;"));
    }
}
