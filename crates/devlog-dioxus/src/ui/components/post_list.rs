use devlog_engine::{PostList, PostSummary, format_saved_at};
use dioxus::prelude::*;
use log::debug;

use crate::services::Services;
use crate::ui::state::Navigator;

/// Newest posts first, one page at a time
#[component]
pub fn PostListPage() -> Element {
    let services = use_context::<Services>();
    let navigator = use_context::<Navigator>();
    let mut list = use_signal(|| PostList::new(services.page_size));

    let load = use_callback(move |page: usize| {
        let store = services.store.clone();
        spawn(async move {
            // Work on a copy so the signal is not held across the await
            let mut next = list.peek().clone();
            list.write().begin_load();
            if let Some(notice) = next.load_page(&*store, page).await {
                navigator.notify(notice);
            }
            list.set(next);
        });
    });

    use_hook(move || load.call(1));

    let current = list.read().clone();

    rsx! {
        div {
            class: "log-list-wrapper",
            if current.is_loading() {
                div { class: "list-status", "Loading..." }
            } else if current.rows().is_empty() {
                div { class: "list-status", "No posts yet." }
            }
            for row in current.rows().iter().cloned() {
                PostRow {
                    key: "{row.id}",
                    row: row.clone(),
                    on_open: move |row: PostSummary| {
                        let target = list.peek().open(&row);
                        navigator.go(target);
                    },
                }
            }
            Pagination {
                list: current.clone(),
                on_page: move |page: usize| {
                    if list.write().go_to(page) {
                        debug!("Showing page {page}");
                        load.call(page);
                    }
                },
            }
        }
    }
}

#[component]
pub fn PostRow(row: PostSummary, on_open: EventHandler<PostSummary>) -> Element {
    let saved_at = format_saved_at(row.saved_at);
    let title = row.title.clone();

    rsx! {
        div {
            class: "log-item",
            onclick: move |_| on_open.call(row.clone()),
            div { class: "log-title", "{title}" }
            div { class: "log-date", "{saved_at}" }
        }
    }
}

/// Previous, one button per page, next
#[component]
pub fn Pagination(list: PostList, on_page: EventHandler<usize>) -> Element {
    let page = list.page();

    rsx! {
        div {
            class: "pagination",
            button {
                disabled: !list.has_previous(),
                onclick: move |_| on_page.call(page.saturating_sub(1)),
                "Previous"
            }
            for number in list.pages() {
                button {
                    key: "{number}",
                    class: if number == page { "active" } else { "" },
                    disabled: number == page,
                    onclick: move |_| on_page.call(number),
                    "{number}"
                }
            }
            button {
                disabled: !list.has_next(),
                onclick: move |_| on_page.call(page + 1),
                "Next"
            }
        }
    }
}
