use devlog_engine::richtext::FONT_SIZES;
use devlog_engine::{FormatCommand, FormatState};
use dioxus::prelude::*;

const DEFAULT_COLOR: &str = "#000000";

/// Formatting controls for the selected text block.
///
/// Marks apply to the whole block, so the controls stay live while the
/// block is selected even if its editor has lost focus.
#[component]
pub fn Toolbar(format: Option<FormatState>, on_command: EventHandler<FormatCommand>) -> Element {
    let Some(format) = format else {
        return rsx! {
            div { class: "toolbar toolbar-empty", "No text selected" }
        };
    };

    let marks = format.marks.clone();
    let font_size = marks.font_size.clone().unwrap_or_default();
    let color = marks.color.clone().unwrap_or_else(|| DEFAULT_COLOR.to_string());
    let toggles = [
        ("B", "Bold", marks.bold, FormatCommand::ToggleBold),
        ("I", "Italic", marks.italic, FormatCommand::ToggleItalic),
        ("S", "Strikethrough", marks.strike, FormatCommand::ToggleStrike),
        ("U", "Underline", marks.underline, FormatCommand::ToggleUnderline),
    ];

    rsx! {
        div {
            class: "toolbar",
            select {
                class: "toolbar-select",
                value: "{font_size}",
                onchange: move |evt: FormEvent| {
                    let size = evt.value();
                    on_command.call(FormatCommand::SetFontSize((!size.is_empty()).then_some(size)));
                },
                option { value: "", "Size" }
                for size in FONT_SIZES {
                    option { key: "{size}", value: "{size}", selected: size == font_size, "{size}" }
                }
            }
            input {
                class: "toolbar-color",
                r#type: "color",
                value: "{color}",
                onchange: move |evt: FormEvent| on_command.call(FormatCommand::SetColor(evt.value())),
            }
            for (label, title, active, command) in toggles {
                button {
                    key: "{label}",
                    class: if active { "toolbar-button active" } else { "toolbar-button" },
                    title: "{title}",
                    onmousedown: move |evt: MouseEvent| evt.prevent_default(),
                    onclick: move |_| on_command.call(command.clone()),
                    "{label}"
                }
            }
            button {
                class: "toolbar-button",
                disabled: !format.can_undo,
                onmousedown: move |evt: MouseEvent| evt.prevent_default(),
                onclick: move |_| on_command.call(FormatCommand::Undo),
                "Undo"
            }
            button {
                class: "toolbar-button",
                disabled: !format.can_redo,
                onmousedown: move |evt: MouseEvent| evt.prevent_default(),
                onclick: move |_| on_command.call(FormatCommand::Redo),
                "Redo"
            }
        }
    }
}
