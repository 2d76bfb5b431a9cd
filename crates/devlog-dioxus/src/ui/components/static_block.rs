use devlog_engine::{Block, BlockKind, Dimension, TextEngine};
use dioxus::prelude::*;

/// Read-only rendering of one block at its saved geometry
#[component]
pub fn StaticBlock(block: Block) -> Element {
    let left = block.position.x;
    let top = block.position.y;
    let z_index = block.z_index(false);

    match &block.kind {
        BlockKind::Text { content, size } => {
            let html = TextEngine::new(content, false).to_html();
            let width = size.map_or(Dimension::Auto, |size| size.width).to_css();
            let height = size.map_or(Dimension::Auto, |size| size.height).to_css();
            rsx! {
                div {
                    class: "block text-block readonly",
                    style: "left: {left}px; top: {top}px; width: {width}; height: {height}; z-index: {z_index};",
                    div {
                        class: "text-content",
                        dangerous_inner_html: "{html}",
                    }
                }
            }
        }
        BlockKind::Image { src, width, height } => {
            let width = width.unwrap_or(Dimension::Auto).to_css();
            let height = height.unwrap_or(Dimension::Auto).to_css();
            rsx! {
                div {
                    class: "block image-block readonly",
                    style: "left: {left}px; top: {top}px; width: {width}; height: {height}; z-index: {z_index};",
                    img { src: "{src}", alt: "content image" }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devlog_engine::{Position, Size};
    use dioxus::dioxus_core::VirtualDom;
    use dioxus_ssr::render;
    use serde_json::json;

    fn render_block(block: Block) -> String {
        let mut dom = VirtualDom::new_with_props(StaticBlock, StaticBlockProps { block });
        dom.rebuild_in_place();
        render(&dom)
    }

    #[test]
    fn test_text_block_renders_formatted_html() {
        let content = json!({
            "type": "doc",
            "content": [{
                "type": "paragraph",
                "content": [{"type": "text", "text": "a < b", "marks": [{"type": "bold"}]}]
            }]
        });
        let block = Block::new_text(content, Position::new(10.0, 20.0), Size::px(300.0, 100.0));

        let html = render_block(block);

        assert!(html.contains("left: 10px; top: 20px; width: 300px; height: 100px"));
        assert!(html.contains("<strong>a &lt; b</strong>"));
    }

    #[test]
    fn test_text_block_keeps_partial_marks_and_lists() {
        let content = json!({
            "type": "doc",
            "content": [
                {"type": "paragraph", "content": [
                    {"type": "text", "text": "Important", "marks": [{"type": "bold"}]},
                    {"type": "text", "text": " plain rest"}
                ]},
                {"type": "bulletList", "content": [
                    {"type": "listItem", "content": [{"type": "paragraph", "content": [{"type": "text", "text": "item"}]}]}
                ]}
            ]
        });
        let block = Block::new_text(content, Position::new(0.0, 0.0), Size::px(200.0, 80.0));

        let html = render_block(block);

        assert!(html.contains("<p><strong>Important</strong> plain rest</p><ul><li><p>item</p></li></ul>"));
    }

    #[test]
    fn test_image_block_keeps_auto_height() {
        let block = Block::new_image(
            "https://cdn.example/images/public/1_abc.png",
            Position::new(50.0, 50.0),
            Dimension::Px(400.0),
            Dimension::Auto,
        );

        let html = render_block(block);

        assert!(html.contains("width: 400px; height: auto"));
        assert!(html.contains("src=\"https://cdn.example/images/public/1_abc.png\""));
    }
}
