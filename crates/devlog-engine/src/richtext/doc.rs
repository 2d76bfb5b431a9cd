use std::ops::Range;

use serde_json::{Map, Value, json};

/// Formatting applied to a run of text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Marks {
    pub bold: bool,
    pub italic: bool,
    pub strike: bool,
    pub underline: bool,
    pub color: Option<String>,
    pub font_size: Option<String>,
}

impl Marks {
    fn from_json(marks: Option<&Value>) -> Self {
        let mut parsed = Marks::default();
        let Some(Value::Array(marks)) = marks else {
            return parsed;
        };
        for mark in marks {
            match node_type(mark) {
                Some("bold") => parsed.bold = true,
                Some("italic") => parsed.italic = true,
                Some("strike") => parsed.strike = true,
                Some("underline") => parsed.underline = true,
                Some("textStyle") => {
                    let attrs = mark.get("attrs");
                    parsed.color = string_attr(attrs, "color");
                    parsed.font_size = string_attr(attrs, "fontSize");
                }
                _ => {}
            }
        }
        parsed
    }

    /// Formatting shared by both runs
    fn intersect(&self, other: &Marks) -> Marks {
        Marks {
            bold: self.bold && other.bold,
            italic: self.italic && other.italic,
            strike: self.strike && other.strike,
            underline: self.underline && other.underline,
            color: self.color.clone().filter(|c| other.color.as_ref() == Some(c)),
            font_size: self
                .font_size
                .clone()
                .filter(|s| other.font_size.as_ref() == Some(s)),
        }
    }

    /// Inline CSS equivalent, used to style the editing surface
    pub fn css(&self) -> String {
        let mut rules = Vec::new();
        if self.bold {
            rules.push("font-weight: bold".to_string());
        }
        if self.italic {
            rules.push("font-style: italic".to_string());
        }
        let decorations: Vec<&str> = [
            (self.strike, "line-through"),
            (self.underline, "underline"),
        ]
        .into_iter()
        .filter_map(|(on, name)| on.then_some(name))
        .collect();
        if !decorations.is_empty() {
            rules.push(format!("text-decoration: {}", decorations.join(" ")));
        }
        if let Some(color) = &self.color {
            rules.push(format!("color: {color}"));
        }
        if let Some(size) = &self.font_size {
            rules.push(format!("font-size: {size}"));
        }
        rules.join("; ")
    }
}

fn string_attr(attrs: Option<&Value>, name: &str) -> Option<String> {
    attrs
        .and_then(|attrs| attrs.get(name))
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Inline content of a textblock
#[derive(Debug, Clone, PartialEq)]
enum Inline {
    /// `node` is the stored text node without its `text` field
    Text { text: String, node: Map<String, Value> },
    HardBreak(Value),
    /// Inline node this engine does not edit (mention, inline image, ...)
    Atom(Value),
}

impl Inline {
    /// Width in the plain-text projection
    fn len(&self) -> usize {
        match self {
            Inline::Text { text, .. } => text.chars().count(),
            Inline::HardBreak(_) => 1,
            Inline::Atom(_) => 0,
        }
    }

    fn to_value(&self) -> Value {
        match self {
            Inline::Text { text, node } => {
                let mut node = node.clone();
                node.insert("text".into(), json!(text));
                Value::Object(node)
            }
            Inline::HardBreak(value) | Inline::Atom(value) => value.clone(),
        }
    }
}

/// Block-level node. `node` holds every stored field except a non-empty
/// `content`, so untouched nodes serialize back exactly as they were read.
#[derive(Debug, Clone, PartialEq)]
enum Node {
    /// Node holding inline content: paragraph, heading, code block
    Textblock { node: Map<String, Value>, runs: Vec<Inline> },
    Container { node: Map<String, Value>, children: Vec<Node> },
    /// Non-object entry in a content array
    Opaque(Value),
}

impl Node {
    fn parse(value: &Value) -> Node {
        let Value::Object(object) = value else {
            return Node::Opaque(value.clone());
        };
        let mut node = object.clone();
        let content = match node.remove("content") {
            Some(Value::Array(items)) if !items.is_empty() => items,
            Some(empty_or_odd) => {
                node.insert("content".into(), empty_or_odd);
                Vec::new()
            }
            None => Vec::new(),
        };
        let textblock = matches!(
            node_type_of(&node),
            Some("paragraph") | Some("heading") | Some("codeBlock")
        ) || content
            .iter()
            .any(|child| matches!(node_type(child), Some("text") | Some("hardBreak")));
        if textblock {
            Node::Textblock {
                node,
                runs: content.iter().map(parse_inline).collect(),
            }
        } else {
            Node::Container {
                node,
                children: content.iter().map(Node::parse).collect(),
            }
        }
    }

    fn to_value(&self) -> Value {
        match self {
            Node::Textblock { node, runs } => {
                let mut node = node.clone();
                if !runs.is_empty() {
                    node.insert(
                        "content".into(),
                        Value::Array(runs.iter().map(Inline::to_value).collect()),
                    );
                }
                Value::Object(node)
            }
            Node::Container { node, children } => {
                let mut node = node.clone();
                if !children.is_empty() {
                    node.insert(
                        "content".into(),
                        Value::Array(children.iter().map(Node::to_value).collect()),
                    );
                }
                Value::Object(node)
            }
            Node::Opaque(value) => value.clone(),
        }
    }
}

fn parse_inline(value: &Value) -> Inline {
    match (node_type(value), value) {
        (Some("text"), Value::Object(object)) => {
            let mut node = object.clone();
            let text = match node.remove("text") {
                Some(Value::String(text)) => text,
                _ => String::new(),
            };
            Inline::Text { text, node }
        }
        (Some("hardBreak"), _) => Inline::HardBreak(value.clone()),
        _ => Inline::Atom(value.clone()),
    }
}

/// A text block's rich-text document.
///
/// Reads ProseMirror-style JSON (`doc` > block nodes > `text` + `marks`) and
/// bare strings. Headings, lists, quotes and node types it does not know are
/// kept as read, and every text run keeps its own marks. The editing surface
/// sees the plain-text projection: one line per textblock, hard breaks as
/// newlines.
#[derive(Debug, Clone, PartialEq)]
pub struct RichDoc {
    root: Node,
    /// Marks for text typed where no run exists to inherit from
    stored_marks: Vec<Value>,
}

impl Default for RichDoc {
    fn default() -> Self {
        Self {
            root: Node::Container {
                node: doc_node(),
                children: Vec::new(),
            },
            stored_marks: Vec::new(),
        }
    }
}

impl RichDoc {
    pub fn from_plain(text: &str) -> Self {
        let children = text
            .split('\n')
            .map(|line| paragraph(line, &text_node(&[])))
            .collect();
        Self {
            root: Node::Container {
                node: doc_node(),
                children,
            },
            stored_marks: Vec::new(),
        }
    }

    pub fn from_value(value: &Value) -> Self {
        let root = match value {
            Value::Null => return Self::default(),
            Value::String(text) => return Self::from_plain(text),
            Value::Object(_) if node_type(value) == Some("doc") => Node::parse(value),
            Value::Object(_) => Node::Container {
                node: doc_node(),
                children: vec![Node::parse(value)],
            },
            other => return Self::from_plain(&other.to_string()),
        };
        let mut doc = Self {
            root,
            stored_marks: Vec::new(),
        };
        doc.stored_marks = doc.first_run_marks();
        doc
    }

    pub fn to_value(&self) -> Value {
        self.root.to_value()
    }

    pub fn plain_text(&self) -> String {
        self.textblocks()
            .iter()
            .map(|(_, runs)| line_text(runs))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Formatting every text run shares
    pub fn marks(&self) -> Marks {
        let shared = self
            .textblocks()
            .into_iter()
            .flat_map(|(_, runs)| runs.iter())
            .filter_map(|run| match run {
                Inline::Text { text, node } if !text.is_empty() => {
                    Some(Marks::from_json(node.get("marks")))
                }
                _ => None,
            })
            .reduce(|shared, marks| shared.intersect(&marks));
        shared.unwrap_or_else(|| Marks::from_json(Some(&Value::Array(self.stored_marks.clone()))))
    }

    /// Add or remove a flag mark (`bold`, `italic`, ...) on every run
    pub fn set_mark(&mut self, name: &str, on: bool) {
        self.update_marks(|marks| {
            let present = marks.iter().any(|mark| node_type(mark) == Some(name));
            if on && !present {
                marks.push(json!({ "type": name }));
            } else if !on {
                marks.retain(|mark| node_type(mark) != Some(name));
            }
        });
    }

    /// Set or clear one `textStyle` attribute (`color`, `fontSize`) on every run
    pub fn set_text_style(&mut self, attr: &str, value: Option<&str>) {
        self.update_marks(|marks| {
            let existing = marks
                .iter()
                .position(|mark| node_type(mark) == Some("textStyle"));
            match (existing, value) {
                (Some(index), _) => {
                    if let Some(mark) = marks[index].as_object_mut() {
                        let attrs = mark.entry("attrs").or_insert_with(|| json!({}));
                        if let Some(attrs) = attrs.as_object_mut() {
                            attrs.insert(attr.into(), value.map_or(Value::Null, |v| json!(v)));
                        }
                    }
                    let unused = marks[index]
                        .get("attrs")
                        .and_then(Value::as_object)
                        .is_none_or(|attrs| attrs.values().all(Value::is_null));
                    if unused {
                        marks.remove(index);
                    }
                }
                (None, Some(value)) => {
                    let mut attrs = Map::new();
                    attrs.insert(attr.into(), json!(value));
                    marks.push(json!({"type": "textStyle", "attrs": attrs}));
                }
                (None, None) => {}
            }
        });
    }

    fn update_marks(&mut self, change: impl Fn(&mut Vec<Value>)) {
        change(&mut self.stored_marks);
        for runs in self.textblocks_mut() {
            for run in runs.iter_mut() {
                let Inline::Text { node, .. } = run else {
                    continue;
                };
                let mut marks = match node.remove("marks") {
                    Some(Value::Array(marks)) => marks,
                    _ => Vec::new(),
                };
                change(&mut marks);
                if !marks.is_empty() {
                    node.insert("marks".into(), Value::Array(marks));
                }
            }
        }
    }

    /// Replace characters `start..end` of the plain text with `inserted`.
    ///
    /// Everything outside the range keeps its structure and marks. New text
    /// takes the marks of the run it is typed after, a newline splits the
    /// textblock in two, and deleting across textblocks joins them, dropping
    /// list items or other containers left empty.
    pub fn replace_range(&mut self, start: usize, end: usize, inserted: &str) {
        let widths: Vec<usize> = self
            .textblocks()
            .iter()
            .map(|(_, runs)| runs.iter().map(Inline::len).sum())
            .collect();
        if widths.is_empty() {
            let text = text_node(&self.stored_marks);
            if let Node::Container { children, .. } = &mut self.root {
                children.extend(inserted.split('\n').map(|line| paragraph(line, &text)));
            }
            return;
        }

        let (start_line, start_col) = locate(&widths, start);
        let (end_line, end_col) = locate(&widths, end.max(start));
        let (template, start_runs, end_runs) = {
            let blocks = self.textblocks();
            let mut template = blocks[start_line].0.clone();
            template.remove("content");
            (template, blocks[start_line].1.to_vec(), blocks[end_line].1.to_vec())
        };
        let text = inherited_text_node(&start_runs, start_col, &self.stored_marks);
        self.stored_marks = match text.get("marks") {
            Some(Value::Array(marks)) => marks.clone(),
            _ => Vec::new(),
        };
        let (mut first, _) = split_runs(start_runs, start_col);
        let (_, tail) = split_runs(end_runs, end_col);

        if end_line > start_line {
            if let Node::Container { children, .. } = &mut self.root {
                prune(children, &mut 0, &(start_line + 1..end_line + 1));
            }
        }

        let mut pieces = inserted.split('\n');
        push_text(&mut first, pieces.next().unwrap_or_default(), &text);
        let rest: Vec<&str> = pieces.collect();
        let mut added = Vec::new();
        match rest.split_last() {
            Some((last, middle)) => {
                for piece in middle {
                    added.push(paragraph_like(&template, piece, &text, Vec::new()));
                }
                added.push(paragraph_like(&template, last, &text, tail));
            }
            None => first.extend(tail),
        }
        normalize(&mut first);

        if let Some(runs) = self.textblocks_mut().into_iter().nth(start_line) {
            *runs = first;
        }
        if !added.is_empty() {
            if let Node::Container { children, .. } = &mut self.root {
                insert_after(children, &mut 0, start_line, &mut added);
            }
        }
    }

    /// Escaped HTML for read-only display
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        render_node(&self.root, &mut html);
        html
    }

    fn first_run_marks(&self) -> Vec<Value> {
        self.textblocks()
            .into_iter()
            .flat_map(|(_, runs)| runs.iter())
            .find_map(|run| match run {
                Inline::Text { node, .. } => Some(match node.get("marks") {
                    Some(Value::Array(marks)) => marks.clone(),
                    _ => Vec::new(),
                }),
                _ => None,
            })
            .unwrap_or_default()
    }

    fn textblocks(&self) -> Vec<(&Map<String, Value>, &[Inline])> {
        fn walk<'a>(node: &'a Node, out: &mut Vec<(&'a Map<String, Value>, &'a [Inline])>) {
            match node {
                Node::Textblock { node, runs } => out.push((node, runs.as_slice())),
                Node::Container { children, .. } => children.iter().for_each(|c| walk(c, out)),
                Node::Opaque(_) => {}
            }
        }
        let mut out = Vec::new();
        walk(&self.root, &mut out);
        out
    }

    fn textblocks_mut(&mut self) -> Vec<&mut Vec<Inline>> {
        fn walk<'a>(node: &'a mut Node, out: &mut Vec<&'a mut Vec<Inline>>) {
            match node {
                Node::Textblock { runs, .. } => out.push(runs),
                Node::Container { children, .. } => {
                    for child in children.iter_mut() {
                        walk(child, out);
                    }
                }
                Node::Opaque(_) => {}
            }
        }
        let mut out = Vec::new();
        walk(&mut self.root, &mut out);
        out
    }
}

fn node_type(node: &Value) -> Option<&str> {
    node.get("type").and_then(Value::as_str)
}

fn node_type_of(node: &Map<String, Value>) -> Option<&str> {
    node.get("type").and_then(Value::as_str)
}

fn doc_node() -> Map<String, Value> {
    let mut node = Map::new();
    node.insert("type".into(), json!("doc"));
    node
}

fn text_node(marks: &[Value]) -> Map<String, Value> {
    let mut node = Map::new();
    node.insert("type".into(), json!("text"));
    if !marks.is_empty() {
        node.insert("marks".into(), Value::Array(marks.to_vec()));
    }
    node
}

fn paragraph(text: &str, text_template: &Map<String, Value>) -> Node {
    let mut node = Map::new();
    node.insert("type".into(), json!("paragraph"));
    paragraph_like(&node, text, text_template, Vec::new())
}

fn paragraph_like(
    template: &Map<String, Value>,
    text: &str,
    text_template: &Map<String, Value>,
    tail: Vec<Inline>,
) -> Node {
    let mut runs = Vec::new();
    push_text(&mut runs, text, text_template);
    runs.extend(tail);
    normalize(&mut runs);
    Node::Textblock {
        node: template.clone(),
        runs,
    }
}

fn line_text(runs: &[Inline]) -> String {
    runs.iter()
        .map(|run| match run {
            Inline::Text { text, .. } => text.as_str(),
            Inline::HardBreak(_) => "\n",
            Inline::Atom(_) => "",
        })
        .collect()
}

/// Line and column of a plain-text offset; a line end wins over the start of
/// the next line.
fn locate(widths: &[usize], mut offset: usize) -> (usize, usize) {
    for (line, width) in widths.iter().enumerate() {
        if offset <= *width {
            return (line, offset);
        }
        offset -= width + 1;
    }
    let last = widths.len() - 1;
    (last, widths[last])
}

/// Runs before and after column `col`. Zero-width atoms at the cut go right.
fn split_runs(runs: Vec<Inline>, col: usize) -> (Vec<Inline>, Vec<Inline>) {
    let mut left = Vec::new();
    let mut right = Vec::new();
    let mut pos = 0;
    for run in runs {
        let len = run.len();
        if len == 0 {
            if pos < col {
                left.push(run);
            } else {
                right.push(run);
            }
        } else if pos + len <= col {
            left.push(run);
        } else if pos >= col {
            right.push(run);
        } else if let Inline::Text { text, node } = run {
            let cut = text
                .char_indices()
                .nth(col - pos)
                .map_or(text.len(), |(index, _)| index);
            left.push(Inline::Text {
                text: text[..cut].to_string(),
                node: node.clone(),
            });
            right.push(Inline::Text {
                text: text[cut..].to_string(),
                node,
            });
        }
        pos += len;
    }
    (left, right)
}

/// Text node that new text at `col` should copy: the run typed after, else
/// the run that follows, else the stored marks.
fn inherited_text_node(runs: &[Inline], col: usize, stored: &[Value]) -> Map<String, Value> {
    let mut before = None;
    let mut after = None;
    let mut pos = 0;
    for run in runs {
        if let Inline::Text { text, node } = run {
            if !text.is_empty() {
                if pos < col {
                    before = Some(node);
                } else if after.is_none() {
                    after = Some(node);
                }
            }
        }
        pos += run.len();
    }
    before
        .or(after)
        .cloned()
        .unwrap_or_else(|| text_node(stored))
}

fn push_text(runs: &mut Vec<Inline>, text: &str, node: &Map<String, Value>) {
    if !text.is_empty() {
        runs.push(Inline::Text {
            text: text.to_string(),
            node: node.clone(),
        });
    }
}

/// Drop empty text runs and join neighbours with identical marks
fn normalize(runs: &mut Vec<Inline>) {
    let mut merged: Vec<Inline> = Vec::with_capacity(runs.len());
    for run in runs.drain(..) {
        if let Inline::Text { text, node } = &run {
            if text.is_empty() {
                continue;
            }
            if let Some(Inline::Text {
                text: previous,
                node: previous_node,
            }) = merged.last_mut()
            {
                if previous_node == node {
                    previous.push_str(text);
                    continue;
                }
            }
        }
        merged.push(run);
    }
    *runs = merged;
}

/// Remove the textblocks numbered in `doomed`, then any container that held
/// children before and holds none after.
fn prune(children: &mut Vec<Node>, line: &mut usize, doomed: &Range<usize>) {
    children.retain_mut(|child| match child {
        Node::Textblock { .. } => {
            let keep = !doomed.contains(line);
            *line += 1;
            keep
        }
        Node::Container { children, .. } => {
            let had_children = !children.is_empty();
            prune(children, line, doomed);
            !(had_children && children.is_empty())
        }
        Node::Opaque(_) => true,
    });
}

/// Insert `added` as siblings after textblock number `target`
fn insert_after(
    children: &mut Vec<Node>,
    line: &mut usize,
    target: usize,
    added: &mut Vec<Node>,
) -> bool {
    let mut index = 0;
    while index < children.len() {
        if matches!(children[index], Node::Textblock { .. }) {
            if *line == target {
                for (offset, node) in added.drain(..).enumerate() {
                    children.insert(index + 1 + offset, node);
                }
                return true;
            }
            *line += 1;
        } else if let Node::Container { children: inner, .. } = &mut children[index] {
            if insert_after(inner, line, target, added) {
                return true;
            }
        }
        index += 1;
    }
    false
}

fn render_node(node: &Node, html: &mut String) {
    match node {
        Node::Opaque(_) => {}
        Node::Container { node, children } => {
            let tag = match node_type_of(node) {
                Some("bulletList") => Some("ul"),
                Some("orderedList") => Some("ol"),
                Some("listItem") => Some("li"),
                Some("blockquote") => Some("blockquote"),
                Some("horizontalRule") => {
                    html.push_str("<hr>");
                    return;
                }
                _ => None,
            };
            if let Some(tag) = tag {
                html.push_str(&format!("<{tag}>"));
            }
            for child in children {
                render_node(child, html);
            }
            if let Some(tag) = tag {
                html.push_str(&format!("</{tag}>"));
            }
        }
        Node::Textblock { node, runs } => {
            let (open, close) = match node_type_of(node) {
                Some("heading") => {
                    let level = node
                        .get("attrs")
                        .and_then(|attrs| attrs.get("level"))
                        .and_then(Value::as_u64)
                        .unwrap_or(1)
                        .clamp(1, 6);
                    (format!("<h{level}>"), format!("</h{level}>"))
                }
                Some("codeBlock") => ("<pre><code>".to_string(), "</code></pre>".to_string()),
                _ => ("<p>".to_string(), "</p>".to_string()),
            };
            html.push_str(&open);
            if runs.iter().all(|run| run.len() == 0 && !matches!(run, Inline::Atom(_))) {
                html.push_str("<br>");
            }
            for run in runs {
                render_inline(run, html);
            }
            html.push_str(&close);
        }
    }
}

fn render_inline(run: &Inline, html: &mut String) {
    match run {
        Inline::Text { text, node } => {
            if !text.is_empty() {
                html.push_str(&wrap_marks(node.get("marks"), &html_escape::encode_text(text)));
            }
        }
        Inline::HardBreak(_) => html.push_str("<br>"),
        Inline::Atom(value) => {
            let src = value.get("attrs").and_then(|attrs| attrs.get("src"));
            if let (Some("image"), Some(Value::String(src))) = (node_type(value), src) {
                html.push_str(&format!(
                    "<img src=\"{}\">",
                    html_escape::encode_double_quoted_attribute(src)
                ));
            }
        }
    }
}

fn find_mark<'a>(raw: Option<&'a Value>, name: &str) -> Option<&'a Value> {
    raw.and_then(Value::as_array)?
        .iter()
        .find(|mark| node_type(mark) == Some(name))
}

fn wrap_marks(raw: Option<&Value>, escaped: &str) -> String {
    let marks = Marks::from_json(raw);

    let mut inner = escaped.to_string();
    if find_mark(raw, "code").is_some() {
        inner = format!("<code>{inner}</code>");
    }
    for (on, tag) in [
        (marks.underline, "u"),
        (marks.strike, "s"),
        (marks.italic, "em"),
        (marks.bold, "strong"),
    ] {
        if on {
            inner = format!("<{tag}>{inner}</{tag}>");
        }
    }
    let mut style = Vec::new();
    if let Some(color) = &marks.color {
        style.push(format!("color: {color}"));
    }
    if let Some(size) = &marks.font_size {
        style.push(format!("font-size: {size}"));
    }
    if !style.is_empty() {
        inner = format!(
            "<span style=\"{}\">{inner}</span>",
            html_escape::encode_double_quoted_attribute(&style.join("; "))
        );
    }
    let href = find_mark(raw, "link")
        .and_then(|link| link.get("attrs"))
        .and_then(|attrs| attrs.get("href"))
        .and_then(Value::as_str);
    if let Some(href) = href {
        inner = format!(
            "<a href=\"{}\">{inner}</a>",
            html_escape::encode_double_quoted_attribute(href)
        );
    }
    inner
}
