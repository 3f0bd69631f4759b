use crate::dom::document::{Document, NodeData};
use crate::dom::dom_model::{DomTree, NodeId};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Serialize a document back to HTML.
///
/// Live control state is written out as markup: input values become the
/// `value` attribute, textarea values replace the element's text, and
/// checkedness / selectedness become `checked` / `selected` attributes.
pub fn serialize(doc: &Document) -> String {
    let mut out = String::new();
    write_children(doc, doc.root(), &mut out);
    out
}

enum Step {
    Open(NodeId),
    Close(NodeId),
}

/// Write the children of `parent` in document order. The walk keeps its own
/// stack so nesting depth is bounded by memory, not by the call stack.
fn write_children(doc: &Document, parent: NodeId, out: &mut String) {
    let mut stack: Vec<Step> = doc.children(parent).map(Step::Open).collect();
    stack.reverse();

    while let Some(step) = stack.pop() {
        let node = match step {
            Step::Open(node) => node,
            Step::Close(node) => {
                if let Some(tag) = doc.tag_name(node) {
                    out.push_str("</");
                    out.push_str(tag);
                    out.push('>');
                }
                continue;
            }
        };

        match doc.data(node) {
            NodeData::Document => {}
            NodeData::Text(text) => {
                let raw = doc
                    .parent(node)
                    .and_then(|p| doc.tag_name(p))
                    .map(|t| RAW_TEXT_ELEMENTS.contains(&t))
                    .unwrap_or(false);
                if raw {
                    out.push_str(text);
                } else {
                    out.push_str(&escape_text(text));
                }
            }
            NodeData::Comment(text) => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
            NodeData::Element(el) => {
                write_open_tag(doc, node, &el.tag, out);
                if VOID_ELEMENTS.contains(&el.tag.as_str()) {
                    continue;
                }

                stack.push(Step::Close(node));
                match (el.tag.as_str(), &el.value, &el.template_content) {
                    ("textarea", Some(value), _) => out.push_str(&escape_text(value)),
                    (_, _, Some(content)) => write_children(content, content.root(), out),
                    _ => {
                        let first = stack.len();
                        stack.extend(doc.children(node).map(Step::Open));
                        stack[first..].reverse();
                    }
                }
            }
        }
    }
}

fn write_open_tag(doc: &Document, node: NodeId, tag: &str, out: &mut String) {
    out.push('<');
    out.push_str(tag);
    for (name, value) in reflected_attributes(doc, node) {
        out.push(' ');
        out.push_str(&name);
        out.push_str("=\"");
        out.push_str(&escape_attr(&value));
        out.push('"');
    }
    out.push('>');
}

fn reflected_attributes(doc: &Document, node: NodeId) -> Vec<(String, String)> {
    let Some(el) = doc.element(node) else {
        return Vec::new();
    };
    let mut attrs = el.attrs.clone();

    if el.tag == "input" {
        if let Some(value) = &el.value {
            set(&mut attrs, "value", Some(value.clone()));
        }
        if let Some(checked) = el.checked {
            set(&mut attrs, "checked", checked.then(String::new));
        }
    }
    if el.tag == "option" {
        if let Some(selected) = el.selected {
            set(&mut attrs, "selected", selected.then(String::new));
        }
    }

    attrs
}

fn set(attrs: &mut Vec<(String, String)>, name: &str, value: Option<String>) {
    attrs.retain(|(k, _)| k != name);
    if let Some(v) = value {
        attrs.push((name.to_string(), v));
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}
