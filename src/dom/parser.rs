use std::collections::{HashMap, HashSet};

use scraper::{ElementRef, Html, Node};

use crate::dom::document::Document;
use crate::dom::dom_model::{DomTree, NodeId};

/// URL given to documents parsed from an `<iframe srcdoc>` attribute.
pub const SRCDOC_URL: &str = "about:srcdoc";

/// Parse an HTML document into a [`Document`].
pub fn parse_html(html: &str) -> Document {
    parse_html_with_url(html, None)
}

/// Parse an HTML document and record the URL it was loaded from.
///
/// Every `<iframe srcdoc="…">` becomes a child frame whose content document is
/// parsed from the attribute value. `<template>` contents are not part of the
/// live tree: they are held aside on the template element.
pub fn parse_html_with_url(html: &str, url: Option<&str>) -> Document {
    let parsed = Html::parse_document(html);
    let mut doc = Document::new();
    doc.set_url(url.map(str::to_string));

    let mut ids = HashMap::new();
    let mut inert = HashSet::new();
    let mut frames = Vec::new();

    for node in parsed.tree.root().descendants() {
        if let Some(parent) = node.parent() {
            if inert.contains(&parent.id()) || is_template(parent.value()) {
                inert.insert(node.id());
                continue;
            }
        }

        let id = match node.value() {
            Node::Document | Node::Fragment => {
                ids.insert(node.id(), doc.root());
                continue;
            }
            Node::Element(el) => {
                let attrs: Vec<(&str, &str)> = el.attrs().collect();
                let created = doc.create_element(el.name(), &attrs);
                if matches!(el.name(), "iframe" | "frame") {
                    if let Some(srcdoc) = el.attr("srcdoc") {
                        frames.push((created, srcdoc.to_string()));
                    }
                }
                if let Some(template) = ElementRef::wrap(node).filter(|_| el.name() == "template") {
                    doc.set_template_content(created, template_content(template));
                }
                created
            }
            Node::Text(text) => doc.create_text(text),
            Node::Comment(comment) => doc.create_comment(comment),
            _ => continue,
        };

        let parent = node
            .parent()
            .and_then(|p| ids.get(&p.id()).copied())
            .unwrap_or_else(|| doc.root());
        doc.append_child(parent, id);
        ids.insert(node.id(), id);
    }

    for (frame_node, srcdoc) in frames {
        let child = parse_html_with_url(&srcdoc, Some(SRCDOC_URL));
        doc.set_frame(frame_node, child);
    }

    doc
}

/// Copy the subtree under a `<template>` into a document of its own. Frames
/// inside it are left unparsed; nested templates get their own content.
fn template_content(template: ElementRef<'_>) -> Document {
    let top = *template;
    let mut content = Document::new();
    let mut ids = HashMap::new();
    let mut inert = HashSet::new();

    for node in top.descendants().skip(1) {
        if let Some(parent) = node.parent() {
            let nested = parent.id() != top.id() && is_template(parent.value());
            if nested || inert.contains(&parent.id()) {
                inert.insert(node.id());
                continue;
            }
        }

        let id = match node.value() {
            Node::Document | Node::Fragment => {
                ids.insert(node.id(), content.root());
                continue;
            }
            Node::Element(el) => {
                let attrs: Vec<(&str, &str)> = el.attrs().collect();
                let created = content.create_element(el.name(), &attrs);
                if let Some(inner) = ElementRef::wrap(node).filter(|_| el.name() == "template") {
                    content.set_template_content(created, template_content(inner));
                }
                created
            }
            Node::Text(text) => content.create_text(text),
            Node::Comment(comment) => content.create_comment(comment),
            _ => continue,
        };

        let parent = node
            .parent()
            .and_then(|p| ids.get(&p.id()).copied())
            .unwrap_or_else(|| content.root());
        content.append_child(parent, id);
        ids.insert(node.id(), id);
    }

    content
}

fn is_template(node: &Node) -> bool {
    matches!(node, Node::Element(el) if el.name() == "template")
}

/// Convenience for tests and callers that only need one element back.
pub fn first_element(doc: &Document, tag: &str) -> Option<NodeId> {
    doc.descendants(doc.root()).find(|&n| doc.has_tag(n, tag))
}
