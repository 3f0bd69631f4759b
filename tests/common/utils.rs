#![allow(dead_code)]

use form_autofill::dom::document::Document;
use form_autofill::dom::dom_model::{DomTree, NodeId};
use form_autofill::dom::parser::{parse_html, parse_html_with_url};
use form_autofill::form::extractor::extract_forms;
use form_autofill::form::form_model::{ExtractOptions, FormRecord};

pub fn doc(html: &str) -> Document {
    parse_html(html)
}

pub fn doc_at(html: &str, url: &str) -> Document {
    parse_html_with_url(html, Some(url))
}

/// First element whose `name` attribute equals `name`.
pub fn by_name(doc: &Document, name: &str) -> NodeId {
    doc.descendants(doc.root())
        .find(|&n| doc.attribute(n, "name") == Some(name))
        .unwrap_or_else(|| panic!("no element named '{}'", name))
}

/// Every element whose `name` attribute equals `name`, in document order.
pub fn all_by_name(doc: &Document, name: &str) -> Vec<NodeId> {
    doc.descendants(doc.root())
        .filter(|&n| doc.attribute(n, "name") == Some(name))
        .collect()
}

pub fn extract(html: &str) -> Vec<FormRecord> {
    extract_forms(&doc(html), &ExtractOptions::default())
}

pub fn extract_with(html: &str, options: &ExtractOptions) -> Vec<FormRecord> {
    extract_forms(&doc(html), options)
}

/// `count` text inputs named `{prefix}0`, `{prefix}1`, …
pub fn text_inputs(prefix: &str, count: usize) -> String {
    (0..count)
        .map(|i| format!("<input name=\"{}{}\">", prefix, i))
        .collect()
}

pub fn temp_path(name: &str) -> String {
    let dir = std::env::temp_dir().join("form-autofill-tests");
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir.join(format!("{}-{}", std::process::id(), name))
        .display()
        .to_string()
}
