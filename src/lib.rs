pub mod cli;
pub mod dom;
pub mod form;
pub mod page;
pub mod report;
pub mod trace;

use crate::dom::parser::parse_html_with_url;
use crate::form::extractor::extract_forms;
use crate::form::form_model::{ExtractOptions, FormRecord};

/// Parse `html` and extract its forms with the default options.
pub fn scan_page(html: &str, url: Option<&str>) -> Vec<FormRecord> {
    let doc = parse_html_with_url(html, url);
    extract_forms(&doc, &ExtractOptions::default())
}
