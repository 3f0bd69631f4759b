use std::collections::HashMap;
use std::io::Read;

use crate::dom::document::Document;
use crate::dom::parser::parse_html_with_url;
use crate::page::error::AutofillError;

/// Where a page comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageSource {
    /// A local file; `-` reads stdin.
    File(String),
    Url(String),
}

impl PageSource {
    /// Pick the source from the mutually exclusive `input` / `url` arguments.
    pub fn from_args(input: Option<&str>, url: Option<&str>) -> Result<Self, AutofillError> {
        match (input, url) {
            (Some(path), None) => Ok(PageSource::File(path.to_string())),
            (None, Some(url)) => Ok(PageSource::Url(url.to_string())),
            (Some(_), Some(_)) => Err(AutofillError::InvalidInput(
                "give either an input file or --url, not both".to_string(),
            )),
            (None, None) => Err(AutofillError::InvalidInput(
                "no input file or --url given".to_string(),
            )),
        }
    }

    pub fn describe(&self) -> &str {
        match self {
            PageSource::File(path) => path,
            PageSource::Url(url) => url,
        }
    }
}

/// Raw HTML of `source`.
pub fn read_html(source: &PageSource) -> Result<String, AutofillError> {
    match source {
        PageSource::File(path) if path == "-" => {
            let mut html = String::new();
            std::io::stdin()
                .read_to_string(&mut html)
                .map_err(|e| AutofillError::Io {
                    path: "<stdin>".to_string(),
                    source: e,
                })?;
            Ok(html)
        }
        PageSource::File(path) => std::fs::read_to_string(path).map_err(|e| AutofillError::Io {
            path: path.clone(),
            source: e,
        }),
        PageSource::Url(url) => fetch(url),
    }
}

/// Parse `source` into a document. Pages fetched over HTTP carry their URL so
/// form actions and signatures resolve against it; `base_url` overrides it.
pub fn load_document(source: &PageSource, base_url: Option<&str>) -> Result<Document, AutofillError> {
    let html = read_html(source)?;
    let url = match (base_url, source) {
        (Some(base), _) => Some(base),
        (None, PageSource::Url(url)) => Some(url.as_str()),
        (None, PageSource::File(_)) => None,
    };
    Ok(parse_html_with_url(&html, url))
}

fn fetch(url: &str) -> Result<String, AutofillError> {
    let wrap = |e| AutofillError::Fetch {
        url: url.to_string(),
        source: e,
    };
    let response = reqwest::blocking::get(url).map_err(wrap)?;
    let response = response.error_for_status().map_err(wrap)?;
    response.text().map_err(wrap)
}

/// Fill values as a flat `name: value` mapping (YAML or JSON).
pub fn parse_fill_values(content: &str) -> Result<HashMap<String, String>, AutofillError> {
    serde_yaml::from_str(content).map_err(|e| AutofillError::ValueParse {
        context: "fill values".to_string(),
        source: e,
    })
}

/// Predicted field types keyed by form then field name (YAML or JSON).
pub fn parse_predictions(
    content: &str,
) -> Result<HashMap<String, HashMap<String, String>>, AutofillError> {
    serde_yaml::from_str(content).map_err(|e| AutofillError::ValueParse {
        context: "prediction data".to_string(),
        source: e,
    })
}

pub fn read_file(path: &str) -> Result<String, AutofillError> {
    std::fs::read_to_string(path).map_err(|e| AutofillError::Io {
        path: path.to_string(),
        source: e,
    })
}

pub fn write_file(path: &str, content: &str) -> Result<(), AutofillError> {
    std::fs::write(path, content).map_err(|e| AutofillError::Io {
        path: path.to_string(),
        source: e,
    })
}
