use reqwest::Url;

use crate::form::form_model::FieldRecord;

/// 64-bit structural signature of a form: the first eight bytes of the SHA-1
/// digest of `scheme://host&name&field&field…`, as a decimal string.
///
/// Checkable fields are left out so that forms differing only in their
/// checkboxes share a signature.
pub fn form_signature(origin: &str, form_name: &str, fields: &[FieldRecord]) -> String {
    use sha1::{Digest, Sha1};

    let scheme_host = match Url::parse(origin) {
        Ok(url) => format!("{}://{}", url.scheme(), url.host_str().unwrap_or("")),
        Err(_) => origin.to_string(),
    };

    let mut form_string = format!("{scheme_host}&{form_name}");
    for field in fields.iter().filter(|f| !f.is_checkable) {
        form_string.push('&');
        form_string.push_str(&field.name);
    }

    let mut hasher = Sha1::new();
    hasher.update(form_string.as_bytes());
    let digest = hasher.finalize();

    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(prefix).to_string()
}

/// Document URL with query and fragment removed.
pub fn strip_query_and_fragment(url: &str) -> String {
    match Url::parse(url) {
        Ok(mut parsed) => {
            parsed.set_query(None);
            parsed.set_fragment(None);
            parsed.to_string()
        }
        Err(_) => url
            .split(['?', '#'])
            .next()
            .unwrap_or("")
            .to_string(),
    }
}

/// Resolve a form's `action` against the document URL. An empty action means
/// the form posts back to its own document.
pub fn resolve_action(document_url: Option<&str>, action: Option<&str>) -> String {
    let action = action.map(str::trim).unwrap_or("");
    let Some(base) = document_url else {
        return action.to_string();
    };
    if action.is_empty() {
        return strip_query_and_fragment(base);
    }
    match Url::parse(base).and_then(|b| b.join(action)) {
        Ok(resolved) => resolved.to_string(),
        Err(_) => action.to_string(),
    }
}
