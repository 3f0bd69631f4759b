use std::fmt;

#[derive(Debug)]
pub enum AutofillError {
    /// Reading or writing a local file (or stdin) failed
    Io { path: String, source: std::io::Error },

    /// Fetching a page over HTTP failed
    Fetch { url: String, source: reqwest::Error },

    /// Fill values could not be parsed as a YAML/JSON mapping
    ValueParse { context: String, source: serde_yaml::Error },

    /// JSON serialization of a report failed
    JsonSerialize { context: String, source: serde_json::Error },

    /// No form with the requested identifier exists in the document
    FormNotFound(String),

    /// Arguments that cannot be acted on
    InvalidInput(String),
}

impl fmt::Display for AutofillError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AutofillError::Io { path, source } => {
                write!(f, "I/O error on '{}': {}", path, source)
            }
            AutofillError::Fetch { url, source } => {
                write!(f, "Failed to fetch {}: {}", url, source)
            }
            AutofillError::ValueParse { context, source } => {
                write!(f, "Value parse error ({}): {}", context, source)
            }
            AutofillError::JsonSerialize { context, source } => {
                write!(f, "JSON serialize error ({}): {}", context, source)
            }
            AutofillError::FormNotFound(name) => {
                write!(f, "Form '{}' not found", name)
            }
            AutofillError::InvalidInput(msg) => {
                write!(f, "Invalid input: {}", msg)
            }
        }
    }
}

impl std::error::Error for AutofillError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AutofillError::Io { source, .. } => Some(source),
            AutofillError::Fetch { source, .. } => Some(source),
            AutofillError::ValueParse { source, .. } => Some(source),
            AutofillError::JsonSerialize { source, .. } => Some(source),
            _ => None,
        }
    }
}
