use serde::{Deserialize, Serialize};

// ============================================================================
// Limits
// ============================================================================

/// Maximum length kept for labels, values and autocomplete attributes.
pub const MAX_DATA_LENGTH: usize = 1024;

/// Maximum number of fields extracted in one scan.
pub const MAX_PARSEABLE_FIELDS: usize = 100;

/// `max_length` reported for text inputs without a usable `maxlength`.
pub const DEFAULT_MAX_LENGTH: u32 = 524_288;

/// Reported instead of an autocomplete attribute longer than
/// [`MAX_DATA_LENGTH`].
pub const AUTOCOMPLETE_TOO_LONG: &str = "x-max-data-length-exceeded";

/// Attribute the fill engine renders on autofilled controls.
pub const AUTOFILLED_ATTRIBUTE: &str = "autofilled";

// ============================================================================
// Records handed to the host
// ============================================================================

/// One logical form: a `<form>` element, or the pseudo-form grouping every
/// fillable control that has no form owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormRecord {
    /// Form identifier, empty for the unowned pseudo-form.
    pub name: String,
    pub method: String,
    /// Document URL without query and fragment.
    pub origin: String,
    pub action: String,
    pub fields: Vec<FieldRecord>,
    pub is_form_tag: bool,

    /// 64-bit structural signature, rendered in decimal.
    pub signature: String,
}

impl FormRecord {
    pub fn field(&self, name: &str) -> Option<&FieldRecord> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn has_autocomplete_attribute(&self) -> bool {
        self.fields.iter().any(|f| !f.autocomplete_attribute.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRecord {
    /// `name` attribute, falling back to `id`.
    pub name: String,
    pub id_attribute: String,
    pub form_control_type: String,
    pub autocomplete_attribute: String,
    pub placeholder: String,
    pub max_length: u32,

    pub is_autofilled: bool,
    pub is_checkable: bool,
    pub is_checked: bool,
    pub is_focusable: bool,
    pub should_autocomplete: bool,
    pub role: FieldRole,

    pub label: String,
    pub label_source: LabelSource,
    pub value: String,

    pub option_values: Vec<String>,
    pub option_contents: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldRole {
    Presentation,
    Other,
}

/// Where a field's label came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelSource {
    None,
    LabelTag,
    NextSibling,
    PreviousSibling,
    Placeholder,
    DivTable,
    TableColumn,
    TableRow,
    DefinitionList,
    ListItem,
}

/// Label text together with the heuristic that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferredLabel {
    pub text: String,
    pub source: LabelSource,
}

impl InferredLabel {
    pub fn none() -> Self {
        Self {
            text: String::new(),
            source: LabelSource::None,
        }
    }

    pub fn new(text: String, source: LabelSource) -> Self {
        if text.is_empty() {
            Self::none()
        } else {
            Self { text, source }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

// ============================================================================
// Extraction options
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractOptions {
    /// Editable fields a form needs to be reported when none of its fields
    /// carries an autocomplete attribute.
    #[serde(default = "default_min_required_fields")]
    pub min_required_fields: usize,

    #[serde(default = "default_max_fields")]
    pub max_fields: usize,

    #[serde(default = "default_max_data_length")]
    pub max_data_length: usize,

    #[serde(default = "default_true")]
    pub extract_values: bool,

    /// Report a select's value as the text of its selected option.
    #[serde(default)]
    pub extract_option_text: bool,

    #[serde(default = "default_true")]
    pub extract_options: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            min_required_fields: default_min_required_fields(),
            max_fields: MAX_PARSEABLE_FIELDS,
            max_data_length: MAX_DATA_LENGTH,
            extract_values: true,
            extract_option_text: false,
            extract_options: true,
        }
    }
}

impl ExtractOptions {
    pub fn with_min_required_fields(mut self, min: usize) -> Self {
        self.min_required_fields = min;
        self
    }

    pub fn with_max_fields(mut self, max: usize) -> Self {
        self.max_fields = max;
        self
    }
}

fn default_min_required_fields() -> usize { 3 }
fn default_max_fields() -> usize { MAX_PARSEABLE_FIELDS }
fn default_max_data_length() -> usize { MAX_DATA_LENGTH }
fn default_true() -> bool { true }

// ============================================================================
// Scan statistics
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanStats {
    /// Forms (including unowned pseudo-forms) that produced fields.
    pub forms_seen: usize,
    pub forms_reported: usize,
    pub fields_extracted: usize,
    pub frames_scanned: usize,
    pub field_cap_reached: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScanResult {
    pub forms: Vec<FormRecord>,
    pub stats: ScanStats,
}
