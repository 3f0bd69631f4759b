use serde::{Deserialize, Serialize};

use crate::form::fill::{ClearOutcome, FillOutcome};
use crate::form::form_model::{FormRecord, ScanResult};

// ============================================================================
// Scan report: what one extraction found on one page
// ============================================================================

/// Report of a single extraction run.
///
/// Built from a [`ScanResult`] via `from_scan()`. Consumed by the console
/// reporter and serialized as-is for `--format json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    /// File path or URL the page came from
    pub source: String,

    /// Forms reported (the unowned pseudo-form included)
    pub total_forms: usize,

    /// Fields across all reported forms
    pub total_fields: usize,

    /// Whether the scan stopped at the field limit
    pub field_cap_reached: bool,

    /// Frames scanned, the top-level document included
    pub frames_scanned: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u128>,

    pub forms: Vec<FormRecord>,
}

impl ScanReport {
    pub fn from_scan(source: &str, scan: ScanResult) -> Self {
        let total_fields = scan.forms.iter().map(|f| f.fields.len()).sum();
        Self {
            source: source.to_string(),
            total_forms: scan.forms.len(),
            total_fields,
            field_cap_reached: scan.stats.field_cap_reached,
            frames_scanned: scan.stats.frames_scanned,
            duration_ms: None,
            forms: scan.forms,
        }
    }

    pub fn with_duration(mut self, duration_ms: u128) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }
}

// ============================================================================
// Fill / clear reports
// ============================================================================

/// Report of a fill or clear run; `fields` lists the touched controls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FillReport {
    pub source: String,
    /// `fill` or `clear`
    pub operation: String,
    pub form: String,
    pub form_found: bool,
    pub fields: Vec<String>,
}

impl FillReport {
    pub fn from_fill(source: &str, form: &str, outcome: FillOutcome) -> Self {
        Self {
            source: source.to_string(),
            operation: "fill".to_string(),
            form: form.to_string(),
            form_found: outcome.form_found,
            fields: outcome.filled,
        }
    }

    pub fn from_clear(source: &str, form: &str, outcome: ClearOutcome) -> Self {
        Self {
            source: source.to_string(),
            operation: "clear".to_string(),
            form: form.to_string(),
            form_found: outcome.form_found,
            fields: outcome.cleared,
        }
    }
}
