use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::form::form_model::ScanStats;

#[derive(Debug, Serialize)]
pub struct TraceEvent {
    pub timestamp_ms: u128,

    /// `extract`, `fill` or `clear`.
    pub operation: String,
    pub source: String,

    pub form: Option<String>,
    pub forms_reported: Option<usize>,
    pub fields: Option<usize>,
    pub field_cap_reached: Option<bool>,

    pub touched: Vec<String>,
    pub outcome: Option<String>,
}

impl TraceEvent {
    pub fn now(operation: &str, source: &str) -> Self {
        Self {
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or(0),
            operation: operation.to_string(),
            source: source.to_string(),
            form: None,
            forms_reported: None,
            fields: None,
            field_cap_reached: None,
            touched: vec![],
            outcome: None,
        }
    }

    pub fn with_stats(mut self, stats: &ScanStats) -> Self {
        self.forms_reported = Some(stats.forms_reported);
        self.fields = Some(stats.fields_extracted);
        self.field_cap_reached = Some(stats.field_cap_reached);
        self
    }

    pub fn with_form(mut self, form: impl ToString) -> Self {
        self.form = Some(form.to_string());
        self
    }

    pub fn with_touched(mut self, names: &[String]) -> Self {
        self.touched = names.to_vec();
        self
    }

    pub fn with_outcome(mut self, outcome: impl ToString) -> Self {
        self.outcome = Some(outcome.to_string());
        self
    }
}
