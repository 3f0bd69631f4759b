use crate::form::form_model::{FieldRecord, FormRecord, LabelSource};
use crate::report::report_model::{FillReport, ScanReport};

// ============================================================================
// Console reporter: formatted terminal output
// ============================================================================

/// Format a scan report for terminal output.
///
/// Produces output like:
/// ```text
/// === Forms: page.html ===
///
/// form "signup" (post https://example.com/join) [sig 1234567890]
///     text      name="first"   label="First name"  (label_tag)
///     select    name="country" label="Country"     (previous_sibling)
///
/// === Results: 1 forms, 2 fields ===
/// ```
pub fn format_console_report(report: &ScanReport) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== Forms: {} ===\n\n", report.source));

    if report.forms.is_empty() {
        out.push_str("(no forms worth autofilling)\n");
    }

    for form in &report.forms {
        out.push_str(&format_form_header(form));
        for field in &form.fields {
            out.push_str(&format_field_line(field));
        }
        out.push('\n');
    }

    out.push_str(&format!(
        "=== Results: {} forms, {} fields",
        report.total_forms, report.total_fields
    ));
    if report.field_cap_reached {
        out.push_str(" (field limit reached)");
    }
    if let Some(ms) = report.duration_ms {
        out.push_str(&format!(" in {}ms", ms));
    }
    out.push_str(" ===\n");

    out
}

/// One-line summary of a fill or clear run.
pub fn format_fill_summary(report: &FillReport) -> String {
    let target = display_form_name(&report.form);
    if !report.form_found {
        return format!("{}: form {} not found\n", report.operation, target);
    }
    let verb = if report.operation == "clear" {
        "cleared"
    } else {
        "filled"
    };
    let mut out = format!("{}: {} {} field(s) in form {}\n", report.operation, verb, report.fields.len(), target);
    for name in &report.fields {
        out.push_str(&format!("    {}\n", name));
    }
    out
}

fn format_form_header(form: &FormRecord) -> String {
    if form.is_form_tag {
        format!(
            "form {} ({} {}) [sig {}]\n",
            display_form_name(&form.name),
            form.method,
            form.action,
            form.signature
        )
    } else {
        format!("unowned controls [sig {}]\n", form.signature)
    }
}

fn format_field_line(field: &FieldRecord) -> String {
    let mut line = format!(
        "    {:<10} name=\"{}\" label=\"{}\"",
        field.form_control_type, field.name, field.label
    );
    if field.label_source != LabelSource::None {
        line.push_str(&format!("  ({})", label_source_name(field.label_source)));
    }
    if !field.autocomplete_attribute.is_empty() {
        line.push_str(&format!(" autocomplete={}", field.autocomplete_attribute));
    }
    if field.is_autofilled {
        line.push_str(" [autofilled]");
    }
    line.push('\n');
    line
}

fn display_form_name(name: &str) -> String {
    if name.is_empty() {
        "(unnamed)".to_string()
    } else {
        format!("\"{}\"", name)
    }
}

fn label_source_name(source: LabelSource) -> &'static str {
    match source {
        LabelSource::None => "none",
        LabelSource::LabelTag => "label_tag",
        LabelSource::NextSibling => "next_sibling",
        LabelSource::PreviousSibling => "previous_sibling",
        LabelSource::Placeholder => "placeholder",
        LabelSource::DivTable => "div_table",
        LabelSource::TableColumn => "table_column",
        LabelSource::TableRow => "table_row",
        LabelSource::DefinitionList => "definition_list",
        LabelSource::ListItem => "list_item",
    }
}
