use std::collections::HashMap;

use crate::dom::document::Document;
use crate::dom::dom_model::NodeId;
use crate::dom::serializer::serialize;
use crate::form::classifier::{is_autofillable_element, name_for_autofill};
use crate::form::extractor::{
    extract_forms_with_stats, find_form_by_identifier, form_control_elements,
    unowned_autofillable_elements,
};
use crate::form::fill::{FieldFill, FillEngine, FillOutcome, NoopSink, fill_prediction_data};
use crate::form::form_model::ExtractOptions;
use crate::page::error::AutofillError;
use crate::page::loader::{
    PageSource, load_document, parse_fill_values, parse_predictions, read_file, write_file,
};
use crate::report::console::{format_console_report, format_fill_summary};
use crate::report::report_model::{FillReport, ScanReport};
use crate::trace::logger::TraceLogger;
use crate::trace::trace::TraceEvent;

// ============================================================================
// extract subcommand
// ============================================================================

/// Extract forms from a page and print (or write) the report.
pub fn cmd_extract(
    source: &PageSource,
    base_url: Option<&str>,
    options: &ExtractOptions,
    format: &str,
    output: Option<&str>,
    verbose: u8,
    tracer: &TraceLogger,
) -> Result<ScanReport, Box<dyn std::error::Error>> {
    if verbose > 0 {
        eprintln!(
            "Extracting forms from {} (min_fields={}, max_fields={})...",
            source.describe(),
            options.min_required_fields,
            options.max_fields
        );
    }

    let start = std::time::Instant::now();
    let doc = load_document(source, base_url)?;
    let engine = FillEngine::from_document(&doc);
    let scan = extract_forms_with_stats(&doc, options, Some(engine.state()));
    let duration = start.elapsed().as_millis();

    if verbose > 1 {
        eprintln!(
            "  scanned {} frame(s), saw {} form(s), kept {}",
            scan.stats.frames_scanned, scan.stats.forms_seen, scan.stats.forms_reported
        );
    }

    tracer.log(
        &TraceEvent::now("extract", source.describe())
            .with_stats(&scan.stats)
            .with_outcome(format!("{} form(s)", scan.forms.len())),
    );

    let report = ScanReport::from_scan(source.describe(), scan).with_duration(duration);

    let output_content = match format {
        "json" => to_json(&report, "scan report")?,
        _ => format_console_report(&report),
    };
    emit(output, &output_content)?;

    Ok(report)
}

// ============================================================================
// fill subcommand
// ============================================================================

/// What the fill subcommand should write into the page.
#[derive(Debug, Default)]
pub struct FillRequest<'a> {
    pub form: &'a str,
    pub values: HashMap<String, String>,
    pub force: Option<&'a str>,
    pub field: Option<&'a str>,
    pub predictions: HashMap<String, HashMap<String, String>>,
}

impl<'a> FillRequest<'a> {
    /// Read the value and prediction files named on the command line.
    pub fn from_files(
        form: &'a str,
        values_path: Option<&str>,
        predictions_path: Option<&str>,
        force: Option<&'a str>,
        field: Option<&'a str>,
    ) -> Result<Self, AutofillError> {
        if values_path.is_none() && predictions_path.is_none() {
            return Err(AutofillError::InvalidInput(
                "fill needs --values and/or --predictions".to_string(),
            ));
        }
        let values = match values_path {
            Some(path) => parse_fill_values(&read_file(path)?)?,
            None => HashMap::new(),
        };
        let predictions = match predictions_path {
            Some(path) => parse_predictions(&read_file(path)?)?,
            None => HashMap::new(),
        };
        Ok(Self {
            form,
            values,
            force,
            field,
            predictions,
        })
    }
}

/// Fill `doc` in place. Predictions are applied first, then either the
/// single `field` or the whole form.
pub fn fill_page(
    doc: &mut Document,
    source: &str,
    request: &FillRequest<'_>,
) -> Result<FillReport, AutofillError> {
    let mut engine = FillEngine::from_document(doc);

    if !request.predictions.is_empty() {
        fill_prediction_data(doc, &request.predictions);
    }

    let outcome = match request.field {
        Some(field) => fill_single_field(&mut engine, doc, request, field)?,
        None if !request.values.is_empty() => {
            engine.fill_form(doc, request.form, &request.values, request.force, &mut NoopSink)
        }
        None => FillOutcome {
            form_found: request.form.is_empty() || find_form_by_identifier(doc, request.form).is_some(),
            filled: Vec::new(),
        },
    };

    if !outcome.form_found {
        return Err(AutofillError::FormNotFound(request.form.to_string()));
    }
    Ok(FillReport::from_fill(source, request.form, outcome))
}

fn fill_single_field(
    engine: &mut FillEngine,
    doc: &mut Document,
    request: &FillRequest<'_>,
    field: &str,
) -> Result<FillOutcome, AutofillError> {
    let value = request.values.get(field).cloned().ok_or_else(|| {
        AutofillError::InvalidInput(format!("no value given for field '{}'", field))
    })?;

    let Some(control) = find_control(doc, request.form, field)? else {
        return Err(AutofillError::InvalidInput(format!(
            "form has no fillable field '{}'",
            field
        )));
    };

    let fill = FieldFill {
        name: field.to_string(),
        value,
        max_length: None,
        is_checked: false,
    };
    let filled = if engine.fill_form_field(doc, control, &fill, &mut NoopSink) {
        vec![field.to_string()]
    } else {
        Vec::new()
    };
    Ok(FillOutcome {
        form_found: true,
        filled,
    })
}

fn find_control(doc: &Document, form: &str, field: &str) -> Result<Option<NodeId>, AutofillError> {
    let controls = if form.is_empty() {
        unowned_autofillable_elements(doc).0
    } else {
        let node = find_form_by_identifier(doc, form)
            .ok_or_else(|| AutofillError::FormNotFound(form.to_string()))?;
        form_control_elements(doc, node)
    };
    Ok(controls
        .into_iter()
        .find(|&c| is_autofillable_element(doc, c) && name_for_autofill(doc, c) == field))
}

pub fn cmd_fill(
    source: &PageSource,
    request: &FillRequest<'_>,
    format: &str,
    output: Option<&str>,
    verbose: u8,
    tracer: &TraceLogger,
) -> Result<FillReport, Box<dyn std::error::Error>> {
    let mut doc = load_document(source, None)?;

    if verbose > 0 {
        eprintln!(
            "Filling form {:?} in {} with {} value(s)...",
            request.form,
            source.describe(),
            request.values.len()
        );
    }

    let result = fill_page(&mut doc, source.describe(), request);
    let event = TraceEvent::now("fill", source.describe()).with_form(request.form);
    let report = match result {
        Ok(report) => {
            tracer.log(&event.with_touched(&report.fields).with_outcome("ok"));
            report
        }
        Err(e) => {
            tracer.log(&event.with_outcome(&e));
            return Err(e.into());
        }
    };

    emit(output, &serialize(&doc))?;
    eprint!("{}", format_summary(&report, format)?);
    Ok(report)
}

// ============================================================================
// clear subcommand
// ============================================================================

pub fn cmd_clear(
    source: &PageSource,
    form: &str,
    format: &str,
    output: Option<&str>,
    verbose: u8,
    tracer: &TraceLogger,
) -> Result<FillReport, Box<dyn std::error::Error>> {
    let mut doc = load_document(source, None)?;
    let mut engine = FillEngine::from_document(&doc);

    if verbose > 0 {
        eprintln!(
            "Clearing {} autofilled field(s) in {}...",
            engine.state().autofilled_count(),
            source.describe()
        );
    }

    let outcome = engine.clear_autofilled_fields(&mut doc, form, &mut NoopSink);
    let event = TraceEvent::now("clear", source.describe()).with_form(form);
    if !outcome.form_found {
        let err = AutofillError::FormNotFound(form.to_string());
        tracer.log(&event.with_outcome(&err));
        return Err(err.into());
    }
    tracer.log(&event.with_touched(&outcome.cleared).with_outcome("ok"));

    let report = FillReport::from_clear(source.describe(), form, outcome);
    emit(output, &serialize(&doc))?;
    eprint!("{}", format_summary(&report, format)?);
    Ok(report)
}

// ============================================================================
// Helpers
// ============================================================================

fn format_summary(report: &FillReport, format: &str) -> Result<String, AutofillError> {
    match format {
        "json" => Ok(format!("{}\n", to_json(report, "fill report")?)),
        _ => Ok(format_fill_summary(report)),
    }
}

fn to_json<T: serde::Serialize>(value: &T, context: &str) -> Result<String, AutofillError> {
    serde_json::to_string_pretty(value).map_err(|e| AutofillError::JsonSerialize {
        context: context.to_string(),
        source: e,
    })
}

/// Write to `path`, or print to stdout.
fn emit(path: Option<&str>, content: &str) -> Result<(), AutofillError> {
    match path {
        Some(path) => write_file(path, content),
        None => {
            print!("{}", content);
            Ok(())
        }
    }
}
