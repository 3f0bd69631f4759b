mod common;

use std::collections::HashMap;

use clap::Parser;
use form_autofill::cli::commands::{FillRequest, cmd_clear, cmd_extract, cmd_fill, fill_page};
use form_autofill::cli::config::{
    AppConfig, Cli, Commands, build_extract_options, load_config, parse_config, resolve_format,
};
use form_autofill::dom::dom_model::DomTree;
use form_autofill::page::error::AutofillError;
use form_autofill::page::loader::{PageSource, parse_fill_values, parse_predictions};
use form_autofill::trace::logger::TraceLogger;

use crate::common::utils::{by_name, doc, temp_path, text_inputs};

// ============================================================================
// CLI Argument Parsing Tests
// ============================================================================

#[test]
fn cli_parse_extract_minimal() {
    let cli = Cli::parse_from(["form-autofill", "extract", "page.html"]);
    match cli.command {
        Commands::Extract {
            input,
            url,
            min_fields,
            format,
            output,
            option_text,
            ..
        } => {
            assert_eq!(input.as_deref(), Some("page.html"));
            assert!(url.is_none());
            assert!(min_fields.is_none());
            assert!(format.is_none());
            assert!(output.is_none());
            assert!(!option_text);
        }
        _ => panic!("Expected Extract command"),
    }
    assert_eq!(cli.verbose, 0);
}

#[test]
fn cli_parse_extract_all_args() {
    let cli = Cli::parse_from([
        "form-autofill",
        "-vv",
        "--trace",
        "trace.jsonl",
        "extract",
        "--url",
        "https://example.com",
        "--base-url",
        "https://example.com/base",
        "--min-fields",
        "1",
        "--max-fields",
        "20",
        "--option-text",
        "--format",
        "json",
        "-o",
        "out.json",
    ]);
    assert_eq!(cli.verbose, 2);
    assert_eq!(cli.trace.as_deref(), Some("trace.jsonl"));
    match cli.command {
        Commands::Extract {
            input,
            url,
            base_url,
            min_fields,
            max_fields,
            option_text,
            format,
            output,
        } => {
            assert!(input.is_none());
            assert_eq!(url.as_deref(), Some("https://example.com"));
            assert_eq!(base_url.as_deref(), Some("https://example.com/base"));
            assert_eq!(min_fields, Some(1));
            assert_eq!(max_fields, Some(20));
            assert!(option_text);
            assert_eq!(format.as_deref(), Some("json"));
            assert_eq!(output.as_deref(), Some("out.json"));
        }
        _ => panic!("Expected Extract command"),
    }
}

#[test]
fn cli_parse_fill() {
    let cli = Cli::parse_from([
        "form-autofill",
        "fill",
        "page.html",
        "--form",
        "signup",
        "--values",
        "values.yaml",
        "--force",
        "email",
    ]);
    match cli.command {
        Commands::Fill {
            input,
            form,
            values,
            force,
            field,
            predictions,
            ..
        } => {
            assert_eq!(input, "page.html");
            assert_eq!(form, "signup");
            assert_eq!(values.as_deref(), Some("values.yaml"));
            assert_eq!(force.as_deref(), Some("email"));
            assert!(field.is_none());
            assert!(predictions.is_none());
        }
        _ => panic!("Expected Fill command"),
    }
}

#[test]
fn cli_parse_clear_defaults_to_unowned_form() {
    let cli = Cli::parse_from(["form-autofill", "clear", "filled.html"]);
    match cli.command {
        Commands::Clear { input, form, .. } => {
            assert_eq!(input, "filled.html");
            assert_eq!(form, "");
        }
        _ => panic!("Expected Clear command"),
    }
}

// ============================================================================
// Config
// ============================================================================

#[test]
fn missing_config_file_gives_defaults() {
    let config = load_config(Some("/nonexistent/form-autofill.yaml"));
    assert_eq!(config.extract.min_required_fields, 3);
    assert_eq!(config.extract.max_fields, 100);
    assert_eq!(config.output.format, "console");
    assert!(config.output.trace.is_none());
}

#[test]
fn partial_config_fills_in_defaults() {
    let config = parse_config("extract:\n  min_required_fields: 1\noutput:\n  format: json\n");
    assert_eq!(config.extract.min_required_fields, 1);
    assert_eq!(config.extract.max_fields, 100, "unset keys keep their defaults");
    assert!(config.extract.extract_values);
    assert_eq!(config.output.format, "json");
}

#[test]
fn malformed_config_gives_defaults() {
    let config = parse_config("extract: [not, a, mapping");
    assert_eq!(config.extract.min_required_fields, 3);
}

#[test]
fn cli_flags_override_config() {
    let config = parse_config("extract:\n  min_required_fields: 5\n  max_fields: 50\n");

    let from_config = build_extract_options(&config, None, None, false);
    assert_eq!(from_config.min_required_fields, 5);
    assert_eq!(from_config.max_fields, 50);

    let overridden = build_extract_options(&config, Some(2), Some(10), true);
    assert_eq!(overridden.min_required_fields, 2);
    assert_eq!(overridden.max_fields, 10);
    assert!(overridden.extract_option_text);

    let defaults = AppConfig::default();
    assert_eq!(resolve_format(&defaults, None), "console");
    assert_eq!(resolve_format(&defaults, Some("json")), "json");
}

// ============================================================================
// Page sources and value files
// ============================================================================

#[test]
fn page_source_requires_exactly_one_input() {
    assert_eq!(
        PageSource::from_args(Some("a.html"), None).ok(),
        Some(PageSource::File("a.html".to_string()))
    );
    assert_eq!(
        PageSource::from_args(None, Some("https://x.test")).ok(),
        Some(PageSource::Url("https://x.test".to_string()))
    );
    assert!(matches!(
        PageSource::from_args(Some("a.html"), Some("https://x.test")),
        Err(AutofillError::InvalidInput(_))
    ));
    assert!(matches!(PageSource::from_args(None, None), Err(AutofillError::InvalidInput(_))));
}

#[test]
fn fill_values_parse_from_yaml_and_json() {
    let yaml = parse_fill_values("first: Ada\nlast: Lovelace\n").expect("yaml mapping");
    assert_eq!(yaml.get("first").map(String::as_str), Some("Ada"));

    let json = parse_fill_values("{\"email\": \"ada@example.com\"}").expect("json mapping");
    assert_eq!(json.get("email").map(String::as_str), Some("ada@example.com"));

    assert!(matches!(
        parse_fill_values("- not\n- a map\n"),
        Err(AutofillError::ValueParse { .. })
    ));
}

#[test]
fn predictions_parse_nested_mapping() {
    let predictions = parse_predictions("signup:\n  first: NAME_FIRST\n").expect("nested mapping");
    assert_eq!(
        predictions.get("signup").and_then(|f| f.get("first")).map(String::as_str),
        Some("NAME_FIRST")
    );
}

#[test]
fn missing_input_file_is_io_error() {
    let source = PageSource::File("/nonexistent/page.html".to_string());
    let err = form_autofill::page::loader::load_document(&source, None).expect_err("missing file");
    assert!(matches!(err, AutofillError::Io { .. }));
    assert!(err.to_string().contains("/nonexistent/page.html"));
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn fill_request_needs_values_or_predictions() {
    assert!(matches!(
        FillRequest::from_files("f", None, None, None, None),
        Err(AutofillError::InvalidInput(_))
    ));
}

// ============================================================================
// fill_page
// ============================================================================

fn request<'a>(form: &'a str, pairs: &[(&str, &str)]) -> FillRequest<'a> {
    FillRequest {
        form,
        values: pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        ..FillRequest::default()
    }
}

#[test]
fn fill_page_fills_named_form() {
    let mut d = doc(&format!("<form name=\"f\">{}</form>", text_inputs("a", 3)));
    let report = fill_page(&mut d, "page.html", &request("f", &[("a0", "x"), ("a2", "z")]))
        .expect("form exists");

    assert!(report.form_found);
    assert_eq!(report.operation, "fill");
    assert_eq!(report.fields, vec!["a0", "a2"]);
    assert_eq!(d.control_value(by_name(&d, "a2")), "z");
}

#[test]
fn fill_page_unknown_form_is_error() {
    let mut d = doc(&format!("<form name=\"f\">{}</form>", text_inputs("a", 3)));
    let err = fill_page(&mut d, "page.html", &request("nope", &[("a0", "x")])).expect_err("no such form");
    assert!(matches!(err, AutofillError::FormNotFound(ref name) if name == "nope"));
}

#[test]
fn fill_page_single_field() {
    let mut d = doc(&format!("<form name=\"f\">{}</form>", text_inputs("a", 3)));
    let mut req = request("f", &[("a0", "x"), ("a1", "y")]);
    req.field = Some("a1");

    let report = fill_page(&mut d, "page.html", &req).expect("field exists");
    assert_eq!(report.fields, vec!["a1"]);
    assert_eq!(d.control_value(by_name(&d, "a0")), "", "only the named field is filled");
    assert_eq!(d.control_value(by_name(&d, "a1")), "y");

    req.field = Some("zz");
    assert!(matches!(fill_page(&mut d, "page.html", &req), Err(AutofillError::InvalidInput(_))));
}

#[test]
fn fill_page_predictions_only() {
    let mut d = doc(&format!("<form name=\"f\">{}</form>", text_inputs("a", 3)));
    let mut predictions = HashMap::new();
    predictions.insert(
        "f".to_string(),
        [("a0".to_string(), "NAME_FULL".to_string())].into_iter().collect(),
    );
    let req = FillRequest {
        form: "f",
        predictions,
        ..FillRequest::default()
    };

    let report = fill_page(&mut d, "page.html", &req).expect("form exists");
    assert!(report.fields.is_empty());
    assert_eq!(d.attribute(by_name(&d, "a0"), "placeholder"), Some("NAME_FULL"));
}

// ============================================================================
// Commands end to end (files in the temp dir)
// ============================================================================

#[test]
fn extract_fill_clear_round_trip() {
    let page = temp_path("page.html");
    let report_path = temp_path("report.json");
    let filled = temp_path("filled.html");
    let cleared = temp_path("cleared.html");
    let trace = temp_path("trace.jsonl");
    let _ = std::fs::remove_file(&trace);

    std::fs::write(
        &page,
        "<form name=\"signup\"><p>First <input name=\"first\"></p>\
         <p>Last <input name=\"last\"></p><p>Email <input name=\"email\"></p></form>",
    )
    .expect("write page");
    let tracer = TraceLogger::new(&trace);

    let source = PageSource::File(page.clone());
    let scan = cmd_extract(
        &source,
        Some("https://example.com/signup"),
        &build_extract_options(&AppConfig::default(), None, None, false),
        "json",
        Some(report_path.as_str()),
        0,
        &tracer,
    )
    .expect("extract");
    assert_eq!(scan.total_forms, 1);
    assert_eq!(scan.total_fields, 3);
    let json = std::fs::read_to_string(&report_path).expect("report written");
    let parsed: serde_json::Value = serde_json::from_str(&json).expect("valid json");
    assert_eq!(parsed["forms"][0]["fields"][0]["label"], "First");
    assert_eq!(parsed["forms"][0]["origin"], "https://example.com/signup");

    let req = request("signup", &[("first", "Ada"), ("email", "ada@example.com")]);
    let fill = cmd_fill(&source, &req, "console", Some(filled.as_str()), 0, &tracer).expect("fill");
    assert_eq!(fill.fields, vec!["first", "email"]);

    let filled_source = PageSource::File(filled.clone());
    let clear = cmd_clear(&filled_source, "signup", "console", Some(cleared.as_str()), 0, &tracer)
        .expect("clear");
    assert_eq!(clear.fields, vec!["first", "email"]);

    let cleared_doc = doc(&std::fs::read_to_string(&cleared).expect("cleared page"));
    assert_eq!(cleared_doc.control_value(by_name(&cleared_doc, "first")), "");
    assert!(cleared_doc.attribute(by_name(&cleared_doc, "first"), "autofilled").is_none());

    let lines: Vec<serde_json::Value> = std::fs::read_to_string(&trace)
        .expect("trace written")
        .lines()
        .map(|l| serde_json::from_str(l).expect("trace line is json"))
        .collect();
    let ops: Vec<&str> = lines.iter().filter_map(|l| l["operation"].as_str()).collect();
    assert_eq!(ops, vec!["extract", "fill", "clear"]);
}

#[test]
fn clear_unknown_form_is_error() {
    let page = temp_path("clear-missing.html");
    std::fs::write(&page, "<form name=\"f\"><input name=\"a\"></form>").expect("write page");
    let result = cmd_clear(
        &PageSource::File(page),
        "missing",
        "console",
        Some(temp_path("clear-missing-out.html").as_str()),
        0,
        &TraceLogger::disabled(),
    );
    assert!(result.is_err());
}
