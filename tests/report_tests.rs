mod common;

use form_autofill::dom::parser::parse_html_with_url;
use form_autofill::form::extractor::extract_forms_with_stats;
use form_autofill::form::fill::{ClearOutcome, FillOutcome};
use form_autofill::form::form_model::{ExtractOptions, ScanStats};
use form_autofill::report::console::{format_console_report, format_fill_summary};
use form_autofill::report::report_model::{FillReport, ScanReport};
use form_autofill::trace::logger::TraceLogger;
use form_autofill::trace::trace::TraceEvent;

use crate::common::utils::temp_path;

// ============================================================================
// Helper builders
// ============================================================================

fn sample_report() -> ScanReport {
    let html = "<form name=\"signup\" method=\"post\" action=\"/join\">\
                <label for=\"e\">Email</label><input id=\"e\" name=\"email\" autocomplete=\"email\">\
                <p>Phone <input name=\"phone\"></p></form>";
    let doc = parse_html_with_url(html, Some("https://example.com/signup"));
    let scan = extract_forms_with_stats(&doc, &ExtractOptions::default(), None);
    ScanReport::from_scan("signup.html", scan)
}

// ============================================================================
// ScanReport
// ============================================================================

#[test]
fn scan_report_counts_forms_and_fields() {
    let report = sample_report();
    assert_eq!(report.source, "signup.html");
    assert_eq!(report.total_forms, 1);
    assert_eq!(report.total_fields, 2);
    assert_eq!(report.frames_scanned, 1);
    assert!(!report.field_cap_reached);
    assert!(report.duration_ms.is_none());
}

#[test]
fn scan_report_json_omits_missing_duration() {
    let json = serde_json::to_value(sample_report()).expect("serializable");
    assert!(json.get("duration_ms").is_none());
    assert_eq!(json["forms"][0]["fields"][0]["label_source"], "label_tag");
    assert_eq!(json["forms"][0]["fields"][1]["label_source"], "previous_sibling");

    let timed = serde_json::to_value(sample_report().with_duration(12)).expect("serializable");
    assert_eq!(timed["duration_ms"], 12);
}

// ============================================================================
// Console reporter
// ============================================================================

#[test]
fn console_report_lists_forms_and_fields() {
    let out = format_console_report(&sample_report().with_duration(7));

    assert!(out.starts_with("=== Forms: signup.html ===\n"), "{}", out);
    assert!(out.contains("form \"signup\" (post https://example.com/join)"), "{}", out);
    assert!(out.contains("name=\"email\" label=\"Email\"  (label_tag) autocomplete=email"), "{}", out);
    assert!(out.contains("name=\"phone\" label=\"Phone\"  (previous_sibling)"), "{}", out);
    assert!(out.contains("=== Results: 1 forms, 2 fields in 7ms ==="), "{}", out);
}

#[test]
fn console_report_for_empty_page() {
    let doc = parse_html_with_url("<p>nothing</p>", None);
    let scan = extract_forms_with_stats(&doc, &ExtractOptions::default(), None);
    let out = format_console_report(&ScanReport::from_scan("empty.html", scan));

    assert!(out.contains("(no forms worth autofilling)"), "{}", out);
    assert!(out.contains("=== Results: 0 forms, 0 fields ==="), "{}", out);
}

#[test]
fn console_report_notes_field_limit() {
    let html = format!(
        "<form>{}</form>",
        (0..120).map(|i| format!("<input name=\"f{}\">", i)).collect::<String>()
    );
    let doc = parse_html_with_url(&html, None);
    let scan = extract_forms_with_stats(&doc, &ExtractOptions::default(), None);
    let out = format_console_report(&ScanReport::from_scan("big.html", scan));

    assert!(out.contains("form (unnamed)"), "{}", out);
    assert!(out.contains("(field limit reached)"), "{}", out);
}

#[test]
fn fill_summary_lines() {
    let filled = FillReport::from_fill(
        "p.html",
        "signup",
        FillOutcome {
            form_found: true,
            filled: vec!["first".into(), "email".into()],
        },
    );
    let out = format_fill_summary(&filled);
    assert!(out.starts_with("fill: filled 2 field(s) in form \"signup\""), "{}", out);
    assert!(out.contains("    email\n"), "{}", out);

    let missing = FillReport::from_clear("p.html", "", ClearOutcome::default());
    assert_eq!(format_fill_summary(&missing), "clear: form (unnamed) not found\n");
}

// ============================================================================
// Trace log
// ============================================================================

#[test]
fn trace_event_builders() {
    let stats = ScanStats {
        forms_seen: 2,
        forms_reported: 1,
        fields_extracted: 5,
        frames_scanned: 1,
        field_cap_reached: false,
    };
    let event = TraceEvent::now("extract", "page.html")
        .with_stats(&stats)
        .with_form("signup")
        .with_touched(&["a".to_string()])
        .with_outcome("ok");

    assert!(event.timestamp_ms > 0);
    assert_eq!(event.operation, "extract");
    assert_eq!(event.forms_reported, Some(1));
    assert_eq!(event.fields, Some(5));
    assert_eq!(event.field_cap_reached, Some(false));
    assert_eq!(event.form.as_deref(), Some("signup"));
    assert_eq!(event.touched, vec!["a"]);
    assert_eq!(event.outcome.as_deref(), Some("ok"));
}

#[test]
fn trace_logger_appends_json_lines() {
    let path = temp_path("logger.jsonl");
    let _ = std::fs::remove_file(&path);

    let logger = TraceLogger::new(&path);
    assert!(logger.is_enabled());
    assert!(logger.log(&TraceEvent::now("fill", "a.html").with_form("f")), "first event written");
    assert!(logger.log(&TraceEvent::now("clear", "a.html")), "second event written");
    assert_eq!(logger.dropped(), 0);

    let content = std::fs::read_to_string(&path).expect("trace file");
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    let first: serde_json::Value = serde_json::from_str(lines[0]).expect("json line");
    assert_eq!(first["operation"], "fill");
    assert_eq!(first["form"], "f");
}

#[test]
fn disabled_logger_drops_events() {
    let logger = TraceLogger::from_path(None);
    assert!(!logger.is_enabled());
    assert!(!logger.log(&TraceEvent::now("extract", "x")), "nothing is written");
    assert_eq!(logger.dropped(), 0, "a disabled logger does not count its events as lost");

    let unwritable = TraceLogger::new("/nonexistent-dir/trace.jsonl");
    assert!(!unwritable.is_enabled(), "open failure degrades to a warning");
}

#[test]
fn trace_logger_is_shared_across_threads() {
    let path = temp_path("logger-threads.jsonl");
    let _ = std::fs::remove_file(&path);

    let logger = std::sync::Arc::new(TraceLogger::new(&path));
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let logger = std::sync::Arc::clone(&logger);
            std::thread::spawn(move || {
                for _ in 0..5 {
                    logger.log(&TraceEvent::now("extract", &format!("page-{}.html", i)));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("logging thread");
    }

    let content = std::fs::read_to_string(&path).expect("trace file");
    assert_eq!(content.lines().count(), 20, "every event lands on its own line");
    for line in content.lines() {
        let event: serde_json::Value = serde_json::from_str(line).expect("whole json line");
        assert_eq!(event["operation"], "extract");
    }
    assert_eq!(logger.dropped(), 0);
}
