mod common;

use form_autofill::dom::dom_model::DomTree;
use form_autofill::form::classifier::{
    form_control_type, form_identifier, form_owner, input_type, is_autofillable_element,
    is_checkable_element, is_labelable_element, is_select_element, is_text_input, label_control,
    name_for_autofill,
};
use form_autofill::dom::parser::first_element;

use crate::common::utils::{by_name, doc};

// ============================================================================
// Control types
// ============================================================================

#[test]
fn input_type_normalises_unknown_values_to_text() {
    let d = doc("<input name=\"a\" type=\"EMAIL\"><input name=\"b\" type=\"bogus\"><input name=\"c\">");
    assert_eq!(input_type(&d, by_name(&d, "a")), "email");
    assert_eq!(input_type(&d, by_name(&d, "b")), "text");
    assert_eq!(input_type(&d, by_name(&d, "c")), "text");
}

#[test]
fn form_control_type_covers_selects_and_textareas() {
    let d = doc(
        "<select name=\"one\"></select><select name=\"many\" multiple></select>\
         <textarea name=\"t\"></textarea><div name=\"d\"></div>",
    );
    assert_eq!(form_control_type(&d, by_name(&d, "one")).as_deref(), Some("select-one"));
    assert_eq!(form_control_type(&d, by_name(&d, "many")).as_deref(), Some("select-multiple"));
    assert_eq!(form_control_type(&d, by_name(&d, "t")).as_deref(), Some("textarea"));
    assert_eq!(form_control_type(&d, by_name(&d, "d")), None);
}

#[test]
fn autofillable_controls() {
    let d = doc(
        "<input name=\"text\"><input name=\"tel\" type=\"tel\"><input name=\"box\" type=\"checkbox\">\
         <input name=\"radio\" type=\"radio\"><input name=\"hidden\" type=\"hidden\">\
         <input name=\"submit\" type=\"submit\"><input name=\"file\" type=\"file\">\
         <select name=\"one\"></select><select name=\"many\" multiple></select>\
         <textarea name=\"area\"></textarea>",
    );

    for name in ["text", "tel", "box", "radio", "one", "area"] {
        assert!(is_autofillable_element(&d, by_name(&d, name)), "{} should be autofillable", name);
    }
    for name in ["hidden", "submit", "file", "many"] {
        assert!(!is_autofillable_element(&d, by_name(&d, name)), "{} should not be autofillable", name);
    }

    assert!(is_checkable_element(&d, by_name(&d, "radio")));
    assert!(!is_text_input(&d, by_name(&d, "box")));
    assert!(is_select_element(&d, by_name(&d, "one")));
    assert!(!is_select_element(&d, by_name(&d, "many")), "multi-selects are not fillable selects");
}

#[test]
fn labelable_elements_exclude_hidden_inputs() {
    let d = doc("<input name=\"h\" type=\"hidden\"><input name=\"t\"><button name=\"b\"></button><div name=\"d\"></div>");
    assert!(!is_labelable_element(&d, by_name(&d, "h")));
    assert!(is_labelable_element(&d, by_name(&d, "t")));
    assert!(is_labelable_element(&d, by_name(&d, "b")));
    assert!(!is_labelable_element(&d, by_name(&d, "d")));
}

// ============================================================================
// Names and owners
// ============================================================================

#[test]
fn name_for_autofill_falls_back_to_id() {
    let d = doc("<input name=\" user \" id=\"x\"><input id=\"only-id\"><input class=\"anon\">");
    assert_eq!(name_for_autofill(&d, by_name(&d, " user ")), "user");
    let only_id = d.element_by_id("only-id").expect("input with id");
    assert_eq!(name_for_autofill(&d, only_id), "only-id");
    let anon = d
        .descendants(d.root())
        .find(|&n| d.attribute(n, "class") == Some("anon"))
        .expect("anonymous input");
    assert_eq!(name_for_autofill(&d, anon), "");
}

#[test]
fn form_identifier_prefers_name_over_id() {
    let d = doc("<form name=\"n\" id=\"i\"></form><form id=\"only\"></form><form></form>");
    let forms: Vec<_> = d.descendants(d.root()).filter(|&n| d.has_tag(n, "form")).collect();
    let ids: Vec<String> = forms.iter().map(|&f| form_identifier(&d, f)).collect();
    assert_eq!(ids, vec!["n", "only", ""]);
}

#[test]
fn form_attribute_overrides_nesting() {
    let d = doc(
        "<form id=\"outer\"><input name=\"nested\"><input name=\"moved\" form=\"other\">\
         <input name=\"broken\" form=\"missing\"></form><form id=\"other\"></form>",
    );
    let outer = d.element_by_id("outer").expect("outer form");
    let other = d.element_by_id("other").expect("other form");

    assert_eq!(form_owner(&d, by_name(&d, "nested")), Some(outer));
    assert_eq!(form_owner(&d, by_name(&d, "moved")), Some(other));
    assert_eq!(form_owner(&d, by_name(&d, "broken")), None, "unknown form id means no owner");
}

#[test]
fn label_control_uses_for_then_descendant() {
    let d = doc(
        "<label id=\"l1\" for=\"target\">A</label><input id=\"target\" name=\"t\">\
         <label id=\"l2\">B <select name=\"s\"></select></label>\
         <label id=\"l3\" for=\"nothing\">C</label>",
    );
    let l1 = d.element_by_id("l1").expect("l1");
    let l2 = d.element_by_id("l2").expect("l2");
    let l3 = d.element_by_id("l3").expect("l3");

    assert_eq!(label_control(&d, l1), Some(by_name(&d, "t")));
    assert_eq!(label_control(&d, l2), Some(by_name(&d, "s")));
    assert_eq!(label_control(&d, l3), None);
    assert!(first_element(&d, "label").is_some());
}
