use std::collections::HashMap;

use crate::dom::dom_model::{DomTree, NodeId};
use crate::form::classifier::{
    form_control_type, form_identifier, form_owner, is_autofillable_element,
    is_checkable_element, is_form_control_element,
    is_select_element, is_text_input, label_control, name_for_autofill,
};
use crate::form::fill::AutofillState;
use crate::form::form_model::{
    AUTOCOMPLETE_TOO_LONG, DEFAULT_MAX_LENGTH, ExtractOptions, FieldRecord, FieldRole,
    FormRecord, LabelSource, ScanResult, ScanStats,
};
use crate::form::label_inference::infer_label_with_source;
use crate::form::signature::{form_signature, resolve_action, strip_query_and_fragment};
use crate::form::text_aggregator::find_child_text;

// ============================================================================
// Entry points
// ============================================================================

/// Scan a document (and its frames) for forms worth autofilling.
pub fn extract_forms<T: DomTree>(tree: &T, options: &ExtractOptions) -> Vec<FormRecord> {
    extract_forms_with_stats(tree, options, None).forms
}

/// Full scan, also reporting how much of the document was looked at.
///
/// `autofilled` marks controls of the top-level document that the fill
/// engine has filled; child frames are scanned without it.
pub fn extract_forms_with_stats<T: DomTree>(
    tree: &T,
    options: &ExtractOptions,
    autofilled: Option<&AutofillState>,
) -> ScanResult {
    let mut scan = Scan {
        options,
        budget: options.max_fields,
        stats: ScanStats::default(),
        forms: Vec::new(),
    };

    scan.document(tree, autofilled);

    ScanResult {
        forms: scan.forms,
        stats: scan.stats,
    }
}

struct Scan<'a> {
    options: &'a ExtractOptions,
    /// Fields still allowed in this scan.
    budget: usize,
    stats: ScanStats,
    forms: Vec<FormRecord>,
}

impl Scan<'_> {
    fn document<T: DomTree>(&mut self, tree: &T, autofilled: Option<&AutofillState>) {
        self.stats.frames_scanned += 1;

        let origin = tree.url().map(strip_query_and_fragment).unwrap_or_default();

        for form in forms_in(tree) {
            if self.stats.field_cap_reached {
                return;
            }

            let controls = extract_autofillable_elements_in_form(tree, form);
            let editable = count_editable(tree, &controls);
            if editable == 0 {
                continue;
            }

            let Some(fields) = self.form_or_fieldsets_to_form_data(tree, Some(form), &[], &controls, autofilled)
            else {
                continue;
            };

            let name = form_identifier(tree, form);
            let method = tree
                .attribute(form, "method")
                .map(|m| m.trim().to_ascii_lowercase())
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| "get".to_string());
            let action = resolve_action(tree.url(), tree.attribute(form, "action"));

            let record = FormRecord {
                signature: form_signature(&origin, &name, &fields),
                name,
                method,
                origin: origin.clone(),
                action,
                fields,
                is_form_tag: true,
            };
            self.report(record, editable);
        }

        if self.stats.field_cap_reached {
            return;
        }

        let (controls, fieldsets) = unowned_autofillable_elements(tree);
        let editable = count_editable(tree, &controls);
        if editable > 0 {
            if let Some(fields) = self.form_or_fieldsets_to_form_data(tree, None, &fieldsets, &controls, autofilled) {
                let record = FormRecord {
                    signature: form_signature(&origin, "", &fields),
                    name: String::new(),
                    method: String::new(),
                    origin: origin.clone(),
                    action: String::new(),
                    fields,
                    is_form_tag: false,
                };
                self.report(record, editable);
            }
        }

        for frame_element in frame_elements(tree) {
            if self.stats.field_cap_reached {
                return;
            }
            if let Some(frame) = tree.frame(frame_element) {
                self.document(frame, None);
            }
        }
    }

    fn report(&mut self, record: FormRecord, editable: usize) {
        self.stats.forms_seen += 1;
        if is_form_interesting(&record, editable, self.options.min_required_fields) {
            self.stats.forms_reported += 1;
            self.forms.push(record);
        }
    }

    /// Build the field records of one form (or of the unowned controls) and
    /// label them. `None` when no field could be extracted.
    fn form_or_fieldsets_to_form_data<T: DomTree>(
        &mut self,
        tree: &T,
        form: Option<NodeId>,
        fieldsets: &[NodeId],
        controls: &[NodeId],
        autofilled: Option<&AutofillState>,
    ) -> Option<Vec<FieldRecord>> {
        let mut fields = Vec::new();
        let mut extracted = Vec::new();

        for &control in controls {
            if !is_autofillable_element(tree, control) {
                continue;
            }
            if self.budget == 0 {
                self.stats.field_cap_reached = true;
                break;
            }
            self.budget -= 1;

            let is_autofilled = autofilled.map(|s| s.is_autofilled(control)).unwrap_or(false);
            fields.push(control_to_field(tree, control, self.options, is_autofilled));
            extracted.push(control);
        }

        if fields.is_empty() {
            return None;
        }
        self.stats.fields_extracted += fields.len();

        let labels: Vec<NodeId> = match form {
            Some(form) => labels_within(tree, form),
            None => fieldsets
                .iter()
                .flat_map(|&fs| labels_within(tree, fs))
                .collect(),
        };
        match_labels_and_fields(tree, &labels, form, &extracted, &mut fields);

        for (field, &control) in fields.iter_mut().zip(&extracted) {
            if field.label.is_empty() {
                let inferred = infer_label_with_source(tree, control);
                field.label = inferred.text;
                field.label_source = inferred.source;
            }
            field.label = truncate_chars(&field.label, self.options.max_data_length);
        }

        Some(fields)
    }
}

/// Forms without autocomplete hints need enough editable fields to be worth
/// reporting.
pub fn is_form_interesting(form: &FormRecord, editable: usize, min_required_fields: usize) -> bool {
    if form.fields.is_empty() {
        return false;
    }
    if form.has_autocomplete_attribute() {
        return true;
    }
    editable >= min_required_fields
}

// ============================================================================
// Collecting controls
// ============================================================================

pub fn forms_in<T: DomTree>(tree: &T) -> Vec<NodeId> {
    tree.descendants(tree.root())
        .filter(|&n| tree.has_tag(n, "form"))
        .collect()
}

fn frame_elements<T: DomTree>(tree: &T) -> Vec<NodeId> {
    tree.descendants(tree.root())
        .filter(|&n| tree.frame(n).is_some())
        .collect()
}

/// Every input, select and textarea owned by `form`, in document order.
pub fn form_control_elements<T: DomTree>(tree: &T, form: NodeId) -> Vec<NodeId> {
    tree.descendants(tree.root())
        .filter(|&n| is_form_control_element(tree, n) && form_owner(tree, n) == Some(form))
        .collect()
}

pub fn extract_autofillable_elements_in_form<T: DomTree>(tree: &T, form: NodeId) -> Vec<NodeId> {
    form_control_elements(tree, form)
        .into_iter()
        .filter(|&n| is_autofillable_element(tree, n))
        .collect()
}

/// Fillable controls without a form owner, plus the top-level fieldsets
/// (outside any form or fieldset) whose labels may describe them.
pub fn unowned_autofillable_elements<T: DomTree>(tree: &T) -> (Vec<NodeId>, Vec<NodeId>) {
    let mut controls = Vec::new();
    let mut fieldsets = Vec::new();

    for node in tree.descendants(tree.root()) {
        if is_form_control_element(tree, node)
            && form_owner(tree, node).is_none()
            && is_autofillable_element(tree, node)
        {
            controls.push(node);
        }
        if tree.has_tag(node, "fieldset") && !is_inside_form_or_fieldset(tree, node) {
            fieldsets.push(node);
        }
    }

    (controls, fieldsets)
}

fn is_inside_form_or_fieldset<T: DomTree>(tree: &T, node: NodeId) -> bool {
    tree.ancestors(node)
        .any(|a| tree.has_tag(a, "form") || tree.has_tag(a, "fieldset"))
}

fn count_editable<T: DomTree>(tree: &T, controls: &[NodeId]) -> usize {
    controls
        .iter()
        .filter(|&&n| !is_checkable_element(tree, n))
        .count()
}

/// Locate a form by the identifier reported in [`FormRecord::name`].
pub fn find_form_by_identifier<T: DomTree>(tree: &T, name: &str) -> Option<NodeId> {
    if name.is_empty() {
        return None;
    }
    forms_in(tree)
        .into_iter()
        .find(|&f| form_identifier(tree, f) == name)
}

// ============================================================================
// Field records
// ============================================================================

fn control_to_field<T: DomTree>(
    tree: &T,
    node: NodeId,
    options: &ExtractOptions,
    is_autofilled: bool,
) -> FieldRecord {
    let autocomplete = tree.attribute(node, "autocomplete").unwrap_or("").to_string();
    let autocomplete_attribute = if autocomplete.chars().count() > options.max_data_length {
        AUTOCOMPLETE_TOO_LONG.to_string()
    } else {
        autocomplete
    };

    let role = match tree.attribute(node, "role") {
        Some(r) if r.eq_ignore_ascii_case("presentation") => FieldRole::Presentation,
        _ => FieldRole::Other,
    };

    let is_checkable = is_checkable_element(tree, node);
    let max_length = if is_text_input(tree, node) {
        tree.attribute(node, "maxlength")
            .and_then(|v| v.trim().parse::<u32>().ok())
            .unwrap_or(DEFAULT_MAX_LENGTH)
    } else {
        0
    };

    let (option_values, option_contents) = if is_select_element(tree, node) && options.extract_options {
        let opts = tree.options(node);
        (
            opts.iter().map(|&o| tree.option_value(o)).collect(),
            opts.iter().map(|&o| tree.option_text(o)).collect(),
        )
    } else {
        (Vec::new(), Vec::new())
    };

    let value = if options.extract_values {
        truncate_chars(&extract_value(tree, node, options), options.max_data_length)
    } else {
        String::new()
    };

    FieldRecord {
        name: name_for_autofill(tree, node),
        id_attribute: tree.attribute(node, "id").unwrap_or("").to_string(),
        form_control_type: form_control_type(tree, node).unwrap_or_default(),
        autocomplete_attribute,
        placeholder: tree.attribute(node, "placeholder").unwrap_or("").to_string(),
        max_length,
        is_autofilled,
        is_checkable,
        is_checked: is_checkable && tree.is_checked(node),
        is_focusable: is_focusable(tree, node),
        should_autocomplete: should_autocomplete(tree, node),
        role,
        label: String::new(),
        label_source: LabelSource::None,
        value,
        option_values,
        option_contents,
    }
}

fn extract_value<T: DomTree>(tree: &T, node: NodeId, options: &ExtractOptions) -> String {
    let value = strip_line_breaks(&tree.control_value(node));

    if is_select_element(tree, node) && options.extract_option_text {
        let selected = tree
            .options(node)
            .into_iter()
            .find(|&o| strip_line_breaks(&tree.option_value(o)) == value);
        if let Some(option) = selected {
            return tree.option_text(option);
        }
    }
    value
}

fn strip_line_breaks(value: &str) -> String {
    value.chars().filter(|c| *c != '\n' && *c != '\t').collect()
}

/// False when autocomplete is switched off on the control or its form.
fn should_autocomplete<T: DomTree>(tree: &T, node: NodeId) -> bool {
    let off = |n: NodeId| {
        tree.attribute(n, "autocomplete")
            .map(|v| v.trim().eq_ignore_ascii_case("off"))
            .unwrap_or(false)
    };
    if off(node) {
        return false;
    }
    !form_owner(tree, node).map(off).unwrap_or(false)
}

fn is_focusable<T: DomTree>(tree: &T, node: NodeId) -> bool {
    if tree.attribute(node, "disabled").is_some() || tree.attribute(node, "readonly").is_some() {
        return false;
    }
    let tab_index = tree
        .attribute(node, "tabindex")
        .and_then(|v| v.trim().parse::<i32>().ok())
        .unwrap_or(0);
    if tab_index < 0 {
        return false;
    }
    std::iter::once(node)
        .chain(tree.ancestors(node))
        .all(|n| !is_hidden(tree, n))
}

fn is_hidden<T: DomTree>(tree: &T, node: NodeId) -> bool {
    if !tree.is_element(node) {
        return false;
    }
    if tree.attribute(node, "hidden").is_some() {
        return true;
    }
    let style: String = tree
        .attribute(node, "style")
        .unwrap_or("")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();
    style.contains("display:none") || style.contains("visibility:hidden")
}

// ============================================================================
// Label matching
// ============================================================================

fn labels_within<T: DomTree>(tree: &T, scope: NodeId) -> Vec<NodeId> {
    tree.descendants(scope)
        .filter(|&n| tree.has_tag(n, "label"))
        .collect()
}

/// Apply `<label>` text to the fields it describes.
///
/// A label reaches its field through the control it points at. When it points
/// at nothing, its `for` value is tried as a field name; a name shared by more
/// than one field is ambiguous and the label is dropped.
fn match_labels_and_fields<T: DomTree>(
    tree: &T,
    labels: &[NodeId],
    form: Option<NodeId>,
    controls: &[NodeId],
    fields: &mut [FieldRecord],
) {
    let index_of: HashMap<NodeId, usize> = controls
        .iter()
        .enumerate()
        .map(|(i, &n)| (n, i))
        .collect();

    for &label in labels {
        let target = match label_control(tree, label) {
            None => {
                let element_name = tree.attribute(label, "for").unwrap_or("");
                if element_name.is_empty() {
                    continue;
                }
                let mut matches = fields
                    .iter()
                    .enumerate()
                    .filter(|(_, f)| f.name == element_name)
                    .map(|(i, _)| i);
                match (matches.next(), matches.next()) {
                    (Some(i), None) => Some(i),
                    _ => None,
                }
            }
            Some(control) => {
                if form_owner(tree, control) != form {
                    continue;
                }
                index_of.get(&control).copied()
            }
        };

        let Some(index) = target else {
            continue;
        };

        let label_text = find_child_text(tree, label);
        let field = &mut fields[index];
        if !field.label.is_empty() && !label_text.is_empty() {
            field.label.push(' ');
        }
        field.label.push_str(&label_text);
        if !field.label.is_empty() {
            field.label_source = LabelSource::LabelTag;
        }
    }
}

pub(crate) fn truncate_chars(value: &str, max: usize) -> String {
    match value.char_indices().nth(max) {
        Some((byte_index, _)) => value[..byte_index].to_string(),
        None => value.to_string(),
    }
}
