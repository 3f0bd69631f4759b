use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::dom::document::Document;
use crate::dom::dom_model::{DomTree, NodeId};
use crate::form::classifier::{
    form_identifier, form_owner, is_autofillable_element, is_checkable_element, is_select_element,
    is_text_area_element, is_text_input, name_for_autofill,
};
use crate::form::extractor::{
    find_form_by_identifier, form_control_elements, forms_in, truncate_chars,
    unowned_autofillable_elements,
};
use crate::form::form_model::{AUTOFILLED_ATTRIBUTE, MAX_DATA_LENGTH};

// ============================================================================
// Change notifications
// ============================================================================

/// Receives a notification whenever the engine changes a control's value,
/// so the host can dispatch its own input/change events.
pub trait ChangeSink {
    fn value_changed(&mut self, node: NodeId);
}

impl ChangeSink for Vec<NodeId> {
    fn value_changed(&mut self, node: NodeId) {
        self.push(node);
    }
}

/// Discards notifications.
pub struct NoopSink;

impl ChangeSink for NoopSink {
    fn value_changed(&mut self, _node: NodeId) {}
}

// ============================================================================
// Autofill state
// ============================================================================

/// Which controls currently hold autofilled values, and which listeners the
/// engine has armed for them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AutofillState {
    autofilled: HashSet<NodeId>,
    /// Controls whose next user edit removes the autofilled mark.
    edit_listeners: HashSet<NodeId>,
    /// Forms whose reset removes the mark from all their controls.
    reset_listeners: HashSet<NodeId>,
}

impl AutofillState {
    pub fn is_autofilled(&self, node: NodeId) -> bool {
        self.autofilled.contains(&node)
    }

    pub fn autofilled_count(&self) -> usize {
        self.autofilled.len()
    }

    pub fn has_edit_listener(&self, node: NodeId) -> bool {
        self.edit_listeners.contains(&node)
    }

    pub fn has_reset_listener(&self, form: NodeId) -> bool {
        self.reset_listeners.contains(&form)
    }

    fn mark(&mut self, node: NodeId) {
        self.autofilled.insert(node);
        self.edit_listeners.insert(node);
    }

    fn unmark(&mut self, node: NodeId) {
        self.autofilled.remove(&node);
        self.edit_listeners.remove(&node);
    }
}

// ============================================================================
// Requests and outcomes
// ============================================================================

/// A single field fill, as issued for the field the user is focused on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldFill {
    pub name: String,
    pub value: String,
    /// Negative or missing means [`MAX_DATA_LENGTH`].
    #[serde(default)]
    pub max_length: Option<i64>,
    #[serde(default)]
    pub is_checked: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FillOutcome {
    pub form_found: bool,
    /// Names of the controls that were filled, in document order.
    pub filled: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClearOutcome {
    pub form_found: bool,
    pub cleared: Vec<String>,
}

// ============================================================================
// Fill engine
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct FillEngine {
    state: AutofillState,
}

impl FillEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the engine state from autofilled marks already rendered into
    /// the document, e.g. one saved after an earlier fill.
    pub fn from_document(doc: &Document) -> Self {
        let mut state = AutofillState::default();
        for node in doc.descendants(doc.root()) {
            if doc.attribute(node, AUTOFILLED_ATTRIBUTE).is_some() {
                state.mark(node);
                if let Some(form) = form_owner(doc, node) {
                    state.reset_listeners.insert(form);
                }
            }
        }
        Self { state }
    }

    pub fn state(&self) -> &AutofillState {
        &self.state
    }

    /// Write `values` (keyed by field name) into the named form.
    ///
    /// Controls that already hold a value are left alone unless they are the
    /// forced field or a select. `""` names the controls outside any form.
    pub fn fill_form(
        &mut self,
        doc: &mut Document,
        form_name: &str,
        values: &HashMap<String, String>,
        force_field: Option<&str>,
        sink: &mut dyn ChangeSink,
    ) -> FillOutcome {
        let Some((form, controls)) = controls_for(doc, form_name) else {
            return FillOutcome::default();
        };
        let mut outcome = FillOutcome {
            form_found: true,
            filled: Vec::new(),
        };

        for control in controls {
            if !is_autofillable_element(doc, control) {
                continue;
            }
            let name = name_for_autofill(doc, control);

            let current = doc.control_value(control);
            if !current.is_empty()
                && !is_select_element(doc, control)
                && force_field != Some(name.as_str())
            {
                continue;
            }

            let Some(value) = values.get(&name).filter(|v| !v.is_empty()) else {
                continue;
            };

            if is_text_input(doc, control) || is_text_area_element(doc, control) {
                let value = match max_length_attribute(doc, control) {
                    Some(max) if is_text_input(doc, control) => truncate_chars(value, max),
                    _ => value.clone(),
                };
                set_input_element_value(doc, control, &value, sink);
            } else if is_select_element(doc, control) {
                if current != *value {
                    if !doc.set_select_value(control, value) {
                        continue;
                    }
                    sink.value_changed(control);
                }
            } else {
                // Checkable controls carry no checked state in the value map.
                continue;
            }

            self.state.mark(control);
            self.render(doc, control);
            outcome.filled.push(name);
        }

        if let Some(form) = form {
            self.state.reset_listeners.insert(form);
        }
        outcome
    }

    /// Undo a fill: empty autofilled text controls and reset autofilled
    /// selects to their first option. Checkboxes and radios keep their
    /// state; only their mark is removed.
    pub fn clear_autofilled_fields(
        &mut self,
        doc: &mut Document,
        form_name: &str,
        sink: &mut dyn ChangeSink,
    ) -> ClearOutcome {
        let Some((_, controls)) = controls_for(doc, form_name) else {
            return ClearOutcome::default();
        };
        let mut outcome = ClearOutcome {
            form_found: true,
            cleared: Vec::new(),
        };

        for control in controls {
            if !self.state.is_autofilled(control) || doc.attribute(control, "disabled").is_some() {
                continue;
            }

            if is_text_input(doc, control) || is_text_area_element(doc, control) {
                set_input_element_value(doc, control, "", sink);
            } else if is_select_element(doc, control) {
                if !doc.options(control).is_empty() && doc.selected_index(control) != Some(0) {
                    doc.set_selected_index(control, Some(0));
                    sink.value_changed(control);
                }
            }

            self.state.unmark(control);
            self.render(doc, control);
            outcome.cleared.push(name_for_autofill(doc, control));
        }

        outcome
    }

    /// Fill one field. Returns false when `node` is not the field `fill`
    /// names or there is nothing to write.
    pub fn fill_form_field(
        &mut self,
        doc: &mut Document,
        node: NodeId,
        fill: &FieldFill,
        sink: &mut dyn ChangeSink,
    ) -> bool {
        if fill.name != name_for_autofill(doc, node) || fill.value.is_empty() {
            return false;
        }

        if is_text_input(doc, node) || is_text_area_element(doc, node) {
            let value = if is_text_input(doc, node) {
                let max = match fill.max_length {
                    Some(m) if m >= 0 => m as usize,
                    _ => MAX_DATA_LENGTH,
                };
                truncate_chars(&fill.value, max)
            } else {
                fill.value.clone()
            };
            set_input_element_value(doc, node, &value, sink);
            self.state.mark(node);
            self.render(doc, node);
        } else if is_select_element(doc, node) {
            if doc.control_value(node) != fill.value && doc.set_select_value(node, &fill.value) {
                sink.value_changed(node);
            }
        } else if is_checkable_element(doc, node) {
            if doc.is_checked(node) != fill.is_checked {
                doc.set_checked(node, fill.is_checked);
                sink.value_changed(node);
            }
        }
        true
    }

    /// A trusted user edit. Writes the value and, the first time the control
    /// is edited after a fill, drops its autofilled mark.
    pub fn handle_user_input(
        &mut self,
        doc: &mut Document,
        node: NodeId,
        value: &str,
        sink: &mut dyn ChangeSink,
    ) {
        if is_select_element(doc, node) {
            if !doc.set_select_value(node, value) {
                return;
            }
        } else {
            doc.set_control_value(node, value);
        }
        sink.value_changed(node);

        if self.state.edit_listeners.remove(&node) {
            self.state.autofilled.remove(&node);
            self.render(doc, node);
        }
    }

    /// The form was reset: controls go back to their defaults and, if the
    /// form had been filled, every control loses its autofilled mark.
    pub fn handle_form_reset(&mut self, doc: &mut Document, form: NodeId) {
        let controls = form_control_elements(doc, form);
        for &control in &controls {
            doc.reset_control(control);
        }

        if self.state.reset_listeners.remove(&form) {
            for control in controls {
                self.state.unmark(control);
                self.render(doc, control);
            }
        }
    }

    /// Render step: mirror the state of `node` into the document.
    fn render(&self, doc: &mut Document, node: NodeId) {
        if self.state.is_autofilled(node) {
            doc.set_attribute(node, AUTOFILLED_ATTRIBUTE, "");
        } else {
            doc.remove_attribute(node, AUTOFILLED_ATTRIBUTE);
        }
    }
}

/// Show predicted field types as placeholders (`form name → field name →
/// type`). Returns how many controls were annotated.
pub fn fill_prediction_data(
    doc: &mut Document,
    predictions: &HashMap<String, HashMap<String, String>>,
) -> usize {
    let mut annotated = 0;
    for form in forms_in(doc) {
        let Some(fields) = predictions.get(&form_identifier(doc, form)) else {
            continue;
        };
        for control in form_control_elements(doc, form) {
            if !is_autofillable_element(doc, control) {
                continue;
            }
            let name = name_for_autofill(doc, control);
            if let Some(prediction) = fields.get(&name).filter(|p| !p.is_empty()) {
                doc.set_attribute(control, "placeholder", prediction);
                annotated += 1;
            }
        }
    }
    annotated
}

/// The form element (if any) and the controls addressed by `form_name`.
fn controls_for(doc: &Document, form_name: &str) -> Option<(Option<NodeId>, Vec<NodeId>)> {
    if form_name.is_empty() {
        let (controls, _) = unowned_autofillable_elements(doc);
        return Some((None, controls));
    }
    let form = find_form_by_identifier(doc, form_name)?;
    Some((Some(form), form_control_elements(doc, form)))
}

fn max_length_attribute(doc: &Document, node: NodeId) -> Option<usize> {
    doc.attribute(node, "maxlength")
        .and_then(|v| v.trim().parse::<usize>().ok())
}

fn set_input_element_value(doc: &mut Document, node: NodeId, value: &str, sink: &mut dyn ChangeSink) {
    if doc.control_value(node) == value {
        return;
    }
    doc.set_control_value(node, value);
    sink.value_changed(node);
}
