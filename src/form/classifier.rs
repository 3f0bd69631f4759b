use crate::dom::dom_model::{DomTree, NodeId};

const KNOWN_INPUT_TYPES: &[&str] = &[
    "text", "search", "tel", "url", "email", "password", "date", "month", "week", "time",
    "datetime-local", "number", "range", "color", "checkbox", "radio", "file", "submit",
    "image", "reset", "button", "hidden",
];

const TEXT_FIELD_TYPES: &[&str] = &["text", "email", "password", "search", "tel", "url", "number"];

const LABELABLE_TAGS: &[&str] = &["button", "meter", "output", "progress", "select", "textarea"];

/// Normalised `type` of an `<input>`: lower-cased, unknown values map to
/// `text`.
pub fn input_type<T: DomTree>(tree: &T, node: NodeId) -> String {
    let raw = tree
        .attribute(node, "type")
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    if KNOWN_INPUT_TYPES.contains(&raw.as_str()) {
        raw
    } else {
        "text".to_string()
    }
}

/// The control's type as a form reports it: the input type, `select-one`,
/// `select-multiple` or `textarea`.
pub fn form_control_type<T: DomTree>(tree: &T, node: NodeId) -> Option<String> {
    match tree.tag_name(node)? {
        "input" => Some(input_type(tree, node)),
        "select" if tree.attribute(node, "multiple").is_some() => Some("select-multiple".into()),
        "select" => Some("select-one".into()),
        "textarea" => Some("textarea".into()),
        _ => None,
    }
}

pub fn is_form_control_element<T: DomTree>(tree: &T, node: NodeId) -> bool {
    matches!(tree.tag_name(node), Some("input" | "select" | "textarea"))
}

pub fn is_checkable_element<T: DomTree>(tree: &T, node: NodeId) -> bool {
    tree.has_tag(node, "input")
        && matches!(input_type(tree, node).as_str(), "checkbox" | "radio")
}

/// Single-line text-like input.
pub fn is_text_input<T: DomTree>(tree: &T, node: NodeId) -> bool {
    tree.has_tag(node, "input") && TEXT_FIELD_TYPES.contains(&input_type(tree, node).as_str())
}

/// Only single-choice selects take part in autofill.
pub fn is_select_element<T: DomTree>(tree: &T, node: NodeId) -> bool {
    form_control_type(tree, node).as_deref() == Some("select-one")
}

pub fn is_text_area_element<T: DomTree>(tree: &T, node: NodeId) -> bool {
    tree.has_tag(node, "textarea")
}

pub fn is_autofillable_input_element<T: DomTree>(tree: &T, node: NodeId) -> bool {
    is_text_input(tree, node) || is_checkable_element(tree, node)
}

pub fn is_autofillable_element<T: DomTree>(tree: &T, node: NodeId) -> bool {
    is_autofillable_input_element(tree, node)
        || is_select_element(tree, node)
        || is_text_area_element(tree, node)
}

/// Elements a `<label>` can point at.
pub fn is_labelable_element<T: DomTree>(tree: &T, node: NodeId) -> bool {
    match tree.tag_name(node) {
        Some("input") => input_type(tree, node) != "hidden",
        Some(tag) => LABELABLE_TAGS.contains(&tag),
        None => false,
    }
}

/// Identifier used to match fill values to controls: `name`, else `id`.
pub fn name_for_autofill<T: DomTree>(tree: &T, node: NodeId) -> String {
    let name = tree.attribute(node, "name").unwrap_or("").trim();
    if !name.is_empty() {
        return name.to_string();
    }
    tree.attribute(node, "id").unwrap_or("").trim().to_string()
}

/// Identifier of a `<form>`: `name`, else `id`, else empty.
pub fn form_identifier<T: DomTree>(tree: &T, form: NodeId) -> String {
    let name = tree.attribute(form, "name").unwrap_or("");
    if !name.is_empty() {
        return name.to_string();
    }
    tree.attribute(form, "id").unwrap_or("").to_string()
}

/// The form a control belongs to. A `form` attribute wins over nesting; when
/// it names no `<form>` the control has no owner.
pub fn form_owner<T: DomTree>(tree: &T, node: NodeId) -> Option<NodeId> {
    if let Some(form_id) = tree.attribute(node, "form") {
        return tree
            .element_by_id(form_id)
            .filter(|&f| tree.has_tag(f, "form"));
    }
    tree.ancestors(node).find(|&a| tree.has_tag(a, "form"))
}

/// The control a `<label>` is associated with: the element named by `for`
/// if present, otherwise the first labelable descendant.
pub fn label_control<T: DomTree>(tree: &T, label: NodeId) -> Option<NodeId> {
    if let Some(target) = tree.attribute(label, "for") {
        return tree
            .element_by_id(target)
            .filter(|&n| is_labelable_element(tree, n));
    }
    tree.descendants(label)
        .find(|&n| tree.is_element(n) && is_labelable_element(tree, n))
}
