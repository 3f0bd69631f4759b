use std::collections::HashSet;

use crate::dom::dom_model::{DomTree, NodeId, NodeType};
use crate::form::classifier::{is_checkable_element, is_form_control_element, label_control};
use crate::form::form_model::{InferredLabel, LabelSource};
use crate::form::text_aggregator::{
    combine_and_collapse_whitespace, find_child_text, find_child_text_with_ignore_list,
};

/// Inline tags treated like plain text when coalescing sibling labels.
const LIGHTWEIGHT_TAGS: &[&str] = &["b", "strong", "span", "font"];

/// Containers the div walk refuses to climb out of.
const TRAVERSABLE_CONTAINER_TAGS: &[&str] = &["dd", "div", "fieldset", "li", "td", "table"];

/// Maximum `colspan` honoured when lining up table cells.
const MAX_COLSPAN: usize = 1000;

// ============================================================================
// Ancestor dispatch
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AncestorRule {
    DivTable,
    /// Table column first, then table row.
    TableCell,
    DefinitionList,
    ListItem,
    /// No further ancestor heuristics once a fieldset is reached.
    Stop,
}

/// Ancestor tags that select a heuristic. The closest matching ancestor is
/// tried first; each tag is tried at most once.
pub const ANCESTOR_RULES: &[(&str, AncestorRule)] = &[
    ("div", AncestorRule::DivTable),
    ("td", AncestorRule::TableCell),
    ("dd", AncestorRule::DefinitionList),
    ("li", AncestorRule::ListItem),
    ("fieldset", AncestorRule::Stop),
];

fn ancestor_rule(tag: &str) -> Option<AncestorRule> {
    ANCESTOR_RULES
        .iter()
        .find(|(t, _)| *t == tag)
        .map(|(_, rule)| *rule)
}

// ============================================================================
// Cascade
// ============================================================================

/// Label for a field that no `<label>` element claims. Empty when nothing in
/// the surrounding markup looks like one.
pub fn infer_label_for_element<T: DomTree>(tree: &T, element: NodeId) -> String {
    infer_label_with_source(tree, element).text
}

pub fn infer_label_with_source<T: DomTree>(tree: &T, element: NodeId) -> InferredLabel {
    if is_checkable_element(tree, element) {
        let label = infer_label_from_next(tree, element);
        if !label.is_empty() {
            return InferredLabel::new(label, LabelSource::NextSibling);
        }
    }

    let label = infer_label_from_previous(tree, element);
    if !label.is_empty() {
        return InferredLabel::new(label, LabelSource::PreviousSibling);
    }

    let label = infer_label_from_placeholder(tree, element);
    if !label.is_empty() {
        return InferredLabel::new(label, LabelSource::Placeholder);
    }

    let mut seen = HashSet::new();
    for ancestor in tree.ancestors(element) {
        let Some(tag) = tree.tag_name(ancestor) else {
            continue;
        };
        if !seen.insert(tag) {
            continue;
        }

        let inferred = match ancestor_rule(tag) {
            Some(AncestorRule::DivTable) => {
                InferredLabel::new(infer_label_from_div_table(tree, element), LabelSource::DivTable)
            }
            Some(AncestorRule::TableCell) => {
                let column = infer_label_from_table_column(tree, element);
                if column.is_empty() {
                    InferredLabel::new(infer_label_from_table_row(tree, element), LabelSource::TableRow)
                } else {
                    InferredLabel::new(column, LabelSource::TableColumn)
                }
            }
            Some(AncestorRule::DefinitionList) => InferredLabel::new(
                infer_label_from_definition_list(tree, element),
                LabelSource::DefinitionList,
            ),
            Some(AncestorRule::ListItem) => {
                InferredLabel::new(infer_label_from_list_item(tree, element), LabelSource::ListItem)
            }
            Some(AncestorRule::Stop) => break,
            None => continue,
        };

        if !inferred.is_empty() {
            return inferred;
        }
    }

    InferredLabel::none()
}

// ============================================================================
// Sibling heuristics
// ============================================================================

/// Text immediately before the field: `Name: <input>`.
pub fn infer_label_from_previous<T: DomTree>(tree: &T, element: NodeId) -> String {
    infer_label_from_sibling(tree, element, false)
}

/// Text immediately after the field: `<input type=checkbox> I agree`.
pub fn infer_label_from_next<T: DomTree>(tree: &T, element: NodeId) -> String {
    infer_label_from_sibling(tree, element, true)
}

fn infer_label_from_sibling<T: DomTree>(tree: &T, element: NodeId, forward: bool) -> String {
    let mut inferred = String::new();
    let mut sibling = element;

    loop {
        let next = if forward {
            tree.next_sibling(sibling)
        } else {
            tree.previous_sibling(sibling)
        };
        let Some(node) = next else {
            break;
        };
        sibling = node;

        let node_type = tree.node_type(node);
        if node_type == NodeType::Comment {
            continue;
        }
        if node_type != NodeType::Text && node_type != NodeType::Element {
            break;
        }

        // A label may be split across text nodes and inline elements.
        let lightweight = node_type == NodeType::Text
            || tree
                .tag_name(node)
                .map(|t| LIGHTWEIGHT_TAGS.contains(&t))
                .unwrap_or(false);
        if lightweight {
            let value = find_child_text(tree, node);
            let line_break = node_type == NodeType::Text && value.is_empty();
            inferred = if forward {
                combine_and_collapse_whitespace(&inferred, &value, line_break)
            } else {
                combine_and_collapse_whitespace(&value, &inferred, line_break)
            };
            continue;
        }

        // A partial label followed by a heavier element is complete.
        if !inferred.trim().is_empty() {
            break;
        }

        if tree.has_tag(node, "img") || tree.has_tag(node, "br") {
            continue;
        }

        if tree.has_tag(node, "p") || tree.has_tag(node, "label") {
            inferred = find_child_text(tree, node);
        }
        break;
    }

    inferred.trim().to_string()
}

pub fn infer_label_from_placeholder<T: DomTree>(tree: &T, element: NodeId) -> String {
    tree.attribute(element, "placeholder")
        .unwrap_or("")
        .to_string()
}

// ============================================================================
// Ancestor heuristics
// ============================================================================

/// Closest ancestor with `tag`, stopping at the first non-element ancestor.
fn enclosing<T: DomTree>(tree: &T, element: NodeId, tag: &str) -> Option<NodeId> {
    tree.ancestors(element)
        .take_while(|&a| tree.is_element(a))
        .find(|&a| tree.has_tag(a, tag))
}

/// Whole text of the enclosing `<li>`.
///
/// The field's own neighbourhood is not excluded here: text that follows the
/// field inside the same list item is part of the result.
pub fn infer_label_from_list_item<T: DomTree>(tree: &T, element: NodeId) -> String {
    match enclosing(tree, element, "li") {
        Some(li) => find_child_text(tree, li),
        None => String::new(),
    }
}

/// First non-empty cell to the left of the field's `<td>`.
pub fn infer_label_from_table_column<T: DomTree>(tree: &T, element: NodeId) -> String {
    let Some(cell) = enclosing(tree, element, "td") else {
        return String::new();
    };

    let mut inferred = String::new();
    let mut previous = tree.previous_sibling(cell);
    while inferred.is_empty() {
        let Some(node) = previous else {
            break;
        };
        if tree.has_tag(node, "td") || tree.has_tag(node, "th") {
            inferred = find_child_text(tree, node);
        }
        previous = tree.previous_sibling(node);
    }
    inferred
}

fn column_span<T: DomTree>(tree: &T, cell: NodeId) -> usize {
    tree.attribute(cell, "colspan")
        .and_then(|v| v.trim().parse::<usize>().ok())
        .map(|span| span.clamp(1, MAX_COLSPAN))
        .unwrap_or(1)
}

/// The cell directly above the field's cell when the two rows line up,
/// otherwise the first non-empty preceding row.
pub fn infer_label_from_table_row<T: DomTree>(tree: &T, element: NodeId) -> String {
    let Some(cell) = tree.ancestors(element).find(|&a| tree.has_tag(a, "td")) else {
        return String::new();
    };

    let mut cell_count = column_span(tree, cell);
    let mut cell_position = 0;
    let mut cell_position_end = cell_count - 1;

    let mut left = tree.previous_sibling(cell);
    while let Some(node) = left {
        if tree.has_tag(node, "td") {
            cell_position += column_span(tree, node);
        }
        left = tree.previous_sibling(node);
    }

    let mut right = tree.next_sibling(cell);
    while let Some(node) = right {
        if tree.has_tag(node, "td") {
            cell_count += column_span(tree, node);
        }
        right = tree.next_sibling(node);
    }

    cell_count += cell_position;
    cell_position_end += cell_position;

    let Some(row) = enclosing(tree, element, "tr") else {
        return String::new();
    };

    let mut previous_row = tree.previous_sibling(row);
    while let Some(node) = previous_row {
        if tree.has_tag(node, "tr") {
            break;
        }
        previous_row = tree.previous_sibling(node);
    }

    if let Some(prev) = previous_row {
        let mut matching_cell = None;
        let mut prev_row_count = 0;
        for node in tree.children(prev) {
            if tree.has_tag(node, "td") || tree.has_tag(node, "th") {
                let span = column_span(tree, node);
                let prev_row_count_end = prev_row_count + span - 1;
                if prev_row_count == cell_position && prev_row_count_end == cell_position_end {
                    matching_cell = Some(node);
                }
                prev_row_count += span;
            }
        }

        if let Some(matching) = matching_cell {
            if cell_count == prev_row_count {
                let inferred = find_child_text(tree, matching);
                if !inferred.is_empty() {
                    return inferred;
                }
            }
        }
    }

    let mut inferred = String::new();
    let mut previous = tree.previous_sibling(row);
    while inferred.is_empty() {
        let Some(node) = previous else {
            break;
        };
        if tree.has_tag(node, "tr") {
            inferred = find_child_text(tree, node);
        }
        previous = tree.previous_sibling(node);
    }
    inferred
}

fn is_traversable_container<T: DomTree>(tree: &T, node: NodeId) -> bool {
    tree.tag_name(node)
        .map(|t| TRAVERSABLE_CONTAINER_TAGS.contains(&t))
        .unwrap_or(false)
}

fn contains_form_control<T: DomTree>(tree: &T, node: NodeId) -> bool {
    tree.descendants(node)
        .any(|n| is_form_control_element(tree, n))
}

/// Walk the enclosing and preceding `<div>`s for label text.
///
/// Preceding divs that hold another form control belong to some other field;
/// their text is discarded and they are skipped when an enclosing div is
/// read later. A preceding `<label>` that claims no control is used as is.
pub fn infer_label_from_div_table<T: DomTree>(tree: &T, element: NodeId) -> String {
    let mut node = tree.parent(element);
    let mut looking_for_parent = true;
    let mut divs_to_skip = HashSet::new();
    let mut inferred = String::new();

    while inferred.is_empty() {
        let Some(current) = node else {
            break;
        };

        if tree.has_tag(current, "div") {
            inferred = if looking_for_parent {
                find_child_text_with_ignore_list(tree, current, &divs_to_skip)
            } else {
                find_child_text(tree, current)
            };

            if !looking_for_parent && !inferred.is_empty() && contains_form_control(tree, current) {
                inferred.clear();
                divs_to_skip.insert(current);
            }

            looking_for_parent = false;
        } else if !looking_for_parent && tree.has_tag(current, "label") {
            if label_control(tree, current).is_none() {
                inferred = find_child_text(tree, current);
            }
        } else if looking_for_parent && is_traversable_container(tree, current) {
            break;
        }

        if tree.previous_sibling(current).is_none() {
            looking_for_parent = true;
        }

        node = if looking_for_parent {
            tree.parent(current)
        } else {
            tree.previous_sibling(current)
        };
    }

    inferred
}

/// Text of the `<dt>` paired with the field's `<dd>`.
pub fn infer_label_from_definition_list<T: DomTree>(tree: &T, element: NodeId) -> String {
    let Some(dd) = enclosing(tree, element, "dd") else {
        return String::new();
    };

    let mut previous = tree.previous_sibling(dd);
    while let Some(node) = previous {
        if tree.node_type(node) != NodeType::Text {
            break;
        }
        previous = tree.previous_sibling(node);
    }

    match previous {
        Some(dt) if tree.has_tag(dt, "dt") => find_child_text(tree, dt),
        _ => String::new(),
    }
}
