use std::collections::HashSet;

use crate::dom::dom_model::{DomTree, NodeId, NodeType};
use crate::form::classifier::{is_autofillable_element, is_form_control_element};

/// How far child and sibling text is followed from the starting node. Every
/// step to a first child or to a next sibling consumes one level.
pub const MAX_TEXT_DEPTH: usize = 10;

const OPAQUE_TAGS: &[&str] = &["option", "script", "noscript"];

/// Join two text fragments, collapsing the whitespace at the seam.
///
/// A single space separates the fragments when the prefix ended in
/// whitespace, the suffix started with whitespace, or `force_whitespace` is
/// set; otherwise they are joined directly.
pub fn combine_and_collapse_whitespace(prefix: &str, suffix: &str, force_whitespace: bool) -> String {
    let prefix_trimmed = prefix.trim_end();
    let suffix_trimmed = suffix.trim_start();
    let prefix_had_trailing = prefix_trimmed.len() != prefix.len();
    let suffix_had_leading = suffix_trimmed.len() != suffix.len();

    if prefix_had_trailing || suffix_had_leading || force_whitespace {
        format!("{prefix_trimmed} {suffix_trimmed}")
    } else {
        format!("{prefix_trimmed}{suffix_trimmed}")
    }
}

/// Character data of a text node with line breaks and tabs removed. Empty for
/// anything else.
pub fn node_value<T: DomTree>(tree: &T, node: NodeId) -> String {
    if tree.node_type(node) != NodeType::Text {
        return String::new();
    }
    tree.text(node)
        .unwrap_or("")
        .chars()
        .filter(|c| *c != '\n' && *c != '\t')
        .collect()
}

/// Text a reader would see under `node`, trimmed.
pub fn find_child_text<T: DomTree>(tree: &T, node: NodeId) -> String {
    find_child_text_with_ignore_list(tree, node, &HashSet::new())
}

/// Like [`find_child_text`], but nodes in `skip` (and whatever follows them
/// in their sibling chain) contribute nothing.
pub fn find_child_text_with_ignore_list<T: DomTree>(
    tree: &T,
    node: NodeId,
    skip: &HashSet<NodeId>,
) -> String {
    if tree.node_type(node) == NodeType::Text {
        return node_value(tree, node);
    }
    find_child_text_inner(tree, tree.first_child(node), MAX_TEXT_DEPTH, skip)
        .trim()
        .to_string()
}

/// Text of `start`, its descendants and its following siblings, bounded by
/// `depth`. Nodes that cannot hold label text (option, script, noscript,
/// fillable controls, skipped containers) end the walk at that point.
pub fn find_child_text_inner<T: DomTree>(
    tree: &T,
    start: Option<NodeId>,
    depth: usize,
    skip: &HashSet<NodeId>,
) -> String {
    let mut depth = depth;
    let mut current = start;

    // Comments and empty text nodes are stepped over; comments consume depth.
    let node = loop {
        if depth == 0 {
            return String::new();
        }
        let Some(node) = current else {
            return String::new();
        };
        match tree.node_type(node) {
            NodeType::Comment => {
                current = tree.next_sibling(node);
                depth -= 1;
            }
            NodeType::Text if node_value(tree, node).is_empty() => {
                current = tree.next_sibling(node);
            }
            NodeType::Text | NodeType::Element => break node,
            NodeType::Document => return String::new(),
        }
    };

    if is_opaque(tree, node) || skip.contains(&node) {
        return String::new();
    }

    let own_text = node_value(tree, node);
    let child_text = find_child_text_inner(tree, tree.first_child(node), depth - 1, skip);
    let text = combine_and_collapse_whitespace(&own_text, &child_text, false);

    let sibling_text = find_child_text_inner(tree, tree.next_sibling(node), depth - 1, skip);
    combine_and_collapse_whitespace(&text, &sibling_text, false)
}

fn is_opaque<T: DomTree>(tree: &T, node: NodeId) -> bool {
    let Some(tag) = tree.tag_name(node) else {
        return false;
    };
    if OPAQUE_TAGS.contains(&tag) {
        return true;
    }
    is_form_control_element(tree, node) && is_autofillable_element(tree, node)
}
