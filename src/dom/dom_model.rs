use serde::{Deserialize, Serialize};

// ============================================================================
// Node handles
// ============================================================================

/// Handle to a node inside one document. Handles are only meaningful for the
/// tree that produced them; child frames have their own id space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Document,
    Element,
    Text,
    Comment,
}

// ============================================================================
// DomTree trait: the read-only view the extractor and inference work over
// ============================================================================

/// Read access to a document tree.
///
/// The classifier, the text aggregator, the label inference cascade and the
/// extractor are written against this trait so they can run over any tree
/// shape, including the synthetic trees built in tests.
pub trait DomTree: Sized {
    fn root(&self) -> NodeId;

    /// URL of the document, if it has one.
    fn url(&self) -> Option<&str>;

    fn node_type(&self, node: NodeId) -> NodeType;

    /// Lower-case tag name for element nodes.
    fn tag_name(&self, node: NodeId) -> Option<&str>;

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str>;

    /// Raw character data of text and comment nodes.
    fn text(&self, node: NodeId) -> Option<&str>;

    fn parent(&self, node: NodeId) -> Option<NodeId>;
    fn first_child(&self, node: NodeId) -> Option<NodeId>;
    fn next_sibling(&self, node: NodeId) -> Option<NodeId>;
    fn previous_sibling(&self, node: NodeId) -> Option<NodeId>;

    /// Current value of a form control (dirty value if the user or the fill
    /// engine changed it, default value otherwise).
    fn control_value(&self, node: NodeId) -> String;

    fn is_checked(&self, node: NodeId) -> bool;

    /// Index into `options(select)` of the selected option.
    fn selected_index(&self, select: NodeId) -> Option<usize>;

    /// Content document of a frame element.
    fn frame(&self, node: NodeId) -> Option<&Self>;

    // ------------------------------------------------------------------
    // Provided traversal helpers
    // ------------------------------------------------------------------

    fn is_element(&self, node: NodeId) -> bool {
        self.node_type(node) == NodeType::Element
    }

    fn has_tag(&self, node: NodeId, tag: &str) -> bool {
        self.tag_name(node) == Some(tag)
    }

    fn children(&self, node: NodeId) -> Children<'_, Self> {
        Children {
            tree: self,
            next: self.first_child(node),
        }
    }

    /// Pre-order walk of every node below `node` (excluding `node`).
    fn descendants(&self, node: NodeId) -> Descendants<'_, Self> {
        Descendants {
            tree: self,
            scope: node,
            next: self.first_child(node),
        }
    }

    /// Parent, grandparent, … up to the document node.
    fn ancestors(&self, node: NodeId) -> Ancestors<'_, Self> {
        Ancestors {
            tree: self,
            next: self.parent(node),
        }
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        if id.is_empty() {
            return None;
        }
        self.descendants(self.root())
            .find(|&n| self.is_element(n) && self.attribute(n, "id") == Some(id))
    }

    /// Concatenation of every descendant text node.
    fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        if let Some(t) = self.text(node) {
            if self.node_type(node) == NodeType::Text {
                out.push_str(t);
            }
        }
        for n in self.descendants(node) {
            if self.node_type(n) == NodeType::Text {
                if let Some(t) = self.text(n) {
                    out.push_str(t);
                }
            }
        }
        out
    }

    /// `<option>` elements of a select, including those inside `<optgroup>`.
    fn options(&self, select: NodeId) -> Vec<NodeId> {
        self.descendants(select)
            .filter(|&n| self.has_tag(n, "option"))
            .collect()
    }

    /// Whitespace-collapsed option label.
    fn option_text(&self, option: NodeId) -> String {
        self.text_content(option)
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// The option's `value` attribute, or its text when absent.
    fn option_value(&self, option: NodeId) -> String {
        match self.attribute(option, "value") {
            Some(v) => v.to_string(),
            None => self.option_text(option),
        }
    }
}

// ============================================================================
// Iterators
// ============================================================================

pub struct Children<'a, T: DomTree> {
    tree: &'a T,
    next: Option<NodeId>,
}

impl<T: DomTree> Iterator for Children<'_, T> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.next_sibling(current);
        Some(current)
    }
}

pub struct Descendants<'a, T: DomTree> {
    tree: &'a T,
    scope: NodeId,
    next: Option<NodeId>,
}

impl<T: DomTree> Iterator for Descendants<'_, T> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;

        self.next = match self.tree.first_child(current) {
            Some(child) => Some(child),
            None => {
                // Climb until a node with a next sibling, without leaving scope.
                let mut cursor = current;
                loop {
                    if cursor == self.scope {
                        break None;
                    }
                    if let Some(sibling) = self.tree.next_sibling(cursor) {
                        break Some(sibling);
                    }
                    match self.tree.parent(cursor) {
                        Some(p) if p != self.scope => cursor = p,
                        _ => break None,
                    }
                }
            }
        };

        Some(current)
    }
}

pub struct Ancestors<'a, T: DomTree> {
    tree: &'a T,
    next: Option<NodeId>,
}

impl<T: DomTree> Iterator for Ancestors<'_, T> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}
