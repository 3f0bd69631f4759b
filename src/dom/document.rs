use crate::dom::dom_model::{DomTree, NodeId, NodeType};

// ============================================================================
// Arena document
// ============================================================================

#[derive(Debug, Clone)]
pub struct ElementData {
    pub tag: String,
    pub attrs: Vec<(String, String)>,

    /// Dirty value of an input or textarea.
    pub value: Option<String>,
    /// Dirty checkedness of a checkbox or radio.
    pub checked: Option<bool>,
    /// Dirty selectedness of an option.
    pub selected: Option<bool>,

    /// Content document for `<iframe>` / `<frame>`.
    pub frame: Option<Box<Document>>,
    /// Inert contents of a `<template>`. Kept for serialization only; no
    /// traversal reaches into it.
    pub template_content: Option<Box<Document>>,
}

impl ElementData {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
            value: None,
            checked: None,
            selected: None,
            frame: None,
            template_content: None,
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone)]
pub enum NodeData {
    Document,
    Element(ElementData),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone)]
struct Node {
    data: NodeData,
    parent: Option<NodeId>,
    first_child: Option<NodeId>,
    last_child: Option<NodeId>,
    prev_sibling: Option<NodeId>,
    next_sibling: Option<NodeId>,
}

impl Node {
    fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: None,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
        }
    }
}

/// In-memory document: the tree plus the live state of its form controls.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    url: Option<String>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeData::Document)],
            url: None,
        }
    }

    pub fn set_url(&mut self, url: Option<String>) {
        self.url = url;
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn data(&self, node: NodeId) -> &NodeData {
        &self.nodes[node.0].data
    }

    pub fn element(&self, node: NodeId) -> Option<&ElementData> {
        match &self.nodes[node.0].data {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }

    fn element_mut(&mut self, node: NodeId) -> Option<&mut ElementData> {
        match &mut self.nodes[node.0].data {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }

    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    fn push(&mut self, data: NodeData) -> NodeId {
        self.nodes.push(Node::new(data));
        NodeId(self.nodes.len() - 1)
    }

    pub fn create_element(&mut self, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        let mut el = ElementData::new(tag);
        el.attrs = attrs
            .iter()
            .map(|(k, v)| (k.to_ascii_lowercase(), v.to_string()))
            .collect();
        self.push(NodeData::Element(el))
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeData::Text(text.to_string()))
    }

    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.push(NodeData::Comment(text.to_string()))
    }

    /// Append `child` as the last child of `parent`, detaching it first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);

        let last = self.nodes[parent.0].last_child;
        self.nodes[child.0].parent = Some(parent);
        self.nodes[child.0].prev_sibling = last;

        match last {
            Some(l) => self.nodes[l.0].next_sibling = Some(child),
            None => self.nodes[parent.0].first_child = Some(child),
        }
        self.nodes[parent.0].last_child = Some(child);
    }

    pub fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.nodes[node.0].parent.take() else {
            return;
        };
        let prev = self.nodes[node.0].prev_sibling.take();
        let next = self.nodes[node.0].next_sibling.take();

        match prev {
            Some(p) => self.nodes[p.0].next_sibling = next,
            None => self.nodes[parent.0].first_child = next,
        }
        match next {
            Some(n) => self.nodes[n.0].prev_sibling = prev,
            None => self.nodes[parent.0].last_child = prev,
        }
    }

    /// Attach a content document to a frame element.
    pub fn set_frame(&mut self, node: NodeId, frame: Document) {
        if let Some(el) = self.element_mut(node) {
            el.frame = Some(Box::new(frame));
        }
    }

    pub fn set_template_content(&mut self, node: NodeId, content: Document) {
        if let Some(el) = self.element_mut(node) {
            el.template_content = Some(Box::new(content));
        }
    }

    pub fn template_content(&self, node: NodeId) -> Option<&Document> {
        self.element(node).and_then(|el| el.template_content.as_deref())
    }

    // ------------------------------------------------------------------
    // Attributes
    // ------------------------------------------------------------------

    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        let Some(el) = self.element_mut(node) else {
            return;
        };
        match el.attrs.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(name)) {
            Some((_, v)) => *v = value.to_string(),
            None => el.attrs.push((name.to_ascii_lowercase(), value.to_string())),
        }
    }

    pub fn remove_attribute(&mut self, node: NodeId, name: &str) {
        if let Some(el) = self.element_mut(node) {
            el.attrs.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        }
    }

    // ------------------------------------------------------------------
    // Control state
    // ------------------------------------------------------------------

    /// Set the dirty value of an input or textarea.
    pub fn set_control_value(&mut self, node: NodeId, value: &str) {
        if let Some(el) = self.element_mut(node) {
            if el.tag == "input" || el.tag == "textarea" {
                el.value = Some(value.to_string());
            }
        }
    }

    pub fn set_checked(&mut self, node: NodeId, checked: bool) {
        if let Some(el) = self.element_mut(node) {
            el.checked = Some(checked);
        }
    }

    /// Select the option at `index` (or none), marking every option dirty.
    pub fn set_selected_index(&mut self, select: NodeId, index: Option<usize>) {
        let options = self.options(select);
        for (i, option) in options.into_iter().enumerate() {
            if let Some(el) = self.element_mut(option) {
                el.selected = Some(Some(i) == index);
            }
        }
    }

    /// Select the first option whose value equals `value`. Returns false when
    /// no option carries that value; the selection is left untouched then.
    pub fn set_select_value(&mut self, select: NodeId, value: &str) -> bool {
        let position = self
            .options(select)
            .into_iter()
            .position(|o| self.option_value(o) == value);
        match position {
            Some(i) => {
                self.set_selected_index(select, Some(i));
                true
            }
            None => false,
        }
    }

    /// Drop dirty state so the control shows its default value again.
    pub fn reset_control(&mut self, node: NodeId) {
        let options = self.options(node);
        if let Some(el) = self.element_mut(node) {
            el.value = None;
            el.checked = None;
        }
        for option in options {
            if let Some(el) = self.element_mut(option) {
                el.selected = None;
            }
        }
    }

    fn is_option_selected(&self, option: NodeId) -> Option<bool> {
        self.element(option).and_then(|el| el.selected)
    }
}

impl DomTree for Document {
    fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    fn node_type(&self, node: NodeId) -> NodeType {
        match self.nodes[node.0].data {
            NodeData::Document => NodeType::Document,
            NodeData::Element(_) => NodeType::Element,
            NodeData::Text(_) => NodeType::Text,
            NodeData::Comment(_) => NodeType::Comment,
        }
    }

    fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.element(node).map(|el| el.tag.as_str())
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node).and_then(|el| el.attr(name))
    }

    fn text(&self, node: NodeId) -> Option<&str> {
        match &self.nodes[node.0].data {
            NodeData::Text(t) | NodeData::Comment(t) => Some(t.as_str()),
            _ => None,
        }
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    fn first_child(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].first_child
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].next_sibling
    }

    fn previous_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].prev_sibling
    }

    fn control_value(&self, node: NodeId) -> String {
        let Some(el) = self.element(node) else {
            return String::new();
        };

        match el.tag.as_str() {
            "input" => {
                let kind = el.attr("type").unwrap_or("").to_ascii_lowercase();
                if kind == "checkbox" || kind == "radio" {
                    return el.attr("value").unwrap_or("on").to_string();
                }
                el.value
                    .clone()
                    .or_else(|| el.attr("value").map(str::to_string))
                    .unwrap_or_default()
            }
            "textarea" => el.value.clone().unwrap_or_else(|| self.text_content(node)),
            "select" => {
                let options = self.options(node);
                self.selected_index(node)
                    .and_then(|i| options.get(i).copied())
                    .map(|o| self.option_value(o))
                    .unwrap_or_default()
            }
            _ => String::new(),
        }
    }

    fn is_checked(&self, node: NodeId) -> bool {
        match self.element(node) {
            Some(el) => el.checked.unwrap_or_else(|| el.attr("checked").is_some()),
            None => false,
        }
    }

    fn selected_index(&self, select: NodeId) -> Option<usize> {
        let options = self.options(select);
        if options.is_empty() {
            return None;
        }

        let dirty = options.iter().any(|&o| self.is_option_selected(o).is_some());
        if dirty {
            return options
                .iter()
                .position(|&o| self.is_option_selected(o) == Some(true));
        }

        let marked = options
            .iter()
            .rposition(|&o| self.attribute(o, "selected").is_some());
        match marked {
            Some(i) => Some(i),
            None if self.attribute(select, "multiple").is_none() => Some(0),
            None => None,
        }
    }

    fn frame(&self, node: NodeId) -> Option<&Self> {
        self.element(node).and_then(|el| el.frame.as_deref())
    }
}
