use std::collections::HashMap;

use crate::{Error, Result};

/// Handle to a node in a [`Dom`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

#[derive(Debug, Clone)]
pub(crate) enum NodeType {
    Document,
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) node_type: NodeType,
}

#[derive(Debug, Clone)]
pub(crate) struct Element {
    pub(crate) tag_name: String,
    pub(crate) attrs: Vec<(String, String)>,
    pub(crate) value: String,
}

impl Element {
    pub(crate) fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Element tree of a page. Nodes live in an arena and are never freed; an id
/// index maps `id` attributes to the first element that declared them.
#[derive(Debug, Clone)]
pub struct Dom {
    pub(crate) nodes: Vec<Node>,
    pub(crate) root: NodeId,
    id_index: HashMap<String, NodeId>,
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

impl Dom {
    pub fn new() -> Self {
        let root = Node {
            parent: None,
            children: Vec::new(),
            node_type: NodeType::Document,
        };
        Self {
            nodes: vec![root],
            root: NodeId(0),
            id_index: HashMap::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    fn create_node(&mut self, parent: Option<NodeId>, node_type: NodeType) -> NodeId {
        let id = NodeId(self.nodes.len());
        let parent = parent.filter(|parent_id| parent_id.0 < self.nodes.len());
        self.nodes.push(Node {
            parent,
            children: Vec::new(),
            node_type,
        });
        if let Some(parent_node) = parent.and_then(|parent_id| self.nodes.get_mut(parent_id.0)) {
            parent_node.children.push(id);
        }
        id
    }

    pub fn create_element(
        &mut self,
        parent: NodeId,
        tag_name: &str,
        attrs: Vec<(String, String)>,
    ) -> NodeId {
        let value = attrs
            .iter()
            .find(|(key, _)| key == "value")
            .map(|(_, value)| value.clone())
            .unwrap_or_default();
        let element = Element {
            tag_name: tag_name.to_ascii_lowercase(),
            attrs,
            value,
        };
        let id = self.create_node(Some(parent), NodeType::Element(element));
        if let Some(id_attr) = self.attr(id, "id") {
            let id_attr = id_attr.to_string();
            self.id_index.entry(id_attr).or_insert(id);
        }
        id
    }

    pub fn create_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.create_node(Some(parent), NodeType::Text(text.to_string()))
    }

    pub(crate) fn element(&self, node_id: NodeId) -> Option<&Element> {
        match &self.nodes.get(node_id.0)?.node_type {
            NodeType::Element(element) => Some(element),
            _ => None,
        }
    }

    fn element_mut(&mut self, node_id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes.get_mut(node_id.0)?.node_type {
            NodeType::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn tag_name(&self, node_id: NodeId) -> Option<&str> {
        self.element(node_id).map(|e| e.tag_name.as_str())
    }

    pub fn attr(&self, node_id: NodeId, name: &str) -> Option<&str> {
        self.element(node_id)?.attr(name)
    }

    pub fn parent(&self, node_id: NodeId) -> Option<NodeId> {
        self.nodes.get(node_id.0)?.parent
    }

    pub fn by_id(&self, id: &str) -> Option<NodeId> {
        self.id_index.get(id).copied()
    }

    /// Elements in document order.
    pub fn elements(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![self.root];
        while let Some(node_id) = stack.pop() {
            if self.element(node_id).is_some() {
                out.push(node_id);
            }
            if let Some(node) = self.nodes.get(node_id.0) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    pub fn value(&self, node_id: NodeId) -> Result<String> {
        let element = self
            .element(node_id)
            .ok_or_else(|| Error::TypeMismatch {
                selector: format!("node {}", node_id.0),
                expected: "element".into(),
                actual: "non-element".into(),
            })?;
        Ok(element.value.clone())
    }

    pub fn set_value(&mut self, node_id: NodeId, value: &str) -> Result<()> {
        let element = self
            .element_mut(node_id)
            .ok_or_else(|| Error::TypeMismatch {
                selector: format!("node {}", node_id.0),
                expected: "element".into(),
                actual: "non-element".into(),
            })?;
        element.value = value.to_string();
        Ok(())
    }

    /// Concatenated text of a subtree. Unknown handles yield an empty string.
    pub fn text_content(&self, node_id: NodeId) -> String {
        let Some(node) = self.nodes.get(node_id.0) else {
            return String::new();
        };
        stacker::maybe_grow(64 * 1024, 1024 * 1024, || {
            match &node.node_type {
                NodeType::Document | NodeType::Element(_) => {
                    let mut out = String::new();
                    for child in &node.children {
                        out.push_str(&self.text_content(*child));
                    }
                    out
                }
                NodeType::Text(text) => text.clone(),
            }
        })
    }

    /// Replaces the children of an element with a single text node. An
    /// existing text child is overwritten in place, so repeated writes to the
    /// same label do not grow the arena.
    pub fn set_text_content(&mut self, node_id: NodeId, value: &str) -> Result<()> {
        let Some(node) = self.nodes.get_mut(node_id.0) else {
            return Err(Error::TypeMismatch {
                selector: format!("node {}", node_id.0),
                expected: "element".into(),
                actual: "missing node".into(),
            });
        };
        if !matches!(node.node_type, NodeType::Element(_)) {
            return Err(Error::TypeMismatch {
                selector: format!("node {}", node_id.0),
                expected: "element".into(),
                actual: "non-element".into(),
            });
        }
        let old_children = std::mem::take(&mut node.children);
        let mut kept = None;
        for child in old_children {
            let child_node = &mut self.nodes[child.0];
            match &mut child_node.node_type {
                NodeType::Text(text) if kept.is_none() => {
                    text.clear();
                    text.push_str(value);
                    kept = Some(child);
                }
                _ => child_node.parent = None,
            }
        }
        match kept {
            Some(child) => self.nodes[node_id.0].children.push(child),
            None => {
                self.create_text(node_id, value);
            }
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn dump_node(&self, node_id: NodeId) -> String {
        let Some(node) = self.nodes.get(node_id.0) else {
            return String::new();
        };
        stacker::maybe_grow(64 * 1024, 1024 * 1024, || {
            match &node.node_type {
                NodeType::Document => {
                    let mut out = String::new();
                    for child in &node.children {
                        out.push_str(&self.dump_node(*child));
                    }
                    out
                }
                NodeType::Text(text) => escape_html_text(text),
                NodeType::Element(element) => {
                    let mut out = String::new();
                    out.push('<');
                    out.push_str(&element.tag_name);
                    for (k, v) in &element.attrs {
                        out.push(' ');
                        out.push_str(k);
                        out.push_str("=\"");
                        out.push_str(&escape_html_attr(v));
                        out.push('"');
                    }
                    out.push('>');
                    if crate::html::is_void_tag(&element.tag_name) {
                        return out;
                    }
                    for child in &node.children {
                        out.push_str(&self.dump_node(*child));
                    }
                    out.push_str("</");
                    out.push_str(&element.tag_name);
                    out.push('>');
                    out
                }
            }
        })
    }
}

fn escape_html_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

fn escape_html_attr(value: &str) -> String {
    escape_html_text(value).replace('"', "&quot;")
}
