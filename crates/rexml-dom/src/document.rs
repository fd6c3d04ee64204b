//! Arena-backed mutable XML tree
//!
//! Every node lives in a single `Vec` owned by the [`Document`]; nodes refer to
//! each other through [`NodeId`] indices. Removing a node only detaches it from
//! its parent, so ids handed out earlier stay valid for the lifetime of the
//! document.

use std::path::Path;

use crate::error::XmlError;

/// Index of a node inside its owning [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Element {
        name: String,
        attributes: Vec<Attribute>,
    },
    Text(String),
    CData(String),
    Comment(String),
    ProcessingInstruction(String),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// An owned, ordered XML tree
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document holding only the document node
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// Parse a complete XML document from a string
    pub fn parse(xml: &str) -> Result<Self, XmlError> {
        crate::parse::parse_document(xml)
    }

    /// Read and parse the file at `path` in its declared encoding
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, XmlError> {
        let bytes = std::fs::read(path)?;
        let content = crate::parse::decode_input(&bytes)?;
        Self::parse(&content)
    }

    pub fn document_node(&self) -> NodeId {
        NodeId(0)
    }

    pub fn root_element(&self) -> Option<NodeId> {
        self.child_elements(self.document_node()).next()
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    /// Element name, or `None` for non-element nodes
    pub fn name(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].kind {
            NodeKind::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn child_elements(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes[id.0]
            .children
            .iter()
            .copied()
            .filter(|child| matches!(self.nodes[child.0].kind, NodeKind::Element { .. }))
    }

    pub fn attributes(&self, id: NodeId) -> &[Attribute] {
        match &self.nodes[id.0].kind {
            NodeKind::Element { attributes, .. } => attributes,
            _ => &[],
        }
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.attributes(id)
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.value.as_str())
    }

    /// Set an attribute value, appending the attribute if it does not exist yet.
    /// Ignored on non-element nodes.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) {
        if let NodeKind::Element { attributes, .. } = &mut self.nodes[id.0].kind {
            match attributes.iter_mut().find(|attr| attr.name == name) {
                Some(attr) => attr.value = value.to_string(),
                None => attributes.push(Attribute {
                    name: name.to_string(),
                    value: value.to_string(),
                }),
            }
        }
    }

    /// Concatenated text of all descendant text and CDATA nodes
    pub fn text(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match &self.nodes[id.0].kind {
            NodeKind::Text(text) | NodeKind::CData(text) => out.push_str(text),
            NodeKind::Element { .. } | NodeKind::Document => {
                for &child in &self.nodes[id.0].children {
                    self.collect_text(child, out);
                }
            }
            NodeKind::Comment(_) | NodeKind::ProcessingInstruction(_) => {}
        }
    }

    /// Replace all content of `id` with a single text node
    pub fn set_text(&mut self, id: NodeId, text: &str) {
        self.clear_children(id);
        if !text.is_empty() {
            let text_node = self.alloc(NodeKind::Text(text.to_string()));
            self.append_child(id, text_node);
        }
    }

    /// Detach every child of `id`
    pub fn clear_children(&mut self, id: NodeId) {
        let children = std::mem::take(&mut self.nodes[id.0].children);
        for child in children {
            self.nodes[child.0].parent = None;
        }
    }

    pub(crate) fn alloc(&mut self, kind: NodeKind) -> NodeId {
        self.nodes.push(Node {
            kind,
            parent: None,
            children: Vec::new(),
        });
        NodeId(self.nodes.len() - 1)
    }

    /// Create a detached element
    pub fn create_element(&mut self, name: &str) -> NodeId {
        self.alloc(NodeKind::Element {
            name: name.to_string(),
            attributes: Vec::new(),
        })
    }

    /// Create an element and append it as the last child of `parent`
    pub fn append_element(&mut self, parent: NodeId, name: &str) -> NodeId {
        let id = self.create_element(name);
        self.append_child(parent, id);
        id
    }

    /// Append `child` as the last child of `parent`, detaching it from any previous parent
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.remove(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Insert `child` directly after `reference` among `parent`'s children.
    /// Falls back to appending when `reference` is not a child of `parent`.
    pub fn insert_after(&mut self, parent: NodeId, child: NodeId, reference: NodeId) {
        self.remove(child);
        let position = self.nodes[parent.0]
            .children
            .iter()
            .position(|&c| c == reference);
        self.nodes[child.0].parent = Some(parent);
        match position {
            Some(index) => self.nodes[parent.0].children.insert(index + 1, child),
            None => self.nodes[parent.0].children.push(child),
        }
    }

    /// Detach `id` from its parent. The node and its subtree remain addressable.
    pub fn remove(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|&c| c != id);
        }
    }

    /// Deep-copy `node` from `source` into this document, returning the detached copy
    pub fn import(&mut self, source: &Document, node: NodeId) -> NodeId {
        let copy = self.alloc(source.kind(node).clone());
        for &child in source.children(node) {
            let child_copy = self.import(source, child);
            self.nodes[child_copy.0].parent = Some(copy);
            self.nodes[copy.0].children.push(child_copy);
        }
        copy
    }

    /// Replace the content of `target` with deep copies of `source_node`'s children
    pub fn replace_children_from(&mut self, target: NodeId, source: &Document, source_node: NodeId) {
        self.clear_children(target);
        for &child in source.children(source_node) {
            let copy = self.import(source, child);
            self.append_child(target, copy);
        }
    }

    /// Parse `fragment` (any sequence of elements and text) and append its nodes to `parent`
    pub fn append_fragment(&mut self, parent: NodeId, fragment: &str) -> Result<(), XmlError> {
        let wrapper = Document::parse(&format!("<fragment>{}</fragment>", fragment))?;
        let root = wrapper.root_element().ok_or(XmlError::MissingRoot)?;
        for &child in wrapper.children(root) {
            let copy = self.import(&wrapper, child);
            self.append_child(parent, copy);
        }
        Ok(())
    }

    /// Select elements along a `/`-separated path of element names.
    ///
    /// A leading `/` anchors the path at the document node; otherwise it is
    /// resolved against `from`. Results are in document order.
    pub fn select(&self, from: NodeId, path: &str) -> Vec<NodeId> {
        let (mut current, rest) = match path.strip_prefix('/') {
            Some(rest) => (vec![self.document_node()], rest),
            None => (vec![from], path),
        };
        for step in rest.split('/').filter(|s| !s.is_empty()) {
            current = current
                .iter()
                .flat_map(|&node| {
                    self.child_elements(node)
                        .filter(move |&child| self.name(child) == Some(step))
                })
                .collect();
            if current.is_empty() {
                break;
            }
        }
        current
    }

    pub fn select_first(&self, from: NodeId, path: &str) -> Option<NodeId> {
        self.select(from, path).into_iter().next()
    }

    /// Serialized content of `id` without the node's own tags
    pub fn inner_xml(&self, id: NodeId) -> String {
        crate::write::write_children(self, id)
    }

    /// Serialize the whole document with an XML declaration and indentation
    pub fn to_xml_string(&self) -> Result<String, XmlError> {
        crate::write::write_document(self)
    }

    /// Serialize to `path`, replacing any existing file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), XmlError> {
        let xml = self.to_xml_string()?;
        std::fs::write(path, xml)?;
        Ok(())
    }
}
