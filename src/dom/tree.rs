use crate::error::{Error, Result};
use std::fmt::{Display, Formatter};

/// A node's identity within its [`Document`](crate::dom::Document).
///
/// Ids are indexes into the document's node arena. They are never reused: a deleted node keeps its slot (marked as
/// detached), so a stale id can always be told apart from a live one.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The payload of a node: either an element or a run of text.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum NodeData {
    Element(ElementData),
    Text(String),
}

impl NodeData {
    pub fn as_element(&self) -> Option<&ElementData> {
        match self {
            NodeData::Element(elem) => Some(elem),
            NodeData::Text(_) => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match self {
            NodeData::Element(elem) => Some(elem),
            NodeData::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            NodeData::Element(_) => None,
            NodeData::Text(text) => Some(text),
        }
    }
}

/// An element's tag and attributes.
///
/// The tag is kept exactly as written, so that it round-trips; comparisons go through [`ElementData::has_tag`], which
/// ignores ASCII case. Attributes keep their insertion order, and names are unique (compared case-insensitively).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ElementData {
    tag: String,
    attributes: Vec<(String, String)>,
}

impl ElementData {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tag.eq_ignore_ascii_case(tag)
    }

    pub fn tag_lowercase(&self) -> String {
        self.tag.to_ascii_lowercase()
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Sets an attribute, replacing the value in place if it's already there.
    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(name)) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        let pos = self.attributes.iter().position(|(k, _)| k.eq_ignore_ascii_case(name))?;
        Some(self.attributes.remove(pos).1)
    }

    /// The whitespace-separated tokens of the `class` attribute.
    pub fn class_tokens(&self) -> impl Iterator<Item = &str> {
        self.attribute("class").unwrap_or("").split_whitespace()
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) data: NodeData,
    live: bool,
}

/// An owned copy of a subtree, not attached to any [`Tree`].
///
/// This is how nodes cross between trees (or get duplicated within one): copy out to a `Fragment`, then insert the
/// fragment wherever it's needed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Fragment {
    pub(crate) data: NodeData,
    pub(crate) children: Vec<Fragment>,
}

/// Arena of nodes, with a single root element.
#[derive(Clone, Debug)]
pub(crate) struct Tree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Tree {
    pub(crate) fn with_root(root: ElementData) -> Self {
        Self::with_root_and_children(root, [])
    }

    /// A root element with empty child elements under it.
    pub(crate) fn with_root_and_children(root: ElementData, children: impl IntoIterator<Item = ElementData>) -> Self {
        let mut nodes = Vec::with_capacity(32); // guess
        nodes.push(Node {
            parent: None,
            children: Vec::new(),
            data: NodeData::Element(root),
            live: true,
        });
        for child in children {
            let id = NodeId(nodes.len());
            nodes.push(Node {
                parent: Some(NodeId(0)),
                children: Vec::new(),
                data: NodeData::Element(child),
                live: true,
            });
            nodes[0].children.push(id);
        }
        Self { nodes, root: NodeId(0) }
    }

    pub(crate) fn root(&self) -> NodeId {
        self.root
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    pub(crate) fn is_live(&self, id: NodeId) -> bool {
        self.nodes.get(id.0).is_some_and(|n| n.live)
    }

    pub(crate) fn node(&self, id: NodeId) -> Result<&Node> {
        match self.nodes.get(id.0) {
            None => Err(Error::InvalidInput(format!("node {id} does not belong to this document"))),
            Some(node) if !node.live => Err(Error::DetachedNodeAccess(id)),
            Some(node) => Ok(node),
        }
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        match self.nodes.get_mut(id.0) {
            None => Err(Error::InvalidInput(format!("node {id} does not belong to this document"))),
            Some(node) if !node.live => Err(Error::DetachedNodeAccess(id)),
            Some(node) => Ok(node),
        }
    }

    pub(crate) fn data(&self, id: NodeId) -> Result<&NodeData> {
        Ok(&self.node(id)?.data)
    }

    pub(crate) fn data_mut(&mut self, id: NodeId) -> Result<&mut NodeData> {
        Ok(&mut self.node_mut(id)?.data)
    }

    pub(crate) fn children(&self, id: NodeId) -> Result<&[NodeId]> {
        Ok(&self.node(id)?.children)
    }

    pub(crate) fn parent(&self, id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.node(id)?.parent)
    }

    /// Creates a new, parentless node.
    pub(crate) fn create(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            data,
            live: true,
        });
        id
    }

    pub(crate) fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        if self.node(child)?.parent.is_some() {
            return Err(Error::InvalidInput(format!("node {child} already has a parent")));
        }
        self.node_mut(parent)?.children.push(child);
        self.node_mut(child)?.parent = Some(parent);
        Ok(())
    }

    /// Removes a node from its parent, and marks it and everything below it as detached.
    pub(crate) fn detach(&mut self, id: NodeId) -> Result<()> {
        if id == self.root {
            return Err(Error::InvalidInput("can't remove the document root".to_string()));
        }
        let parent = self.node(id)?.parent;
        if let Some(parent) = parent {
            self.node_mut(parent)?.children.retain(|c| *c != id);
        }
        self.kill_subtree(id);
        Ok(())
    }

    /// Detaches all of a node's children.
    pub(crate) fn clear_children(&mut self, id: NodeId) -> Result<()> {
        let children = std::mem::take(&mut self.node_mut(id)?.children);
        for child in children {
            self.kill_subtree(child);
        }
        Ok(())
    }

    fn kill_subtree(&mut self, id: NodeId) {
        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            let node = &mut self.nodes[next.0];
            node.live = false;
            node.parent = None;
            pending.append(&mut node.children);
        }
    }

    /// All element descendants of `id` (not including `id` itself), in document order.
    pub(crate) fn descendant_elements(&self, id: NodeId, out: &mut Vec<NodeId>) {
        let Some(node) = self.nodes.get(id.0) else {
            return;
        };
        for &child in &node.children {
            if matches!(self.nodes[child.0].data, NodeData::Element(_)) {
                out.push(child);
                self.descendant_elements(child, out);
            }
        }
    }

    /// The concatenation of all text below (or at) `id`, in document order.
    pub(crate) fn text_content(&self, id: NodeId) -> Result<String> {
        let mut text = String::new();
        self.collect_text(self.node(id)?, &mut text);
        Ok(text)
    }

    fn collect_text(&self, node: &Node, out: &mut String) {
        match &node.data {
            NodeData::Text(text) => out.push_str(text),
            NodeData::Element(_) => {
                for child in &node.children {
                    self.collect_text(&self.nodes[child.0], out);
                }
            }
        }
    }

    pub(crate) fn to_fragment(&self, id: NodeId) -> Result<Fragment> {
        let node = self.node(id)?;
        let children = node
            .children
            .iter()
            .map(|&child| self.to_fragment(child))
            .collect::<Result<Vec<_>>>()?;
        Ok(Fragment {
            data: node.data.clone(),
            children,
        })
    }

    /// Copies a fragment in as the last child of `parent`, returning the id of the copy's top node.
    pub(crate) fn insert_fragment(&mut self, parent: NodeId, fragment: &Fragment) -> Result<NodeId> {
        let id = self.create(fragment.data.clone());
        self.append_child(parent, id)?;
        for child in &fragment.children {
            self.insert_fragment(id, child)?;
        }
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_tree() -> (Tree, NodeId, NodeId, NodeId) {
        let mut tree = Tree::with_root(ElementData::new("html"));
        let div = tree.create(NodeData::Element(ElementData::new("DIV")));
        let text = tree.create(NodeData::Text("hello".to_string()));
        let span = tree.create(NodeData::Element(ElementData::new("span")));
        tree.append_child(tree.root(), div).unwrap();
        tree.append_child(div, text).unwrap();
        tree.append_child(div, span).unwrap();
        (tree, div, text, span)
    }

    #[test]
    fn tag_is_case_insensitive_but_preserved() {
        let elem = ElementData::new("DiV");
        assert!(elem.has_tag("div"));
        assert_eq!(elem.tag(), "DiV");
        assert_eq!(elem.tag_lowercase(), "div");
    }

    #[test]
    fn attributes_keep_order_and_replace_in_place() {
        let mut elem = ElementData::new("a");
        elem.set_attribute("href", "/one");
        elem.set_attribute("name", "n");
        elem.set_attribute("HREF", "/two");
        let attrs: Vec<_> = elem.attributes().collect();
        assert_eq!(attrs, vec![("href", "/two"), ("name", "n")]);
        assert_eq!(elem.remove_attribute("name"), Some("n".to_string()));
        assert_eq!(elem.attribute("name"), None);
    }

    #[test]
    fn descendants_skip_text() {
        let (tree, div, _, span) = small_tree();
        let mut out = Vec::new();
        tree.descendant_elements(tree.root(), &mut out);
        assert_eq!(out, vec![div, span]);
    }

    #[test]
    fn detach_kills_subtree() {
        let (mut tree, div, text, span) = small_tree();
        tree.detach(div).unwrap();
        assert!(!tree.is_live(div));
        assert!(!tree.is_live(text));
        assert!(!tree.is_live(span));
        assert_eq!(tree.children(tree.root()).unwrap(), &[]);
        assert_eq!(tree.data(span), Err(Error::DetachedNodeAccess(span)));
    }

    #[test]
    fn root_cannot_be_detached() {
        let (mut tree, ..) = small_tree();
        let root = tree.root();
        assert!(matches!(tree.detach(root), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn fragment_copy() {
        let (mut tree, div, ..) = small_tree();
        let fragment = tree.to_fragment(div).unwrap();
        let copy = tree.insert_fragment(tree.root(), &fragment).unwrap();
        assert_ne!(copy, div);
        assert_eq!(tree.text_content(copy).unwrap(), "hello");
        assert_eq!(tree.children(tree.root()).unwrap(), &[div, copy]);
    }

    #[test]
    fn unknown_id_is_invalid_input() {
        let (tree, ..) = small_tree();
        assert!(matches!(tree.node(NodeId(99)), Err(Error::InvalidInput(_))));
    }
}
