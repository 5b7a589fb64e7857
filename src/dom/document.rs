use crate::dom::html_parse::{parse_to_tree, ParseOptions};
use crate::dom::tree::{ElementData, NodeData, NodeId, Tree};
use crate::error::Result;
use crate::output::WriterOptions;
use crate::query::Selector;
use crate::select::{select_from, Elements};
use std::cell::{Ref, RefCell, RefMut};
use std::fmt::{Debug, Formatter};
use std::rc::Rc;

/// A tree of elements and text, with exactly one root element.
///
/// `Document` is a cheap handle: cloning it gives another handle to the same tree, not a copy. All reads and writes go
/// through [`Elements`], which you get from [`Document::root`], [`Document::select`] and friends.
///
/// A document is meant to be used from one thread at a time; it's neither `Send` nor `Sync`.
///
/// ```
/// use markq::dom::Document;
/// use markq::output::WriterOptions;
///
/// # fn main() -> Result<(), markq::Error> {
/// let doc = Document::new();
/// doc.body().append_new("p")?.set_text("hello")?;
/// let rendered = doc.body().render(&WriterOptions::default())?;
/// assert_eq!(rendered, "<body>\n  <p>hello</p>\n</body>\n");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Document {
    tree: Rc<RefCell<Tree>>,
}

impl Document {
    /// An empty `<html><head></head><body></body></html>` skeleton.
    pub fn new() -> Self {
        Self::from_tree(Tree::with_root_and_children(
            ElementData::new("html"),
            [ElementData::new("head"), ElementData::new("body")],
        ))
    }

    /// A document whose root is a single, empty element.
    pub fn with_root(tag: &str) -> Self {
        Self::from_tree(Tree::with_root(ElementData::new(tag)))
    }

    /// Parses HTML text into a document.
    ///
    /// The parsing itself is html5ever's; missing `<html>`, `<head>` and `<body>` elements get created the way a
    /// browser would create them.
    pub fn parse_html(html: &str, options: &ParseOptions) -> Result<Self> {
        Ok(Self::from_tree(parse_to_tree(html, options)?))
    }

    pub(crate) fn from_tree(tree: Tree) -> Self {
        Self {
            tree: Rc::new(RefCell::new(tree)),
        }
    }

    pub fn root(&self) -> Elements {
        let root = self.tree().root();
        Elements::from_live(self.clone(), vec![root])
    }

    /// The root's first `<head>` child, or an empty collection.
    pub fn head(&self) -> Elements {
        self.root_child("head")
    }

    /// The root's first `<body>` child, or an empty collection.
    pub fn body(&self) -> Elements {
        self.root_child("body")
    }

    fn root_child(&self, tag: &str) -> Elements {
        let found = {
            let tree = self.tree();
            let root = tree.root();
            tree.children(root).ok().and_then(|children| {
                children.iter().copied().find(|&child| {
                    tree.data(child)
                        .ok()
                        .and_then(NodeData::as_element)
                        .is_some_and(|e| e.has_tag(tag))
                })
            })
        };
        Elements::from_live(self.clone(), found.into_iter().collect())
    }

    /// Selects from everything below the root element.
    pub fn select(&self, selector: &str) -> Elements {
        let selector = Selector::parse(selector);
        let found = {
            let tree = self.tree();
            select_from(&tree, &[tree.root()], &selector)
        };
        Elements::from_live(self.clone(), found)
    }

    /// Renders the whole document, root element included.
    pub fn render(&self, options: &WriterOptions) -> Result<String> {
        self.root().render(options)
    }

    /// How many nodes the document has ever held, including ones that have since been deleted.
    pub fn node_count(&self) -> usize {
        self.tree().len()
    }

    /// Whether `id` belongs to this document and hasn't been deleted.
    pub fn is_live(&self, id: NodeId) -> bool {
        self.tree().is_live(id)
    }

    /// Whether two handles point at the same underlying document.
    pub fn same_document(&self, other: &Document) -> bool {
        Rc::ptr_eq(&self.tree, &other.tree)
    }

    pub(crate) fn tree(&self) -> Ref<'_, Tree> {
        self.tree.borrow()
    }

    pub(crate) fn tree_mut(&self) -> RefMut<'_, Tree> {
        self.tree.borrow_mut()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for Document {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document").field("nodes", &self.node_count()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skeleton() {
        let doc = Document::new();
        assert_eq!(doc.node_count(), 3);
        assert_eq!(doc.head().tag().unwrap().one(), Some("head".to_string()));
        assert_eq!(doc.body().tag().unwrap().one(), Some("body".to_string()));
    }

    #[test]
    fn with_root_has_no_body() {
        let doc = Document::with_root("article");
        assert!(doc.body().is_empty());
        assert_eq!(doc.root().tag().unwrap().one(), Some("article".to_string()));
    }

    #[test]
    fn clones_share_the_tree() {
        let doc = Document::new();
        let other = doc.clone();
        doc.body().append_new("p").unwrap();
        assert_eq!(other.node_count(), 4);
        assert!(doc.same_document(&other));
        assert!(!doc.same_document(&Document::new()));
    }

    #[test]
    fn parse_html_and_select() {
        let doc = Document::parse_html(
            "<div id=main><p class='a b'>one</p><p>two</p></div>",
            &ParseOptions::default(),
        )
        .unwrap();
        let found = doc.select("p");
        assert_eq!(found.len(), 2);
        assert_eq!(
            found.text().unwrap().into_vec(),
            vec!["one".to_string(), "two".to_string()]
        );
    }
}
