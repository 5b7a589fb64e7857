//! Bridge from html5ever's `RcDom` into our arena.
//!
//! We let html5ever do all of the actual HTML parsing, and then walk its tree once to copy elements and text into a
//! [`Tree`]. Comments, doctypes and processing instructions are dropped.

use crate::dom::tree::{ElementData, Fragment, NodeData, NodeId, Tree};
use crate::error::{Error, Result};
use html5ever::tendril::TendrilSink;
use html5ever::{ns, parse_document, parse_fragment as parse_html_fragment, LocalName, QualName};
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};

/// Options for turning markup text into a tree.
///
/// Build these once and reuse them; there is no global parser state to initialize.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ParseOptions {
    /// Log the parser's recoverable errors (at `warn`). html5ever always recovers, so these are informational; they're
    /// off by default.
    pub report_errors: bool,
    /// Keep text nodes that are nothing but whitespace.
    ///
    /// Whole documents usually want these dropped (they're just the source's indentation), while inline fragments
    /// need them: the space in `<b>a</b> <b>b</b>` matters.
    pub keep_whitespace_text: bool,
}

impl ParseOptions {
    pub fn fragment() -> Self {
        Self {
            report_errors: false,
            keep_whitespace_text: true,
        }
    }
}

pub(crate) fn parse_to_tree(html: &str, options: &ParseOptions) -> Result<Tree> {
    let dom = parse_document(RcDom::default(), Default::default())
        .from_utf8()
        .read_from(&mut html.as_bytes())
        .map_err(|e| Error::MalformedMarkup(e.to_string()))?;

    if options.report_errors {
        for err in dom.errors.borrow().iter() {
            tracing::warn!("markup parse error: {err}");
        }
    }

    let html_handle = dom
        .document
        .children
        .borrow()
        .iter()
        .find(|child| matches!(child.data, RcNodeData::Element { .. }))
        .cloned()
        .ok_or_else(|| Error::MalformedMarkup("no root element".to_string()))?;

    let RcNodeData::Element { name, attrs, .. } = &html_handle.data else {
        return Err(Error::MalformedMarkup("no root element".to_string()));
    };
    let mut root = ElementData::new(&*name.local);
    for attr in attrs.borrow().iter() {
        root.set_attribute(&attr.name.local, attr.value.to_string());
    }
    let mut tree = Tree::with_root(root);
    let root_id = tree.root();
    for child in html_handle.children.borrow().iter() {
        convert_node(child, &mut tree, root_id, options)?;
    }

    tracing::debug!("parsed markup into {} nodes", tree.len());
    Ok(tree)
}

/// Parses markup meant to be inserted into a `<context_tag>` element, returning the top-level nodes it produced.
///
/// This is html5ever's fragment mode, so leading whitespace survives and context-bound content (a `<td>` going into a
/// `<tr>`, say) is kept rather than dropped.
pub(crate) fn parse_fragment(markup: &str, context_tag: &str) -> Result<Vec<Fragment>> {
    let context = QualName::new(None, ns!(html), LocalName::from(context_tag.to_ascii_lowercase()));
    let dom = parse_html_fragment(RcDom::default(), Default::default(), context, Vec::new(), false).one(markup);

    // fragment mode always hangs the parsed nodes off a synthetic <html> element
    let holder = dom
        .document
        .children
        .borrow()
        .first()
        .cloned()
        .ok_or_else(|| Error::MalformedMarkup("fragment parse produced no nodes".to_string()))?;

    let mut tree = Tree::with_root(ElementData::new("html"));
    let root_id = tree.root();
    let options = ParseOptions::fragment();
    for child in holder.children.borrow().iter() {
        convert_node(child, &mut tree, root_id, &options)?;
    }
    tree.children(root_id)?.iter().map(|&child| tree.to_fragment(child)).collect()
}

fn convert_node(handle: &Handle, tree: &mut Tree, parent: NodeId, options: &ParseOptions) -> Result<()> {
    match &handle.data {
        RcNodeData::Element { name, attrs, .. } => {
            let mut elem = ElementData::new(&*name.local);
            for attr in attrs.borrow().iter() {
                elem.set_attribute(&attr.name.local, attr.value.to_string());
            }
            let id = tree.create(NodeData::Element(elem));
            tree.append_child(parent, id)?;
            for child in handle.children.borrow().iter() {
                convert_node(child, tree, id, options)?;
            }
        }
        RcNodeData::Text { contents } => {
            let text = contents.borrow().to_string();
            if options.keep_whitespace_text || !text.trim().is_empty() {
                let id = tree.create(NodeData::Text(text));
                tree.append_child(parent, id)?;
            }
        }
        RcNodeData::Document
        | RcNodeData::Doctype { .. }
        | RcNodeData::Comment { .. }
        | RcNodeData::ProcessingInstruction { .. } => {}
    }
    Ok(())
}
