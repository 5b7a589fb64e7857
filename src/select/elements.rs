use crate::dom::{encode_entities, parse_fragment, Document, ElementData, Fragment, NodeData, NodeId, Tree};
use crate::error::{Error, Result};
use crate::output::{render_nodes, WriterOptions};
use crate::query::Selector;
use crate::select::matcher::{deduplicate, node_matches, select_from};
use crate::select::OneOrMany;
use paste::paste;
use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};

/// What [`Elements::append`] adds.
#[derive(Copy, Clone, Debug)]
pub enum Content<'a> {
    /// Deep copies of these nodes. They may come from any document, including this one.
    Elements(&'a Elements),
    /// A text node, or (with [`AppendOptions::as_markup`]) whatever nodes the text parses into.
    Text(&'a str),
}

impl<'a> From<&'a Elements> for Content<'a> {
    fn from(value: &'a Elements) -> Self {
        Self::Elements(value)
    }
}

impl<'a> From<&'a str> for Content<'a> {
    fn from(value: &'a str) -> Self {
        Self::Text(value)
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct AppendOptions {
    /// Parse [`Content::Text`] as HTML instead of inserting it as literal text.
    pub as_markup: bool,
}

impl AppendOptions {
    pub fn markup() -> Self {
        Self { as_markup: true }
    }
}

/// An ordered collection of nodes from one [`Document`]: the handle for reading and changing that document.
///
/// The collection is a snapshot of node ids, taken when it was created. Reads and writes go through to the live tree,
/// so a change made through one collection is visible through every other; but membership doesn't change. A member
/// that gets deleted (through this collection or any other) stays in the collection, and any later access to it fails
/// with [`Error::DetachedNodeAccess`]. [`Elements::deduplicate`] drops such members.
///
/// Getters return a [`OneOrMany`], with one value per member. Setters apply the same value to every member, and return
/// `self` so calls can be chained. A setter first checks every member, so that it either fails without changing
/// anything or applies to all of them.
#[derive(Clone)]
pub struct Elements {
    doc: Document,
    nodes: Vec<NodeId>,
}

/// Getter/setter pairs for attributes that have their own accessors. A missing attribute reads as the empty string.
macro_rules! attribute_accessors {
    ($($name:ident => $attr:literal),+ $(,)?) => {
        paste! {
            $(
            #[doc = concat!("Each member's `", $attr, "` attribute.")]
            pub fn $name(&self) -> Result<OneOrMany<String>> {
                self.map_nodes(|_, _, data| {
                    Ok(data.as_element().and_then(|e| e.attribute($attr)).unwrap_or_default().to_string())
                })
            }

            #[doc = concat!("Sets the `", $attr, "` attribute on every member.")]
            pub fn [<set_ $name>](&self, value: &str) -> Result<&Self> {
                self.set_attribute($attr, value)
            }
            )+
        }
    };
}

impl Elements {
    /// Builds a collection from node ids.
    ///
    /// Fails with [`Error::InvalidInput`] if an id doesn't belong to `doc`, or [`Error::DetachedNodeAccess`] if it was
    /// deleted.
    pub fn new<I>(doc: &Document, nodes: I) -> Result<Self>
    where
        I: IntoIterator<Item = NodeId>,
    {
        let nodes: Vec<NodeId> = nodes.into_iter().collect();
        {
            let tree = doc.tree();
            for &id in &nodes {
                tree.node(id)?;
            }
        }
        Ok(Self::from_live(doc.clone(), nodes))
    }

    pub fn empty(doc: &Document) -> Self {
        Self::from_live(doc.clone(), Vec::new())
    }

    pub(crate) fn from_live(doc: Document, nodes: Vec<NodeId>) -> Self {
        Self { doc, nodes }
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn ids(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Each member, as its own single-member collection.
    pub fn iter(&self) -> impl Iterator<Item = Elements> + '_ {
        self.nodes
            .iter()
            .map(|&id| Self::from_live(self.doc.clone(), vec![id]))
    }

    pub fn get(&self, index: usize) -> Result<Elements> {
        match self.nodes.get(index) {
            Some(&id) => Ok(Self::from_live(self.doc.clone(), vec![id])),
            None => Err(Error::OutOfRange {
                index,
                len: self.nodes.len(),
            }),
        }
    }

    pub fn first(&self) -> Option<Elements> {
        self.get(0).ok()
    }

    /// Replacing a member by position isn't supported. This fails with [`Error::OutOfRange`] if there's no such member,
    /// or [`Error::NotSupported`] if there is.
    pub fn replace_at<'a>(&self, index: usize, _content: impl Into<Content<'a>>) -> Result<()> {
        if index >= self.nodes.len() {
            Err(Error::OutOfRange {
                index,
                len: self.nodes.len(),
            })
        } else {
            Err(Error::NotSupported("replacing a collection member by position"))
        }
    }

    /// Finds the elements below any member that match the selector.
    ///
    /// The result has no duplicates. A selector that matches nothing gives an empty collection, not an error.
    pub fn select(&self, selector: &str) -> Result<Elements> {
        self.select_parsed(&Selector::parse(selector))
    }

    /// Like [`Elements::select`], but fails with [`Error::NotSupported`] if the selector uses an attribute modifier
    /// (`[lang|=en]`, `[class~=x]`) instead of matching it literally.
    pub fn select_strict(&self, selector: &str) -> Result<Elements> {
        let selector = Selector::parse(selector);
        selector.ensure_supported()?;
        self.select_parsed(&selector)
    }

    pub fn select_parsed(&self, selector: &Selector) -> Result<Elements> {
        let found = {
            let tree = self.doc.tree();
            self.check_live(&tree)?;
            select_from(&tree, &self.nodes, selector)
        };
        Ok(Self::from_live(self.doc.clone(), found))
    }

    /// Keeps the members that match the selector's first component. Text members never match.
    pub fn filter(&self, selector: &str) -> Result<Elements> {
        let selector = Selector::parse(selector);
        let Some(component) = selector.components().first() else {
            return Ok(self.clone());
        };
        let mut kept = Vec::with_capacity(self.nodes.len());
        {
            let tree = self.doc.tree();
            self.check_live(&tree)?;
            kept.extend(self.nodes.iter().copied().filter(|&id| node_matches(&tree, id, component)));
        }
        Ok(Self::from_live(self.doc.clone(), kept))
    }

    /// The direct children of every member, in order. Text children are included only if `include_text` is set.
    pub fn children(&self, include_text: bool) -> Result<Elements> {
        let mut found = Vec::new();
        {
            let tree = self.doc.tree();
            for &id in &self.nodes {
                for &child in tree.children(id)? {
                    if include_text || matches!(tree.data(child)?, NodeData::Element(_)) {
                        found.push(child);
                    }
                }
            }
        }
        Ok(Self::from_live(self.doc.clone(), found))
    }

    /// The nearest element ancestor of every member, without duplicates.
    pub fn parent(&self) -> Result<Elements> {
        let mut found = Vec::with_capacity(self.nodes.len());
        {
            let tree = self.doc.tree();
            for &id in &self.nodes {
                let mut current = tree.parent(id)?;
                while let Some(ancestor) = current {
                    if matches!(tree.data(ancestor)?, NodeData::Element(_)) {
                        found.push(ancestor);
                        break;
                    }
                    current = tree.parent(ancestor)?;
                }
            }
        }
        deduplicate(&mut found);
        Ok(Self::from_live(self.doc.clone(), found))
    }

    /// The same members, minus repeats (the first occurrence stays) and minus any that have been deleted.
    pub fn deduplicate(&self) -> Elements {
        let mut nodes = Vec::with_capacity(self.nodes.len());
        {
            let tree = self.doc.tree();
            nodes.extend(self.nodes.iter().copied().filter(|&id| tree.is_live(id)));
        }
        deduplicate(&mut nodes);
        Self::from_live(self.doc.clone(), nodes)
    }

    /// Appends a copy of `content` as the last child of every member.
    pub fn append<'a>(&self, content: impl Into<Content<'a>>, options: AppendOptions) -> Result<&Self> {
        let fragments = match content.into() {
            Content::Elements(source) => {
                let tree = source.doc.tree();
                let copies = source.nodes.iter().map(|&id| tree.to_fragment(id)).collect::<Result<Vec<_>>>();
                copies?
            }
            Content::Text("") => Vec::new(),
            Content::Text(markup) if options.as_markup && markup.contains(['<', '&']) => return self.append_markup(markup),
            Content::Text(text) => vec![Fragment {
                data: NodeData::Text(text.to_string()),
                children: Vec::new(),
            }],
        };
        let mut tree = self.doc.tree_mut();
        self.check_elements(&tree)?;
        for &id in &self.nodes {
            for fragment in &fragments {
                tree.insert_fragment(id, fragment)?;
            }
        }
        Ok(self)
    }

    /// Markup is parsed once per distinct member tag, since what it parses into depends on where it goes.
    fn append_markup(&self, markup: &str) -> Result<&Self> {
        let contexts = {
            let tree = self.doc.tree();
            self.nodes
                .iter()
                .map(|&id| match tree.data(id)? {
                    NodeData::Element(elem) => Ok(elem.tag_lowercase()),
                    NodeData::Text(_) => Err(Error::InvalidInput(format!("node {id} is text, not an element"))),
                })
                .collect::<Result<Vec<_>>>()?
        };
        let mut parsed: BTreeMap<&str, Vec<Fragment>> = BTreeMap::new();
        for tag in &contexts {
            if !parsed.contains_key(tag.as_str()) {
                parsed.insert(tag, parse_fragment(markup, tag)?);
            }
        }
        tracing::trace!("parsed markup for {} context tag(s)", parsed.len());

        let mut tree = self.doc.tree_mut();
        for (&id, tag) in self.nodes.iter().zip(&contexts) {
            for fragment in &parsed[tag.as_str()] {
                tree.insert_fragment(id, fragment)?;
            }
        }
        Ok(self)
    }

    /// Creates an empty `<tag>` as the last child of every member, and returns the new elements.
    pub fn append_new(&self, tag: &str) -> Result<Elements> {
        let mut created = Vec::with_capacity(self.nodes.len());
        {
            let mut tree = self.doc.tree_mut();
            self.check_elements(&tree)?;
            for &parent in &self.nodes {
                let id = tree.create(NodeData::Element(ElementData::new(tag)));
                tree.append_child(parent, id)?;
                created.push(id);
            }
        }
        Ok(Self::from_live(self.doc.clone(), created))
    }

    /// Removes every member (and everything below it) from the document, and empties this collection.
    ///
    /// Other collections holding these nodes keep them, but can no longer read or write them. The document root can't be
    /// deleted.
    pub fn delete(&mut self) -> Result<()> {
        {
            let mut tree = self.doc.tree_mut();
            self.check_live(&tree)?;
            if self.nodes.contains(&tree.root()) {
                return Err(Error::InvalidInput("can't delete the document root".to_string()));
            }
            for &id in &self.nodes {
                // an earlier member may have been this one's ancestor
                if tree.is_live(id) {
                    tree.detach(id)?;
                }
            }
        }
        self.nodes.clear();
        Ok(())
    }

    pub fn tag(&self) -> Result<OneOrMany<String>> {
        self.map_nodes(|_, _, data| {
            Ok(match data {
                NodeData::Element(elem) => elem.tag().to_string(),
                NodeData::Text(_) => "#text".to_string(),
            })
        })
    }

    /// All the text at or below each member, concatenated in document order.
    pub fn text(&self) -> Result<OneOrMany<String>> {
        self.map_nodes(|tree, id, _| tree.text_content(id))
    }

    /// Replaces each member's children with a single text node (or sets a text member's text).
    pub fn set_text(&self, text: &str) -> Result<&Self> {
        let mut tree = self.doc.tree_mut();
        self.check_live(&tree)?;
        for &id in &self.nodes {
            if !tree.is_live(id) {
                continue;
            }
            match tree.data_mut(id)? {
                NodeData::Text(existing) => *existing = text.to_string(),
                NodeData::Element(_) => {
                    tree.clear_children(id)?;
                    if !text.is_empty() {
                        let child = tree.create(NodeData::Text(text.to_string()));
                        tree.append_child(id, child)?;
                    }
                }
            }
        }
        Ok(self)
    }

    /// Like [`Elements::text`], but entity-encoded.
    pub fn content(&self) -> Result<OneOrMany<String>> {
        self.map_nodes(|tree, id, _| Ok(encode_entities(&tree.text_content(id)?).into_owned()))
    }

    /// Like [`Elements::set_text`], but entity-encodes the text first.
    ///
    /// This doesn't undo [`Elements::content`]: setting what `content()` returned encodes it a second time.
    pub fn set_content(&self, content: &str) -> Result<&Self> {
        self.set_text(&encode_entities(content))
    }

    attribute_accessors! {
        id => "id",
        value => "value",
        classname => "class",
    }

    /// Each member's class tokens.
    pub fn classnames(&self) -> Result<OneOrMany<Vec<String>>> {
        self.map_nodes(|_, _, data| {
            Ok(data
                .as_element()
                .map(|e| e.class_tokens().map(str::to_string).collect())
                .unwrap_or_default())
        })
    }

    pub fn set_classnames<S: AsRef<str>>(&self, names: &[S]) -> Result<&Self> {
        let joined = names.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(" ");
        self.set_attribute("class", &joined)
    }

    /// Adds whitespace-separated class names to every member, skipping those it already has.
    pub fn add_class(&self, names: &str) -> Result<&Self> {
        self.update_elements(|elem| {
            let mut tokens: Vec<String> = elem.class_tokens().map(str::to_string).collect();
            let before = tokens.len();
            for name in names.split_whitespace() {
                if !tokens.iter().any(|t| t == name) {
                    tokens.push(name.to_string());
                }
            }
            if tokens.len() != before {
                elem.set_attribute("class", tokens.join(" "));
            }
        })
    }

    /// Removes whitespace-separated class names from every member, dropping the `class` attribute if none are left.
    pub fn remove_class(&self, names: &str) -> Result<&Self> {
        let remove: Vec<&str> = names.split_whitespace().collect();
        self.update_elements(|elem| {
            if elem.attribute("class").is_none() {
                return;
            }
            let kept: Vec<&str> = elem.class_tokens().filter(|t| !remove.contains(t)).collect();
            let kept = kept.join(" ");
            if kept.is_empty() {
                elem.remove_attribute("class");
            } else {
                elem.set_attribute("class", kept);
            }
        })
    }

    /// Whether any member has the class.
    pub fn has_class(&self, name: &str) -> Result<bool> {
        let found = self.map_nodes(|_, _, data| {
            Ok(data.as_element().is_some_and(|e| e.class_tokens().any(|t| t == name)))
        })?;
        Ok(found.into_iter().any(|has| has))
    }

    /// Each member's value for the attribute, or `None` where it's missing. Text members have no attributes.
    pub fn get_attribute(&self, name: &str) -> Result<OneOrMany<Option<String>>> {
        self.map_nodes(|_, _, data| Ok(data.as_element().and_then(|e| e.attribute(name)).map(str::to_string)))
    }

    pub fn set_attribute(&self, name: &str, value: &str) -> Result<&Self> {
        self.update_elements(|elem| elem.set_attribute(name, value))
    }

    pub fn delete_attribute(&self, name: &str) -> Result<&Self> {
        self.update_elements(|elem| {
            elem.remove_attribute(name);
        })
    }

    /// Renders the members one after another, each including its own tag.
    pub fn render(&self, options: &WriterOptions) -> Result<String> {
        let tree = self.doc.tree();
        self.check_live(&tree)?;
        render_nodes(&tree, &self.nodes, options)
    }

    fn check_live(&self, tree: &Tree) -> Result<()> {
        for &id in &self.nodes {
            tree.node(id)?;
        }
        Ok(())
    }

    fn check_elements(&self, tree: &Tree) -> Result<()> {
        for &id in &self.nodes {
            if let NodeData::Text(_) = tree.data(id)? {
                return Err(Error::InvalidInput(format!("node {id} is text, not an element")));
            }
        }
        Ok(())
    }

    fn map_nodes<T, F>(&self, mut f: F) -> Result<OneOrMany<T>>
    where
        F: FnMut(&Tree, NodeId, &NodeData) -> Result<T>,
    {
        let tree = self.doc.tree();
        let values = self
            .nodes
            .iter()
            .map(|&id| f(&tree, id, tree.data(id)?))
            .collect::<Result<Vec<_>>>()?;
        Ok(OneOrMany::from_vec(values))
    }

    fn update_elements<F>(&self, mut f: F) -> Result<&Self>
    where
        F: FnMut(&mut ElementData),
    {
        let mut tree = self.doc.tree_mut();
        self.check_elements(&tree)?;
        for &id in &self.nodes {
            if let Some(elem) = tree.data_mut(id)?.as_element_mut() {
                f(elem);
            }
        }
        Ok(self)
    }
}

impl PartialEq for Elements {
    fn eq(&self, other: &Self) -> bool {
        self.doc.same_document(&other.doc) && self.nodes == other.nodes
    }
}

impl Eq for Elements {}

impl Debug for Elements {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Elements").field("nodes", &self.nodes).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::ParseOptions;
    use crate::util::utils_for_test::*;
    use indoc::indoc;

    const LIST_PAGE: &str = indoc! {r#"
        <div id="main" class="content wide">
          <ul>
            <li class="item">one</li>
            <li class="item done">two <b>bold</b></li>
          </ul>
          <p>para</p>
          <input name="q" value="hello">
        </div>"#};

    fn doc(html: &str) -> Document {
        Document::parse_html(html, &ParseOptions::default()).unwrap()
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn new_rejects_foreign_ids() {
        let d = doc(LIST_PAGE);
        let bogus = NodeId(d.node_count() + 10);
        unwrap!(Elements::new(&d, [bogus]), Err(Error::InvalidInput(_)));
        let ok = Elements::new(&d, [d.body().ids()[0]]).unwrap();
        assert_eq!(ok, d.body());
    }

    #[test]
    fn selected_tags_match_selector() {
        let d = doc(LIST_PAGE);
        for tag in ["li", "LI", "ul", "p", "input", "div"] {
            let found = d.select(tag);
            assert!(!found.is_empty());
            for t in found.tag().unwrap() {
                assert!(t.eq_ignore_ascii_case(tag), "{t} vs {tag}");
            }
        }
    }

    #[test]
    fn select_from_collection() {
        let d = doc(LIST_PAGE);
        let items = d.select("ul").select("li").unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items.text().unwrap().into_vec(), strings(&["one", "two bold"]));
        let done = d.body().select("li.done").unwrap();
        assert_eq!(done.text().unwrap().one(), Some("two bold".to_string()));
    }

    #[test]
    fn select_strict_rejects_modifiers() {
        let d = doc(LIST_PAGE);
        assert_eq!(
            d.root().select_strict("[class~=item]"),
            Err(Error::NotSupported("the ~ and | attribute modifiers"))
        );
        assert_eq!(d.root().select_strict("[class=item]").unwrap().len(), 1);
    }

    #[test]
    fn filter_uses_members() {
        let d = doc(LIST_PAGE);
        let all = d.select("");
        let items = all.filter("li.item").unwrap();
        assert_eq!(items, d.select("li"));
        assert_eq!(all.filter("#main").unwrap().tag().unwrap().one(), Some("div".to_string()));
    }

    #[test]
    fn children_with_and_without_text() {
        let d = doc(LIST_PAGE);
        let second = d.select("li.done");
        assert_eq!(second.children(false).unwrap().tag().unwrap().one(), Some("b".to_string()));
        assert_eq!(
            second.children(true).unwrap().tag().unwrap().into_vec(),
            strings(&["#text", "b"])
        );
    }

    #[test]
    fn parent_is_deduplicated() {
        let d = doc(LIST_PAGE);
        let parents = d.select("li").parent().unwrap();
        assert_eq!(parents.tag().unwrap().one(), Some("ul".to_string()));
        assert!(d.root().parent().unwrap().is_empty());
    }

    #[test]
    fn text_members_have_element_parents() {
        let d = doc(LIST_PAGE);
        let texts = d.select("li.done").children(true).unwrap().filter("").unwrap();
        assert_eq!(texts.len(), 1); // just the <b>
        let text_node = d.select("li.done").children(true).unwrap().get(0).unwrap();
        assert_eq!(text_node.parent().unwrap(), d.select("li.done"));
    }

    #[test]
    fn getters_follow_membership() {
        let d = doc(LIST_PAGE);
        assert_eq!(Elements::empty(&d).text().unwrap(), OneOrMany::Empty);
        assert_eq!(d.select("p").text().unwrap(), OneOrMany::One("para".to_string()));
        assert_eq!(
            d.select("li").classname().unwrap(),
            OneOrMany::Many(strings(&["item", "item done"]))
        );
    }

    #[test]
    fn value_and_id() {
        let d = doc(LIST_PAGE);
        let input = d.select("input");
        assert_eq!(input.value().unwrap().one(), Some("hello".to_string()));
        input.set_value("bye").unwrap().set_id("search").unwrap();
        assert_eq!(d.select("#search").value().unwrap().one(), Some("bye".to_string()));
        assert_eq!(d.select("p").id().unwrap().one(), Some(String::new()));
    }

    #[test]
    fn set_text_replaces_children() {
        let d = doc(LIST_PAGE);
        let li = d.select("li.done");
        let bold = d.select("b");
        li.set_text("plain").unwrap();
        assert_eq!(li.text().unwrap().one(), Some("plain".to_string()));
        unwrap!(bold.text(), Err(Error::DetachedNodeAccess(_)));
    }

    #[test]
    fn content_escapes_both_ways() {
        let d = doc("<p>a &lt; b</p>");
        let p = d.select("p");
        assert_eq!(p.text().unwrap().one(), Some("a < b".to_string()));
        assert_eq!(p.content().unwrap().one(), Some("a &lt; b".to_string()));
        p.set_content("x & y").unwrap();
        assert_eq!(p.text().unwrap().one(), Some("x &amp; y".to_string()));
        assert_eq!(p.content().unwrap().one(), Some("x &amp;amp; y".to_string()));
    }

    #[test]
    fn classes() {
        let d = doc(LIST_PAGE);
        let items = d.select("li");
        items.add_class("item new").unwrap();
        assert_eq!(
            items.classnames().unwrap().into_vec(),
            vec![strings(&["item", "new"]), strings(&["item", "done", "new"])]
        );
        assert!(items.has_class("done").unwrap());
        items.remove_class("item new done").unwrap();
        assert_eq!(items.get_attribute("class").unwrap(), OneOrMany::Many(vec![None, None]));
        assert!(!items.has_class("done").unwrap());
    }

    #[test]
    fn classnames_round_trip() {
        let d = doc(LIST_PAGE);
        let div = d.select("#main");
        let names = div.classnames().unwrap().one().unwrap();
        div.set_classnames(&names).unwrap();
        assert_eq!(div.classnames().unwrap().one(), Some(names));
        assert_eq!(div.classname().unwrap().one(), Some("content wide".to_string()));
    }

    #[test]
    fn attributes() {
        let d = doc(LIST_PAGE);
        let p = d.select("p");
        assert_eq!(p.get_attribute("title").unwrap().one(), Some(None));
        p.set_attribute("title", "hi").unwrap();
        assert_eq!(p.get_attribute("TITLE").unwrap().one(), Some(Some("hi".to_string())));
        p.delete_attribute("title").unwrap();
        assert_eq!(p.get_attribute("title").unwrap().one(), Some(None));
    }

    #[test]
    fn attribute_setters_reject_text_members() {
        let d = doc(LIST_PAGE);
        let mixed = d.select("li.done").children(true).unwrap();
        unwrap!(mixed.set_attribute("x", "y"), Err(Error::InvalidInput(_)));
        // nothing changed, not even on the <b>
        assert_eq!(d.select("b").get_attribute("x").unwrap().one(), Some(None));
    }

    #[test]
    fn delete_then_reselect() {
        let d = doc(LIST_PAGE);
        let mut items = d.select("li");
        let stale = items.clone();
        items.delete().unwrap();
        assert!(items.is_empty());
        assert!(d.select("li").is_empty());
        assert_eq!(stale.len(), 2);
        unwrap!(stale.tag(), Err(Error::DetachedNodeAccess(_)));
        assert!(stale.deduplicate().is_empty());
    }

    #[test]
    fn delete_nested_members() {
        let d = doc(LIST_PAGE);
        let mut both = d.select("ul");
        let li = d.select("li");
        both = Elements::new(&d, both.ids().iter().chain(li.ids()).copied()).unwrap();
        both.delete().unwrap();
        assert!(d.select("ul").is_empty());
        assert!(d.select("li").is_empty());
    }

    #[test]
    fn root_cannot_be_deleted() {
        let d = doc(LIST_PAGE);
        let mut root = d.root();
        unwrap!(root.delete(), Err(Error::InvalidInput(_)));
        assert_eq!(root.len(), 1);
    }

    #[test]
    fn deduplicate_is_idempotent() {
        let d = doc(LIST_PAGE);
        let li = d.select("li");
        let doubled = Elements::new(&d, li.ids().iter().chain(li.ids()).copied()).unwrap();
        assert_eq!(doubled.len(), 4);
        let once = doubled.deduplicate();
        assert_eq!(once, li);
        assert_eq!(once.deduplicate(), once);
    }

    #[test]
    fn append_text_and_markup() {
        let d = doc(LIST_PAGE);
        let p = d.select("p");
        p.append(" & more", AppendOptions::default()).unwrap();
        assert_eq!(p.text().unwrap().one(), Some("para & more".to_string()));
        p.append("<i>it</i> &amp; x", AppendOptions::markup()).unwrap();
        assert_eq!(p.text().unwrap().one(), Some("para & moreit & x".to_string()));
        assert_eq!(p.select("i").unwrap().len(), 1);
    }

    #[test]
    fn append_markup_keeps_leading_whitespace() {
        let d = doc("<p>a</p>");
        let p = d.select("p");
        p.append("  <b>x</b>", AppendOptions::markup()).unwrap();
        assert_eq!(p.text().unwrap().one(), Some("a  x".to_string()));
    }

    #[test]
    fn append_markup_in_table_row() {
        let d = doc("<table><tr><td>a</td></tr></table>");
        d.select("tr").append("<td>b</td>", AppendOptions::markup()).unwrap();
        let cells = d.select("td");
        assert_eq!(cells.len(), 2);
        assert_eq!(cells.text().unwrap().into_vec(), strings(&["a", "b"]));
    }

    #[test]
    fn append_markup_per_target_tag() {
        let d = doc("<table><tr><td>a</td></tr></table><div>d</div>");
        let targets = Elements::new(&d, d.select("tr").ids().iter().chain(d.select("div").ids()).copied()).unwrap();
        targets.append("<td>b</td>", AppendOptions::markup()).unwrap();
        assert_eq!(d.select("tr td").len(), 2);
        // outside a table row, a stray cell tag is dropped and only its text remains
        assert_eq!(d.select("div td").len(), 0);
        assert_eq!(d.select("div").text().unwrap().one(), Some("db".to_string()));
    }

    #[test]
    fn append_copies_elements() {
        let d = doc(LIST_PAGE);
        let ul = d.select("ul");
        let first = d.select("li").get(0).unwrap();
        ul.append(&first, AppendOptions::default()).unwrap();
        let items = d.select("li");
        assert_eq!(items.len(), 3);
        assert_eq!(items.text().unwrap().into_vec(), strings(&["one", "two bold", "one"]));
        // a copy, not a move
        assert_ne!(items.ids()[0], items.ids()[2]);
    }

    #[test]
    fn append_across_documents() {
        let source = doc("<span class='x'>hi</span>");
        let target = Document::new();
        target.body().append(&source.select("span"), AppendOptions::default()).unwrap();
        let span = target.select("span.x");
        assert_eq!(span.text().unwrap().one(), Some("hi".to_string()));
        assert_eq!(source.select("span").len(), 1);
    }

    #[test]
    fn append_to_every_member() {
        let d = doc(LIST_PAGE);
        let created = d.select("li").append_new("em").unwrap();
        assert_eq!(created.len(), 2);
        assert_eq!(created.parent().unwrap(), d.select("li"));
    }

    #[test]
    fn append_to_text_fails() {
        let d = doc(LIST_PAGE);
        let text = d.select("p").children(true).unwrap();
        unwrap!(text.append_new("b"), Err(Error::InvalidInput(_)));
    }

    #[test]
    fn get_and_replace_at() {
        let d = doc(LIST_PAGE);
        let items = d.select("li");
        assert_eq!(items.get(5), Err(Error::OutOfRange { index: 5, len: 2 }));
        assert_eq!(items.replace_at(5, "x"), Err(Error::OutOfRange { index: 5, len: 2 }));
        unwrap!(items.replace_at(0, "x"), Err(Error::NotSupported(_)));
        assert_eq!(get_only(items.first().unwrap().text().unwrap()), "one");
    }

    #[test]
    fn iter_gives_singletons() {
        let d = doc(LIST_PAGE);
        let each: Vec<_> = d.select("li").iter().collect();
        assert_eq!(each.len(), 2);
        assert!(each.iter().all(|e| e.len() == 1));
        assert_eq!(each[1].classname().unwrap().one(), Some("item done".to_string()));
    }
}
