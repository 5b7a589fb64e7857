use crate::dom::{ElementData, NodeData, NodeId, Tree};
use crate::query::{AttributeConstraint, Selector, SelectorComponent};
use std::collections::HashSet;

/// Runs a selector against the descendants of `start`.
///
/// Each component narrows the candidates to the matching descendants of the previous candidates. Duplicates can pile
/// up along the way (two matched ancestors share their descendants); they're removed once, at the end.
pub(crate) fn select_from(tree: &Tree, start: &[NodeId], selector: &Selector) -> Vec<NodeId> {
    let mut candidates = start.to_vec();
    let mut scratch = Vec::new();
    for component in selector.components() {
        let mut next = Vec::with_capacity(candidates.len());
        for &candidate in &candidates {
            scratch.clear();
            tree.descendant_elements(candidate, &mut scratch);
            next.extend(scratch.iter().copied().filter(|&id| node_matches(tree, id, component)));
        }
        tracing::trace!("{component:?} matched {} node(s)", next.len());
        candidates = next;
        if candidates.is_empty() {
            break;
        }
    }
    deduplicate(&mut candidates);
    candidates
}

pub(crate) fn node_matches(tree: &Tree, id: NodeId, component: &SelectorComponent) -> bool {
    match tree.data(id) {
        Ok(NodeData::Element(elem)) => element_matches(elem, component),
        _ => false,
    }
}

pub(crate) fn element_matches(elem: &ElementData, component: &SelectorComponent) -> bool {
    if !component.is_wildcard_tag() && !elem.has_tag(&component.tag) {
        return false;
    }
    if !component.id.is_empty() && elem.attribute("id") != Some(component.id.as_str()) {
        return false;
    }
    if !component.class.is_empty() {
        let has: HashSet<&str> = elem.class_tokens().collect();
        if !component.class_tokens().all(|token| has.contains(token)) {
            return false;
        }
    }
    component
        .attributes
        .iter()
        .all(|(name, constraint)| match (elem.attribute(name), constraint) {
            (None, _) => false,
            (Some(_), AttributeConstraint::Present) => true,
            (Some(actual), AttributeConstraint::Equals(expected)) => actual == expected,
            (Some(actual), AttributeConstraint::Reserved { modifier, value }) => {
                actual.strip_prefix(modifier.to_string().as_str()) == Some(value.as_str())
            }
        })
}

/// Stable removal of repeated ids; the first occurrence of each stays.
pub(crate) fn deduplicate(ids: &mut Vec<NodeId>) {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.retain(|id| seen.insert(*id));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{Document, ParseOptions};
    use indoc::indoc;

    fn doc(html: &str) -> Document {
        Document::parse_html(html, &ParseOptions::default()).unwrap()
    }

    fn select_tags(doc: &Document, selector: &str) -> Vec<String> {
        let tree = doc.tree();
        select_from(&tree, &[tree.root()], &Selector::parse(selector))
            .into_iter()
            .map(|id| tree.data(id).unwrap().as_element().unwrap().tag().to_string())
            .collect()
    }

    fn select_ids(doc: &Document, selector: &str) -> Vec<String> {
        let tree = doc.tree();
        select_from(&tree, &[tree.root()], &Selector::parse(selector))
            .into_iter()
            .map(|id| {
                let elem = tree.data(id).unwrap().as_element().unwrap();
                elem.attribute("id").unwrap_or("?").to_string()
            })
            .collect()
    }

    const PAGE: &str = indoc! {r#"
        <div id="outer" class="box">
          <div id="inner" class="box wide">
            <p id="p1" class="note">one</p>
          </div>
          <p id="p2" lang="en">two</p>
          <a id="a1" href="/x">link</a>
          <a id="a2" data-x="~y">link</a>
        </div>"#};

    #[test]
    fn by_tag() {
        let d = doc(PAGE);
        assert_eq!(select_ids(&d, "p"), vec!["p1", "p2"]);
        assert_eq!(select_ids(&d, "P"), vec!["p1", "p2"]);
    }

    #[test]
    fn empty_selector_matches_every_element() {
        let d = doc("<p>a</p><p>b</p>");
        assert_eq!(select_tags(&d, ""), vec!["head", "body", "p", "p"]);
        assert_eq!(select_tags(&d, "*"), vec!["head", "body", "p", "p"]);
    }

    #[test]
    fn by_id_and_class() {
        let d = doc(PAGE);
        assert_eq!(select_ids(&d, "#inner"), vec!["inner"]);
        assert_eq!(select_ids(&d, ".box"), vec!["outer", "inner"]);
        assert_eq!(select_ids(&d, ".box.wide"), vec!["inner"]);
        assert_eq!(select_ids(&d, "div.wide.box"), vec!["inner"]);
        assert_eq!(select_ids(&d, ".BOX"), Vec::<String>::new());
    }

    #[test]
    fn descendant_chain_is_deduplicated() {
        let d = doc(PAGE);
        // "p1" is below both divs, so it's found twice before deduplication
        assert_eq!(select_ids(&d, "div p"), vec!["p1", "p2"]);
        assert_eq!(select_ids(&d, "div div p"), vec!["p1"]);
    }

    #[test]
    fn start_node_is_not_its_own_descendant() {
        let d = doc(PAGE);
        assert_eq!(select_ids(&d, "#outer #outer"), Vec::<String>::new());
    }

    #[test]
    fn by_attribute() {
        let d = doc(PAGE);
        assert_eq!(select_ids(&d, "[href]"), vec!["a1"]);
        assert_eq!(select_ids(&d, "a[href=/x]"), vec!["a1"]);
        assert_eq!(select_ids(&d, "a[href=/y]"), Vec::<String>::new());
        assert_eq!(select_ids(&d, "[lang='en']"), vec!["p2"]);
    }

    #[test]
    fn reserved_modifier_compares_literally() {
        let d = doc(PAGE);
        assert_eq!(select_ids(&d, "[data-x~=y]"), vec!["a2"]);
        assert_eq!(select_ids(&d, "[lang|=en]"), Vec::<String>::new());
    }

    #[test]
    fn no_matches_is_empty() {
        let d = doc(PAGE);
        assert!(select_ids(&d, "table td").is_empty());
    }

    #[test]
    fn dedup_keeps_first() {
        let mut ids = vec![NodeId(3), NodeId(1), NodeId(3), NodeId(2), NodeId(1)];
        deduplicate(&mut ids);
        assert_eq!(ids, vec![NodeId(3), NodeId(1), NodeId(2)]);
        let again = ids.clone();
        deduplicate(&mut ids);
        assert_eq!(ids, again);
    }
}
