use crate::error::{Error, Result};
use crate::query::pest::{parse_selector, Pair, Pairs, Rule};
use pest::error::InputLocation;
use std::fmt::{Display, Formatter};

/// A parsed selector: one or more [`SelectorComponent`]s, each matched against the descendants of the previous one's
/// matches.
///
/// Parsing is total. Every string produces a selector with at least one component; the parts of the string that don't
/// make sense are skipped rather than reported.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Selector {
    components: Vec<SelectorComponent>,
}

/// One space-delimited part of a selector.
///
/// Empty strings mean "no constraint". `class` may hold several dot-joined tokens (`a.b`), all of which must be present
/// on a matching element.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct SelectorComponent {
    pub tag: String,
    pub id: String,
    pub class: String,
    pub attributes: Vec<(String, AttributeConstraint)>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum AttributeConstraint {
    /// `[name]` or `[name=]`
    Present,
    /// `[name=value]`
    Equals(String),
    /// `[name~=value]` or `[name|=value]`.
    ///
    /// These are recognized but their CSS meaning isn't implemented: the attribute has to equal the modifier followed by
    /// the value, literally. [`Selector::ensure_supported`] rejects them.
    Reserved { modifier: Modifier, value: String },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Modifier {
    Tilde,
    Pipe,
}

impl Display for Modifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Modifier::Tilde => f.write_str("~"),
            Modifier::Pipe => f.write_str("|"),
        }
    }
}

impl Selector {
    pub fn parse(text: &str) -> Self {
        let mut components = match parse_selector(text) {
            Ok(pairs) => components_from(pairs),
            Err(err) => {
                tracing::warn!("couldn't fully parse selector {text:?}: {err}");
                recover_prefix(text, &err.location)
            }
        };
        if components.is_empty() {
            components.push(SelectorComponent::default());
        }
        tracing::trace!("selector {text:?} has {} component(s)", components.len());
        Self { components }
    }

    pub fn components(&self) -> &[SelectorComponent] {
        &self.components
    }

    /// Fails with [`Error::NotSupported`] if any component uses a `~` or `|` attribute modifier.
    pub fn ensure_supported(&self) -> Result<()> {
        let reserved = self
            .components
            .iter()
            .flat_map(|c| c.attributes.iter())
            .any(|(_, constraint)| matches!(constraint, AttributeConstraint::Reserved { .. }));
        if reserved {
            Err(Error::NotSupported("the ~ and | attribute modifiers"))
        } else {
            Ok(())
        }
    }
}

impl From<&str> for Selector {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl SelectorComponent {
    pub fn is_wildcard_tag(&self) -> bool {
        self.tag.is_empty() || self.tag == "*"
    }

    /// The dot-separated tokens of `class`, skipping empty ones.
    pub fn class_tokens(&self) -> impl Iterator<Item = &str> {
        self.class.split('.').filter(|token| !token.is_empty())
    }

    fn set_attribute(&mut self, name: String, constraint: AttributeConstraint) {
        match self.attributes.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, existing)) => *existing = constraint,
            None => self.attributes.push((name, constraint)),
        }
    }
}

/// Re-parses the part of `text` before a parse failure. The grammar accepts everything, so this is only a fallback.
fn recover_prefix(text: &str, location: &InputLocation) -> Vec<SelectorComponent> {
    let end = match location {
        InputLocation::Pos(pos) => *pos,
        InputLocation::Span((start, _)) => *start,
    };
    match text.get(..end).map(parse_selector) {
        Some(Ok(pairs)) => components_from(pairs),
        _ => Vec::new(),
    }
}

fn components_from(pairs: Pairs) -> Vec<SelectorComponent> {
    pairs
        .flat_map(|selector| selector.into_inner())
        .filter(|pair| pair.as_rule() == Rule::component)
        .map(component_from)
        .collect()
}

fn component_from(pair: Pair) -> SelectorComponent {
    let mut component = SelectorComponent::default();
    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::tag_char => component.tag.push_str(&part.as_str().to_ascii_lowercase()),
            Rule::id => component.id = token_text(part),
            Rule::class => component.class = token_text(part),
            Rule::attribute => {
                let (name, constraint) = attribute_from(part);
                component.set_attribute(name, constraint);
            }
            _ => {}
        }
    }
    component
}

fn token_text(pair: Pair) -> String {
    pair.into_inner()
        .find(|inner| inner.as_rule() == Rule::token)
        .map(|token| token.as_str().to_string())
        .unwrap_or_default()
}

fn attribute_from(pair: Pair) -> (String, AttributeConstraint) {
    let mut name = String::new();
    let mut modifier = None;
    let mut value = String::new();
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::attr_name => name = inner.as_str().to_ascii_lowercase(),
            Rule::attr_modifier => {
                modifier = Some(if inner.as_str() == "~" {
                    Modifier::Tilde
                } else {
                    Modifier::Pipe
                })
            }
            Rule::dq_value | Rule::sq_value | Rule::bare_value => value = inner.as_str().to_string(),
            _ => {}
        }
    }
    let constraint = match (modifier, value.is_empty()) {
        (Some(modifier), _) => AttributeConstraint::Reserved { modifier, value },
        (None, true) => AttributeConstraint::Present,
        (None, false) => AttributeConstraint::Equals(value),
    };
    (name, constraint)
}
