use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// How to render a tree back into markup.
///
/// Tag names in `strip_tags` and `allowed_tags` are compared case-insensitively.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Builder, Serialize, Deserialize)]
#[builder(default)]
#[serde(default)]
pub struct WriterOptions {
    /// Pretty-print: put block elements on their own lines, indent their contents, and end with a newline.
    ///
    /// Without this, the output is just the tags and text, with nothing added between them.
    pub reformat: bool,
    /// Entity-encode text content.
    pub encode_entities: bool,
    /// Tags to drop along with everything inside them.
    pub strip_tags: BTreeSet<String>,
    /// If set, only these tags are written. Any other element is unwrapped: its tag and attributes disappear, but its
    /// contents are still written in its place.
    pub allowed_tags: Option<BTreeSet<String>>,
    /// One level of indentation, when reformatting.
    #[builder(setter(into))]
    pub indent: String,
    /// Write void elements as `<br />`, and attributes without values as `checked="checked"`.
    pub xhtml: bool,
}

const DANGEROUS_TAGS: &[&str] = &[
    "script", "style", "iframe", "frame", "frameset", "object", "embed", "applet", "noscript", "template", "base",
    "link", "meta",
];

const SAFE_TAGS: &[&str] = &[
    "a", "b", "i", "u", "s", "q", "em", "strong", "code", "kbd", "pre", "p", "br", "hr", "blockquote", "div", "span",
    "abbr", "small", "sub", "sup", "del", "ins", "ul", "ol", "li", "dl", "dt", "dd", "h1", "h2", "h3", "h4", "h5",
    "h6", "table", "thead", "tbody", "tfoot", "tr", "td", "th", "img",
];

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            reformat: true,
            encode_entities: true,
            strip_tags: BTreeSet::new(),
            allowed_tags: None,
            indent: "  ".to_string(),
            xhtml: false,
        }
    }
}

impl WriterOptions {
    /// Settings for showing untrusted markup: scripts and other active content are removed, anything not on a short
    /// list of formatting tags is unwrapped, text is encoded, and only a few link and image attributes survive.
    pub fn safe() -> Self {
        Self {
            strip_tags: DANGEROUS_TAGS.iter().map(|t| t.to_string()).collect(),
            allowed_tags: Some(SAFE_TAGS.iter().map(|t| t.to_string()).collect()),
            encode_entities: true,
            ..Self::default()
        }
    }

    /// Whether attributes get filtered down to the few known-safe ones. That happens when all of the safety settings
    /// are on: something is stripped, only some tags are allowed, and text is encoded.
    pub fn is_sanitizing(&self) -> bool {
        !self.strip_tags.is_empty() && self.allowed_tags.is_some() && self.encode_entities
    }
}
