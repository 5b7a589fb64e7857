//! The document tree: an arena of element and text nodes, plus the bridge from html5ever.

mod document;
mod entities;
mod html_parse;
mod tree;

pub use document::*;
pub use entities::encode_entities;
pub use html_parse::ParseOptions;
pub use tree::{ElementData, NodeData, NodeId};

pub(crate) use entities::encode_attribute;
pub(crate) use html_parse::parse_fragment;
pub(crate) use tree::{Fragment, Tree};
