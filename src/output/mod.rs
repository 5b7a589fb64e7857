//! Rendering trees back out, as HTML text or as a JSON-serializable tree.

mod options;
mod sanitize;
mod serde_tree;
mod tag_info;
mod writer;

pub use options::*;
pub use serde_tree::SerializableNodes;

pub(crate) use writer::render_nodes;
