//! Query, change and render HTML documents, or build them from a small Markdown dialect.
//!
//! The pieces, leaves first:
//!
//! - [`dom`]: the document tree. A [`dom::Document`] owns its nodes in an arena; HTML text is parsed into one by
//!   html5ever.
//! - [`query`]: the selector dialect. `"div.note a[href]"` parses into a [`query::Selector`], one
//!   [`query::SelectorComponent`] per space-separated word.
//! - [`select`]: [`select::Elements`], the collection type that every read and write goes through.
//! - [`md`]: compiles Markdown into a document, using only the [`select::Elements`] API.
//! - [`output`]: renders a collection back into HTML (or JSON), pretty-printed and optionally sanitized.
//! - [`run`]: the end-to-end workflow behind the `markq` binary.
//!
//! ```
//! use markq::dom::{Document, ParseOptions};
//! use markq::output::WriterOptions;
//!
//! # fn main() -> Result<(), markq::Error> {
//! let doc = Document::parse_html(r#"<p class="a">one</p><p>two</p>"#, &ParseOptions::default())?;
//! doc.select("p.a").add_class("b")?;
//! let html = doc.select("p").render(&WriterOptions::default())?;
//! assert_eq!(html, "<p class=\"a b\">one</p>\n<p>two</p>\n");
//! # Ok(())
//! # }
//! ```

pub mod dom;
mod error;
pub mod md;
pub mod output;
pub mod query;
pub mod run;
pub mod select;
mod util;

pub use error::{Error, Result};
