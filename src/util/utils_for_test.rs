#[cfg(test)]
pub(crate) use test_utils::*;

// We keep this file's contents out of prod by putting them in a submodule guarded by cfg(test), but then "pub use" it
// to export its contents.
#[cfg(test)]
mod test_utils {
    use crate::dom::{Document, ParseOptions};
    use crate::output::WriterOptions;
    use std::fmt::Debug;

    impl WriterOptions {
        pub fn new_with<F>(init: F) -> Self
        where
            F: FnOnce(&mut WriterOptions),
        {
            let mut options = Self::default();
            init(&mut options);
            options
        }
    }

    pub fn parse_doc(html: &str) -> Document {
        match Document::parse_html(html, &ParseOptions::default()) {
            Ok(doc) => doc,
            Err(err) => panic!("couldn't parse {html:?}: {err}"),
        }
    }

    pub fn get_only<T: Debug, C: IntoIterator<Item = T>>(col: C) -> T {
        let mut iter = col.into_iter();
        let Some(result) = iter.next() else {
            panic!("expected an element, but was empty");
        };
        match iter.next() {
            None => result,
            Some(extra) => {
                let mut all = Vec::new();
                all.push(result);
                all.push(extra);
                all.extend(iter);
                panic!("expected exactly one element, but found {}: {all:?}", all.len());
            }
        }
    }

    /// Turn a pattern match into an `if let ... { else panic! }`.
    macro_rules! unwrap {
        ($enum_value:expr, $enum_variant:pat) => {
            let node = $enum_value;
            let node_debug = format!("{:?}", node);
            let $enum_variant = node else {
                panic!("Expected {} but saw {}", stringify!($enum_variant), node_debug);
            };
        };
    }
    pub(crate) use unwrap;
}
