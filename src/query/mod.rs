mod pest;
mod selector;

pub use selector::*;
