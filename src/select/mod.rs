mod elements;
mod matcher;
mod one_or_many;

pub use elements::*;
pub use one_or_many::*;

pub(crate) use matcher::select_from;
