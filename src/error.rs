use crate::dom::NodeId;
use std::fmt::{Display, Formatter};

/// Errors from building, querying, mutating or rendering a [`Document`](crate::dom::Document).
///
/// Selector parsing never produces one of these: a malformed selector degrades to whatever could be parsed (see
/// [`Selector::parse`](crate::query::Selector::parse)), and a selector that matches nothing is just an empty
/// [`Elements`](crate::select::Elements).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Error {
    /// A value couldn't be turned into the thing that was asked for; for example, building an `Elements` from a node
    /// id that doesn't belong to its document.
    InvalidInput(String),

    /// The markup parser couldn't produce a usable tree.
    MalformedMarkup(String),

    /// An operation touched a node that has since been removed from its document.
    ///
    /// Collections are snapshots: deleting a node through one `Elements` doesn't remove it from the others that hold
    /// it, but any later access through them ends up here.
    DetachedNodeAccess(NodeId),

    /// An index past the end of a collection.
    OutOfRange { index: usize, len: usize },

    /// Something that is deliberately not implemented.
    NotSupported(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;

impl std::error::Error for Error {}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidInput(message) => write!(f, "invalid input: {message}"),
            Error::MalformedMarkup(message) => write!(f, "malformed markup: {message}"),
            Error::DetachedNodeAccess(id) => write!(f, "node {id} has been removed from its document"),
            Error::OutOfRange { index, len } => {
                write!(f, "index {index} is out of range for a collection of {len} element(s)")
            }
            Error::NotSupported(what) => write!(f, "not supported: {what}"),
        }
    }
}
