//! Error taxonomy for the tree engine.
//!
//! Every fallible precondition gets its own variant so callers can present
//! an exact reason; there are no silent no-ops. All variants are
//! value-level and recoverable.

use crate::tree::NodeId;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid position encoding: {0}")]
    InvalidPosition(String),

    #[error("illegal move {san} in position {position}")]
    IllegalMove { san: String, position: String },

    #[error("parent node {0} does not belong to this tree")]
    DetachedParent(NodeId),

    #[error("node {0} is not attached to a parent")]
    DetachedNode(NodeId),

    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    #[error("the root node cannot be deleted")]
    CannotDeleteRoot,

    #[error("node {0} is the main-line child of its parent, not a variation")]
    NotAVariation(NodeId),

    #[error("node {0} is already the main line at its branch point")]
    AlreadyMainLine(NodeId),

    #[error("generated node id {0} is already in use")]
    DuplicateId(NodeId),

    #[error("parse error at {position}: {reason}")]
    Parse { position: usize, reason: String },

    #[error("import failed at move {index}: {cause}")]
    Import { index: usize, cause: Box<Error> },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
