//! Error type shared by every fallible tree operation.

use thiserror::Error;

/// Errors raised by the move tree, its serializers and the conditional tree.
///
/// All of them are raised synchronously at the point of violation and leave
/// the tree exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// A value passed in is out of range (for example a player color that is
    /// neither empty, black nor white).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The operation is not allowed on this node (for example a trunk move
    /// requested from a node that is not itself on the trunk).
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
    /// Data being restored disagrees with the tree it is restored into.
    #[error("corrupt state: {0}")]
    CorruptState(String),
}

pub type Result<T> = std::result::Result<T, TreeError>;
