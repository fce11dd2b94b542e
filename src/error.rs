//! Error types shared by the tree and map operations.

use std::fmt;

/// The ways a tree or map operation can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// An internal operation was handed an empty node link.
    NullNode,

    /// Two distinct nodes carried equal keys while being linked.
    KeysMatch,

    /// The key to insert is already present.
    KeyExists,

    /// The tree holds no nodes.
    EmptyTree,

    /// No node with the requested key exists.
    NodeNotFound,

    /// No entry with the requested key exists.
    KeyNotFound,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NullNode => write!(f, "encountered an unexpected empty node link"),
            Error::KeysMatch => write!(f, "node keys unexpectedly matched"),
            Error::KeyExists => write!(f, "key already exists in the tree"),
            Error::EmptyTree => write!(f, "tree is empty"),
            Error::NodeNotFound => write!(f, "node was not found"),
            Error::KeyNotFound => write!(f, "key was not found"),
        }
    }
}

impl std::error::Error for Error {}

/// Result type for fallible tree and map operations.
pub type Result<T> = std::result::Result<T, Error>;
