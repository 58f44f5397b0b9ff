//! Error types for tree operations.
//!
//! Every fallible operation on [`AssocTree`](crate::AssocTree) returns
//! [`Result<T>`], an alias for `std::result::Result<T, TreeError>`. A failed
//! operation never leaves the container partially modified.

use thiserror::Error;

/// Result type alias for tree operations.
pub type Result<T> = std::result::Result<T, TreeError>;

/// Failure signals returned by [`AssocTree`](crate::AssocTree).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// Malformed input, e.g. a declared length longer than the supplied bytes.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// `insert` was called with a key that is already present.
    #[error("key already present")]
    DuplicateKey,

    /// `update`, `delete` or a lookup was called with a key that is not present.
    #[error("key not found")]
    KeyNotFound,

    /// A snapshot was requested from an empty container.
    #[error("container is empty")]
    Empty,

    /// Reserving storage for nodes, snapshots or owned copies failed.
    #[error("allocation of {requested} bytes failed")]
    AllocationFailure {
        /// Number of bytes that could not be reserved.
        requested: usize,
    },
}

/// A broken structural invariant found by [`AssocTree::verify`](crate::AssocTree::verify).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("root node is red")]
    RedRoot,

    #[error("root node has a parent link")]
    RootHasParent,

    #[error("red node {node} has a red parent")]
    RedRed { node: u32 },

    #[error("child {child} does not point back to parent {parent}")]
    ParentMismatch { parent: u32, child: u32 },

    #[error("keys out of order at in-order position {position}")]
    OutOfOrder { position: usize },

    #[error("tree holds {found} nodes, expected {expected}")]
    TreeCount { expected: usize, found: usize },

    #[error("insertion list holds {found} nodes, expected {expected}")]
    ListCount { expected: usize, found: usize },

    #[error("list links around node {node} are inconsistent")]
    ListLink { node: u32 },

    #[error("list tail does not match the last reachable node")]
    ListTail,
}
