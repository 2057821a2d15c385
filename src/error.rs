//! Construction-time errors.
//!
//! Malformed trees are programmer errors and are reported while the tree is
//! being wired up, before the first tick. The evaluation path itself has no
//! error channel; every tick outcome is one of the three
//! [`BehaviorResult`](crate::BehaviorResult) states.

use thiserror::Error;

use crate::NodeId;

/// Rejected [`TreeBuilder::attach`](crate::TreeBuilder::attach) call.
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum AttachError {
    /// One of the ids does not belong to this builder.
    #[error("node is not part of this builder")]
    UnknownNode,
    /// A node cannot be its own child.
    #[error("a node cannot be attached to itself")]
    SelfAttach,
    /// The graph is a strict tree: a node has at most one parent.
    #[error("child already has a parent")]
    AlreadyAttached,
    /// The parent is at its arity ceiling (e.g. a decorator already has its
    /// single child).
    #[error("attempted to add too many children")]
    TooManyChildren,
}

/// Rejected [`TreeBuilder::build`](crate::TreeBuilder::build) call.
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum BuildError {
    #[error("root node is not part of this builder")]
    UnknownRoot,
    #[error("root node must not have a parent")]
    RootHasParent,
    /// A node is below its required arity, e.g. a decorator that was never
    /// given its child.
    #[error("node {id:?} expects at least {expected} children, found {found}")]
    MissingChildren {
        id: NodeId,
        expected: usize,
        found: usize,
    },
    /// A node was added but never attached and is not the root.
    #[error("node {0:?} is not reachable from the root")]
    DetachedNode(NodeId),
}
