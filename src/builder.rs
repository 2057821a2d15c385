//! Programmatic tree construction.
//!
//! Trees are wired up bottom-up before the first tick: insert nodes with
//! [`TreeBuilder::add`], connect them with [`TreeBuilder::attach`] (or the
//! [`child`](TreeBuilder::child) shorthand), then seal the tree with
//! [`TreeBuilder::build`]. All structural mistakes are surfaced here as
//! `Err` values; a built tree is structurally sound for its whole lifetime.

use crate::error::{AttachError, BuildError};
use crate::tree::NodeArena;
use crate::{BehaviorNode, BehaviorTree, NodeId, NumChildren};

#[derive(Default)]
pub struct TreeBuilder {
    arena: NodeArena,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a node without attaching it and returns its handle.
    pub fn add(&mut self, node: impl BehaviorNode + 'static) -> NodeId {
        self.arena.insert(Box::new(node))
    }

    /// Appends `child` to the end of `parent`'s ordered child list and sets
    /// its parent reference.
    pub fn attach(&mut self, parent: NodeId, child: NodeId) -> Result<(), AttachError> {
        if !self.arena.contains(parent) || !self.arena.contains(child) {
            return Err(AttachError::UnknownNode);
        }
        if parent == child {
            return Err(AttachError::SelfAttach);
        }
        if self.arena.parent(child).is_some() {
            return Err(AttachError::AlreadyAttached);
        }
        let count = NumChildren::Finite(self.arena.child_count(parent));
        if count < self.arena.node(parent).max_children() {
            self.arena.link(parent, child);
            Ok(())
        } else {
            Err(AttachError::TooManyChildren)
        }
    }

    /// Inserts `node` and attaches it under `parent` in one step.
    pub fn child(
        &mut self,
        parent: NodeId,
        node: impl BehaviorNode + 'static,
    ) -> Result<NodeId, AttachError> {
        let id = self.add(node);
        self.attach(parent, id)?;
        Ok(id)
    }

    /// Validates the wired-up graph and turns it into a tickable tree.
    pub fn build(self, root: NodeId) -> Result<BehaviorTree, BuildError> {
        if !self.arena.contains(root) {
            return Err(BuildError::UnknownRoot);
        }
        if self.arena.parent(root).is_some() {
            return Err(BuildError::RootHasParent);
        }
        for id in self.arena.ids() {
            let expected = self.arena.node(id).min_children();
            let found = self.arena.child_count(id);
            if found < expected {
                return Err(BuildError::MissingChildren {
                    id,
                    expected,
                    found,
                });
            }
            if id != root && self.arena.parent(id).is_none() {
                return Err(BuildError::DetachedNode(id));
            }
        }
        Ok(BehaviorTree::new(self.arena, root))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DebugNode, InverterNode, SelectorNode, SequenceNode};

    #[test]
    fn child_may_not_have_two_parents() {
        let mut builder = TreeBuilder::new();
        let a = builder.add(SequenceNode::default());
        let b = builder.add(SelectorNode::default());
        let leaf = builder.add(DebugNode::default());
        assert_eq!(builder.attach(a, leaf), Ok(()));
        assert_eq!(builder.attach(b, leaf), Err(AttachError::AlreadyAttached));
    }

    #[test]
    fn decorator_takes_exactly_one_child() {
        let mut builder = TreeBuilder::new();
        let inverter = builder.add(InverterNode::default());
        builder.child(inverter, DebugNode::default()).unwrap();
        let extra = builder.add(DebugNode::default());
        assert_eq!(
            builder.attach(inverter, extra),
            Err(AttachError::TooManyChildren)
        );
    }

    #[test]
    fn self_attach_is_rejected() {
        let mut builder = TreeBuilder::new();
        let seq = builder.add(SequenceNode::default());
        assert_eq!(builder.attach(seq, seq), Err(AttachError::SelfAttach));
    }

    #[test]
    fn leaves_take_no_children() {
        let mut builder = TreeBuilder::new();
        let leaf = builder.add(DebugNode::default());
        let other = builder.add(DebugNode::default());
        assert_eq!(
            builder.attach(leaf, other),
            Err(AttachError::TooManyChildren)
        );
    }

    #[test]
    fn build_rejects_childless_decorator() {
        let mut builder = TreeBuilder::new();
        let inverter = builder.add(InverterNode::default());
        match builder.build(inverter) {
            Err(BuildError::MissingChildren {
                expected: 1,
                found: 0,
                ..
            }) => {}
            other => panic!("expected MissingChildren, got {other:?}"),
        }
    }

    #[test]
    fn build_rejects_empty_composite() {
        let mut builder = TreeBuilder::new();
        let seq = builder.add(SequenceNode::default());
        assert!(matches!(
            builder.build(seq),
            Err(BuildError::MissingChildren { .. })
        ));
    }

    #[test]
    fn build_rejects_detached_nodes() {
        let mut builder = TreeBuilder::new();
        let root = builder.add(SequenceNode::default());
        builder.child(root, DebugNode::default()).unwrap();
        let _forgotten = builder.add(DebugNode::default());
        assert!(matches!(
            builder.build(root),
            Err(BuildError::DetachedNode(_))
        ));
    }

    #[test]
    fn build_rejects_non_root_root() {
        let mut builder = TreeBuilder::new();
        let root = builder.add(SequenceNode::default());
        let child = builder.child(root, SequenceNode::default()).unwrap();
        builder.child(child, DebugNode::default()).unwrap();
        assert!(matches!(builder.build(child), Err(BuildError::RootHasParent)));
    }
}
