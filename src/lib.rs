//! # behavior-tree-engine
//!
//! A tick-driven behavior tree engine for agent AI.
//!
//! A behavior tree is a hierarchy of nodes re-evaluated once per tick. Every
//! node reports one of three results ([`Success`](BehaviorResult::Success),
//! [`Fail`](BehaviorResult::Fail), [`Running`](BehaviorResult::Running)) and
//! composite nodes combine child results according to control-flow policies:
//! sequences (AND), selectors (OR), inverters, repeaters, conditional
//! branches and timer/cooldown gates.
//!
//! The engine owns the node graph and a per-tree [`Blackboard`]; the host
//! owns the clock and calls [`BehaviorTree::tick`] once per frame or
//! simulation step with the elapsed time.
//!
//! ## Building and ticking a tree
//!
//! Trees are assembled programmatically, bottom-up, with a [`TreeBuilder`].
//! Construction is validated eagerly: arity violations and detached nodes are
//! reported before the first tick, never as a tick-time result.
//!
//! ```rust
//! use behavior_tree_engine::{BehaviorResult, ConditionNode, SequenceNode, TimerNode, TreeBuilder};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut builder = TreeBuilder::new();
//! let root = builder.add(SequenceNode::default());
//! builder.child(root, ConditionNode::new(|ctx| {
//!     ctx.get::<bool>("armed").copied().unwrap_or(false)
//! }))?;
//! builder.child(root, TimerNode::new(2.0))?;
//! let mut tree = builder.build(root)?;
//!
//! tree.blackboard_mut().set("armed", true);
//! // First tick: the condition holds, the timer has only accumulated 1.0
//! // of its 2.0 duration, so the sequence reports Running.
//! assert_eq!(tree.tick(1.0, &mut |_| None), BehaviorResult::Running);
//! assert_eq!(tree.tick(1.0, &mut |_| None), BehaviorResult::Success);
//! # Ok(())
//! # }
//! ```
//!
//! ## Defining your own node
//!
//! The core of the library is the [`BehaviorNode`] trait. Implement it to add
//! a node of your own; the [`Context`] argument gives access to the owning
//! tree's blackboard and to the node's attached children.
//!
//! ```rust
//! use behavior_tree_engine::{BehaviorCallback, BehaviorNode, BehaviorResult, Context};
//!
//! struct IsHealthy;
//!
//! impl BehaviorNode for IsHealthy {
//!     fn tick(&mut self, _arg: BehaviorCallback, ctx: &mut Context) -> BehaviorResult {
//!         match ctx.get::<i32>("health") {
//!             Some(hp) if *hp > 20 => BehaviorResult::Success,
//!             _ => BehaviorResult::Fail,
//!         }
//!     }
//! }
//! ```
//!
//! ## Talking to the host
//!
//! The first argument to `tick` is a callback for the behavior nodes to
//! communicate with the environment. The closure takes a `&dyn Any` message
//! and may return a `Box<dyn Any>` answer, which allows leaves to trigger
//! animations or run spatial queries against host state whose lifetime is
//! not `'static`:
//!
//! ```rust
//! use behavior_tree_engine::{RangeQuery, TargetInRangeNode, TreeBuilder};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut builder = TreeBuilder::new();
//! let root = builder.add(TargetInRangeNode::new(5.0));
//! let mut tree = builder.build(root)?;
//!
//! tree.tick(0.016, &mut |msg| {
//!     if let Some(query) = msg.downcast_ref::<RangeQuery>() {
//!         // Host-side spatial lookup; answer with the target's position.
//!         assert_eq!(query.radius, 5.0);
//!         return Some(Box::new([4.0f32, 3.0]));
//!     }
//!     None
//! });
//! # Ok(())
//! # }
//! ```
//!
//! ## Priority override
//!
//! A [`SequenceNode`] can be configured to claim the tree's priority-override
//! slot while its subtree is running. The driver then evaluates that node
//! directly on subsequent ticks, bypassing the rest of the tree, until the
//! sequence fully succeeds and releases the claim. This models "commit to a
//! multi-step action once started" without every ancestor having to re-check
//! Running propagation each tick.

mod blackboard;
mod builder;
mod composite;
mod decorator;
pub mod error;
mod nodes;
mod symbol;
mod tree;

use std::any::Any;

pub use crate::blackboard::Blackboard;
pub use crate::builder::TreeBuilder;
pub use crate::composite::{SelectorNode, SequenceNode};
pub use crate::decorator::{IfNode, InverterNode, RepeaterNode};
pub use crate::nodes::{
    AnimationTrigger, ConditionNode, CooldownConditionNode, DebugNode, EventConditionNode,
    EventTrigger, PlayAnimationNode, RangeQuery, TargetInRangeNode, TimerNode,
};
pub use crate::symbol::Symbol;
pub use crate::tree::{BehaviorTree, Context, NodeId, ResetCtx};
pub use ::once_cell::sync::*;

/// The result of evaluating a node for one tick.
///
/// A closed three-way outcome; there is no error channel on the evaluation
/// path.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BehaviorResult {
    Success,
    Fail,
    /// The node has not resolved yet; resume it next tick.
    Running,
}

/// Callback for the behavior nodes to communicate with the environment.
///
/// Leaves send a message (e.g. [`RangeQuery`] or [`AnimationTrigger`]) and
/// the host may answer with an arbitrary payload. A closure is used instead
/// of a trait object so the host can borrow state with non-`'static`
/// lifetimes for the duration of a tick.
pub type BehaviorCallback<'a> = &'a mut dyn FnMut(&dyn Any) -> Option<Box<dyn Any>>;

/// How many children a node type accepts.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum NumChildren {
    Finite(usize),
    Infinite,
}

impl PartialOrd for NumChildren {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        use std::cmp::Ordering;
        match (self, other) {
            (Self::Infinite, Self::Infinite) => None,
            (Self::Finite(_), Self::Infinite) => Some(Ordering::Less),
            (Self::Infinite, Self::Finite(_)) => Some(Ordering::Greater),
            (Self::Finite(lhs), Self::Finite(rhs)) => Some(lhs.cmp(rhs)),
        }
    }
}

/// A node in a behavior tree.
///
/// The sole required operation is [`tick`](Self::tick), invoked at most once
/// per tick per node (composites guarantee this for their children). The
/// arity methods are consulted by [`TreeBuilder`] when the tree is wired up,
/// so malformed trees fail at construction time rather than surfacing as a
/// tick-time `Fail`.
pub trait BehaviorNode {
    fn tick(&mut self, arg: BehaviorCallback, ctx: &mut Context) -> BehaviorResult;

    /// Upper bound on the number of children this node accepts.
    fn max_children(&self) -> NumChildren {
        NumChildren::Finite(0)
    }

    /// Children required before the tree may be built.
    fn min_children(&self) -> usize {
        0
    }

    /// Reset-capability query. Nodes that keep per-tick progress (timers,
    /// counters) answer `Some`; callers must not assume the capability is
    /// universal.
    fn as_resettable(&mut self) -> Option<&mut dyn Resettable> {
        None
    }
}

/// Capability interface for nodes whose internal per-tick progress can be
/// cleared: timers back to zero, counters back to zero. Composites cascade
/// through [`ResetCtx`] to whichever children also support it.
pub trait Resettable {
    fn reset(&mut self, ctx: &mut ResetCtx);
}
