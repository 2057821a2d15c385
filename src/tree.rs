//! The node arena, the per-tick [`Context`] and the [`BehaviorTree`] driver.
//!
//! All nodes of a tree live in one arena owned by the tree; parents refer to
//! their ordered children (and children to their parent) by [`NodeId`].
//! During a tick the node being evaluated is temporarily taken out of its
//! slot, so the arena can be borrowed for the children without aliasing the
//! node itself.

use std::any::Any;
use std::mem;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::{BehaviorCallback, BehaviorNode, BehaviorResult, Blackboard, Symbol};

/// Handle to a node inside a tree's arena.
///
/// Ids are assigned by [`TreeBuilder`](crate::TreeBuilder) and stay valid for
/// the lifetime of the built tree. They carry no ownership; the arena does.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NodeId(u32);

struct Slot {
    /// `None` only while the node is being evaluated or reset.
    node: Option<Box<dyn BehaviorNode>>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Default)]
pub(crate) struct NodeArena {
    slots: Vec<Slot>,
}

impl NodeArena {
    pub(crate) fn insert(&mut self, node: Box<dyn BehaviorNode>) -> NodeId {
        let id = NodeId(self.slots.len() as u32);
        self.slots.push(Slot {
            node: Some(node),
            parent: None,
            children: Vec::new(),
        });
        id
    }

    pub(crate) fn contains(&self, id: NodeId) -> bool {
        (id.0 as usize) < self.slots.len()
    }

    pub(crate) fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.slots.len() as u32).map(NodeId)
    }

    pub(crate) fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slots[id.0 as usize].parent
    }

    pub(crate) fn child_count(&self, id: NodeId) -> usize {
        self.slots[id.0 as usize].children.len()
    }

    pub(crate) fn link(&mut self, parent: NodeId, child: NodeId) {
        self.slots[child.0 as usize].parent = Some(parent);
        self.slots[parent.0 as usize].children.push(child);
    }

    pub(crate) fn node(&self, id: NodeId) -> &dyn BehaviorNode {
        self.slots[id.0 as usize]
            .node
            .as_deref()
            .expect("node taken out of its slot")
    }

    fn take(&mut self, id: NodeId) -> (Box<dyn BehaviorNode>, Vec<NodeId>) {
        let slot = &mut self.slots[id.0 as usize];
        let node = slot.node.take().expect("node re-entered during evaluation");
        let children = mem::take(&mut slot.children);
        (node, children)
    }

    fn restore(&mut self, id: NodeId, node: Box<dyn BehaviorNode>, children: Vec<NodeId>) {
        let slot = &mut self.slots[id.0 as usize];
        slot.node = Some(node);
        slot.children = children;
    }

    /// Resets `id` if it supports the capability, letting it cascade to its
    /// own children. A node without the capability is left untouched.
    fn reset(&mut self, id: NodeId) {
        let (mut node, children) = self.take(id);
        if let Some(resettable) = node.as_resettable() {
            let mut ctx = ResetCtx {
                arena: self,
                children: &children,
            };
            resettable.reset(&mut ctx);
        }
        self.restore(id, node, children);
    }
}

/// The per-tick view a node receives while it is evaluated: blackboard
/// access, the external time step, and its attached children.
pub struct Context<'a> {
    arena: &'a mut NodeArena,
    blackboard: &'a mut Blackboard,
    priority: &'a mut Option<NodeId>,
    dt: f32,
    time: f64,
    /// Id of the node currently being evaluated.
    current: NodeId,
    /// Ordered children of the current node, taken out of its slot.
    children: Vec<NodeId>,
}

impl Context<'_> {
    /// Reads a blackboard value, `None` when absent.
    pub fn get<T: 'static>(&self, key: impl Into<Symbol>) -> Option<&T> {
        self.blackboard.get(key)
    }

    /// Writes a blackboard value.
    pub fn set<T: 'static>(&mut self, key: impl Into<Symbol>, value: T) {
        self.blackboard.set(key, value);
    }

    /// Relays an already-boxed payload into the blackboard.
    pub fn set_any(&mut self, key: impl Into<Symbol>, value: Box<dyn Any>) {
        self.blackboard.set_any(key, value);
    }

    /// Resets a blackboard slot to absent.
    pub fn clear(&mut self, key: impl Into<Symbol>) {
        self.blackboard.clear(key);
    }

    /// Elapsed time supplied by the host for this tick.
    pub fn dt(&self) -> f32 {
        self.dt
    }

    /// Time accumulated by the owning tree across all ticks so far.
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Evaluates the child at `index` and returns its result.
    ///
    /// Asking for an index that has no child is a structural mistake in the
    /// calling node; it is reported as `Fail` with an error diagnostic
    /// rather than a panic.
    pub fn tick_child(&mut self, arg: BehaviorCallback, index: usize) -> BehaviorResult {
        let Some(&child) = self.children.get(index) else {
            tracing::error!(index, node = self.current.0, "no child at index");
            return BehaviorResult::Fail;
        };
        let (mut node, grandchildren) = self.arena.take(child);
        let prev_current = mem::replace(&mut self.current, child);
        let prev_children = mem::replace(&mut self.children, grandchildren);
        let result = node.tick(arg, self);
        let grandchildren = mem::replace(&mut self.children, prev_children);
        self.current = prev_current;
        self.arena.restore(child, node, grandchildren);
        result
    }

    /// Resets the child at `index` if it supports the capability.
    pub fn reset_child(&mut self, index: usize) {
        if let Some(&child) = self.children.get(index) {
            self.arena.reset(child);
        }
    }

    /// Resets every resettable child; children without the capability are
    /// skipped.
    pub fn reset_children(&mut self) {
        for i in 0..self.children.len() {
            let child = self.children[i];
            self.arena.reset(child);
        }
    }

    /// Permutes the order in which the current node's children are stored
    /// (and therefore evaluated). The new order persists across ticks.
    pub fn shuffle_children<R: Rng>(&mut self, rng: &mut R) {
        self.children.shuffle(rng);
    }

    /// Claims the tree's priority-override slot for the node currently being
    /// evaluated: the driver will evaluate this node directly on subsequent
    /// ticks until the claim is released.
    pub fn claim_priority(&mut self) {
        *self.priority = Some(self.current);
    }

    /// Releases the priority-override slot, returning the driver to the
    /// root.
    pub fn release_priority(&mut self) {
        *self.priority = None;
    }
}

/// Cascade view handed to [`Resettable::reset`](crate::Resettable::reset):
/// lets a node propagate the reset to its resettable children without
/// assuming the capability is universal.
pub struct ResetCtx<'a> {
    arena: &'a mut NodeArena,
    children: &'a [NodeId],
}

impl ResetCtx<'_> {
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn reset_child(&mut self, index: usize) {
        if let Some(&child) = self.children.get(index) {
            self.arena.reset(child);
        }
    }

    pub fn reset_children(&mut self) {
        let children = self.children;
        for &child in children {
            self.arena.reset(child);
        }
    }
}

/// Owns the node graph's root, the blackboard and the per-tick entry point.
///
/// Built once by [`TreeBuilder`](crate::TreeBuilder); the root never changes
/// afterwards. Ticking is strictly single-threaded and non-reentrant: the
/// whole tree is evaluated synchronously within one [`tick`](Self::tick)
/// call.
pub struct BehaviorTree {
    arena: NodeArena,
    root: NodeId,
    blackboard: Blackboard,
    priority_override: Option<NodeId>,
    clock: f64,
}

impl std::fmt::Debug for BehaviorTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BehaviorTree")
            .field("root", &self.root)
            .field("node_count", &self.arena.slots.len())
            .field("priority_override", &self.priority_override)
            .field("clock", &self.clock)
            .finish()
    }
}

impl BehaviorTree {
    pub(crate) fn new(arena: NodeArena, root: NodeId) -> Self {
        Self {
            arena,
            root,
            blackboard: Blackboard::default(),
            priority_override: None,
            clock: 0.0,
        }
    }

    /// Advances the tree by one tick.
    ///
    /// `dt` is the elapsed time since the previous tick, supplied by the
    /// host; the engine owns no clock of its own. If a node holds the
    /// priority-override slot, only that node is evaluated; otherwise
    /// evaluation starts at the root.
    ///
    /// The returned result is reported for observability; the driver itself
    /// takes no action on it.
    pub fn tick(&mut self, dt: f32, arg: BehaviorCallback) -> BehaviorResult {
        self.clock += f64::from(dt);
        let target = match self.priority_override {
            Some(node) => {
                tracing::trace!(node = node.0, "priority override active; redirecting tick");
                node
            }
            None => self.root,
        };
        let (mut node, children) = self.arena.take(target);
        let mut ctx = Context {
            arena: &mut self.arena,
            blackboard: &mut self.blackboard,
            priority: &mut self.priority_override,
            dt,
            time: self.clock,
            current: target,
            children,
        };
        let result = node.tick(arg, &mut ctx);
        let children = ctx.children;
        self.arena.restore(target, node, children);
        result
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn blackboard(&self) -> &Blackboard {
        &self.blackboard
    }

    pub fn blackboard_mut(&mut self) -> &mut Blackboard {
        &mut self.blackboard
    }

    /// The node currently holding exclusive evaluation rights, if any.
    pub fn priority_override(&self) -> Option<NodeId> {
        self.priority_override
    }
}
