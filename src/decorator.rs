//! Single-child transformers: [`InverterNode`], [`RepeaterNode`] and the
//! condition/branch [`IfNode`].

use crate::{
    BehaviorCallback, BehaviorNode, BehaviorResult, Context, NumChildren, ResetCtx, Resettable,
};

/// Swaps its child's `Success` and `Fail`.
///
/// `Running` passes through unchanged; a running child under an inverter is
/// unusual but not fatal, so it is only logged.
#[derive(Default)]
pub struct InverterNode;

impl BehaviorNode for InverterNode {
    fn tick(&mut self, arg: BehaviorCallback, ctx: &mut Context) -> BehaviorResult {
        match ctx.tick_child(arg, 0) {
            BehaviorResult::Success => BehaviorResult::Fail,
            BehaviorResult::Fail => BehaviorResult::Success,
            BehaviorResult::Running => {
                tracing::warn!("inverter child returned Running; passing it through");
                BehaviorResult::Running
            }
        }
    }

    fn max_children(&self) -> NumChildren {
        NumChildren::Finite(1)
    }

    fn min_children(&self) -> usize {
        1
    }
}

/// Re-runs its child until it has succeeded `target` times.
///
/// Only a child `Success` advances the counter; the child is reset between
/// repetitions (if it supports the capability) and a child `Fail` merely
/// costs the tick, so a repeater never fails. Once the target is reached the
/// repeater reports `Success` without evaluating the child again.
pub struct RepeaterNode {
    target: usize,
    count: usize,
}

impl RepeaterNode {
    pub fn new(target: usize) -> Self {
        Self { target, count: 0 }
    }
}

impl BehaviorNode for RepeaterNode {
    fn tick(&mut self, arg: BehaviorCallback, ctx: &mut Context) -> BehaviorResult {
        if self.count == self.target {
            return BehaviorResult::Success;
        }
        if let BehaviorResult::Success = ctx.tick_child(arg, 0) {
            ctx.reset_child(0);
            self.count += 1;
            if self.count == self.target {
                return BehaviorResult::Success;
            }
        }
        BehaviorResult::Running
    }

    fn max_children(&self) -> NumChildren {
        NumChildren::Finite(1)
    }

    fn min_children(&self) -> usize {
        1
    }

    fn as_resettable(&mut self) -> Option<&mut dyn Resettable> {
        Some(self)
    }
}

impl Resettable for RepeaterNode {
    fn reset(&mut self, ctx: &mut ResetCtx) {
        self.count = 0;
        ctx.reset_child(0);
    }
}

/// Evaluates a condition child and delegates to one of two branches.
///
/// Children are positional: the condition first, then the `then` branch (if
/// declared), then the `else` branch (if declared). When the condition
/// succeeds and a `then` branch exists, its result is returned; otherwise
/// the `else` branch is consulted; with no branch to delegate to the node
/// fails. Running bookkeeping is left entirely to the branches.
pub struct IfNode {
    has_then: bool,
    has_else: bool,
}

impl Default for IfNode {
    /// Condition plus a `then` branch, no `else`.
    fn default() -> Self {
        Self {
            has_then: true,
            has_else: false,
        }
    }
}

impl IfNode {
    pub fn new(has_then: bool, has_else: bool) -> Self {
        Self { has_then, has_else }
    }

    /// Condition, `then` branch and `else` branch.
    pub fn with_else() -> Self {
        Self {
            has_then: true,
            has_else: true,
        }
    }

    /// Condition and an `else` branch only: delegates exactly when the
    /// condition does not hold.
    pub fn else_only() -> Self {
        Self {
            has_then: false,
            has_else: true,
        }
    }
}

impl BehaviorNode for IfNode {
    fn tick(&mut self, arg: BehaviorCallback, ctx: &mut Context) -> BehaviorResult {
        let condition = ctx.tick_child(arg, 0);
        if condition == BehaviorResult::Success && self.has_then {
            return ctx.tick_child(arg, 1);
        }
        if self.has_else {
            let else_index = 1 + usize::from(self.has_then);
            return ctx.tick_child(arg, else_index);
        }
        BehaviorResult::Fail
    }

    fn max_children(&self) -> NumChildren {
        NumChildren::Finite(self.min_children())
    }

    fn min_children(&self) -> usize {
        1 + usize::from(self.has_then) + usize::from(self.has_else)
    }
}
