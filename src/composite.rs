//! Multi-child combinators: [`SequenceNode`] (AND) and [`SelectorNode`] (OR).

use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::{
    BehaviorCallback, BehaviorNode, BehaviorResult, Context, NumChildren, ResetCtx, Resettable,
    Symbol,
};

/// Runs all children in order, left to right.
///
/// Returns `Success` if every child returns `Success`; stops at the first
/// child that returns `Fail` or `Running`. A running child is recorded so
/// the sequence can resume there on the next tick when
/// [`remember_running_child`](Self::remember_running_child) is enabled.
pub struct SequenceNode {
    remember_running_child: bool,
    reset_children_on_success: bool,
    claim_priority_while_running: bool,
    running_flag: Option<Symbol>,
    running_child: Option<usize>,
}

impl Default for SequenceNode {
    fn default() -> Self {
        Self {
            remember_running_child: false,
            reset_children_on_success: true,
            claim_priority_while_running: false,
            running_flag: None,
            running_child: None,
        }
    }
}

impl SequenceNode {
    /// Resume evaluation at the child that was running last tick instead of
    /// starting over at index 0.
    pub fn remember_running_child(mut self, remember: bool) -> Self {
        self.remember_running_child = remember;
        self
    }

    /// Cascade a reset to all resettable children when every child has
    /// returned `Success`. Enabled by default.
    pub fn reset_children_on_success(mut self, reset: bool) -> Self {
        self.reset_children_on_success = reset;
        self
    }

    /// Claim the tree's priority-override slot at every evaluation start and
    /// release it only when the sequence fully succeeds. While the claim
    /// stands, the driver evaluates this sequence directly, bypassing the
    /// rest of the tree.
    pub fn claim_priority_while_running(mut self, claim: bool) -> Self {
        self.claim_priority_while_running = claim;
        self
    }

    /// Maintain a boolean blackboard flag under `key`: written `true` at
    /// every evaluation start and `false` only when the sequence fully
    /// succeeds.
    pub fn running_flag(mut self, key: impl Into<Symbol>) -> Self {
        self.running_flag = Some(key.into());
        self
    }
}

impl BehaviorNode for SequenceNode {
    fn tick(&mut self, arg: BehaviorCallback, ctx: &mut Context) -> BehaviorResult {
        if let Some(flag) = self.running_flag {
            ctx.set(flag, true);
        }
        if self.claim_priority_while_running {
            ctx.claim_priority();
        }

        let start = if self.remember_running_child {
            self.running_child.unwrap_or(0)
        } else {
            0
        };
        for i in start..ctx.child_count() {
            match ctx.tick_child(arg, i) {
                BehaviorResult::Running => {
                    self.running_child = Some(i);
                    return BehaviorResult::Running;
                }
                BehaviorResult::Fail => {
                    self.running_child = None;
                    return BehaviorResult::Fail;
                }
                BehaviorResult::Success => {
                    self.running_child = None;
                }
            }
        }

        // Every child returned Success; this is the only exit that clears
        // the side channels set at evaluation start.
        if self.reset_children_on_success {
            ctx.reset_children();
        }
        if let Some(flag) = self.running_flag {
            ctx.set(flag, false);
        }
        if self.claim_priority_while_running {
            ctx.release_priority();
        }
        BehaviorResult::Success
    }

    fn max_children(&self) -> NumChildren {
        NumChildren::Infinite
    }

    fn min_children(&self) -> usize {
        1
    }

    fn as_resettable(&mut self) -> Option<&mut dyn Resettable> {
        Some(self)
    }
}

impl Resettable for SequenceNode {
    fn reset(&mut self, ctx: &mut ResetCtx) {
        ctx.reset_children();
    }
}

/// Runs children in order, left to right, until one succeeds.
///
/// Returns `Success` as soon as any child returns `Success` (remaining
/// children are not evaluated that tick) and `Fail` once every child has
/// returned `Fail`. A running child is recorded for
/// [`remember_running_child`](Self::remember_running_child).
pub struct SelectorNode {
    remember_running_child: bool,
    randomize_execution_order: bool,
    initial_shuffle: bool,
    first_tick_done: bool,
    running_child: Option<usize>,
    rng: SmallRng,
}

impl Default for SelectorNode {
    fn default() -> Self {
        Self {
            remember_running_child: false,
            randomize_execution_order: false,
            initial_shuffle: false,
            first_tick_done: false,
            running_child: None,
            rng: SmallRng::from_entropy(),
        }
    }
}

impl SelectorNode {
    /// Resume evaluation at the child that was running last tick instead of
    /// starting over at index 0.
    pub fn remember_running_child(mut self, remember: bool) -> Self {
        self.remember_running_child = remember;
        self
    }

    /// Reshuffle the child order every time a child is successfully
    /// selected.
    pub fn randomize_execution_order(mut self, randomize: bool) -> Self {
        self.randomize_execution_order = randomize;
        self
    }

    /// Shuffle the children once before the first evaluation.
    pub fn initial_shuffle(mut self, shuffle: bool) -> Self {
        self.initial_shuffle = shuffle;
        self
    }

    /// Seed the shuffle RNG, for reproducible child orders.
    pub fn rng_seed(mut self, seed: u64) -> Self {
        self.rng = SmallRng::seed_from_u64(seed);
        self
    }
}

impl BehaviorNode for SelectorNode {
    fn tick(&mut self, arg: BehaviorCallback, ctx: &mut Context) -> BehaviorResult {
        if !self.first_tick_done {
            if self.initial_shuffle {
                ctx.shuffle_children(&mut self.rng);
            }
            self.first_tick_done = true;
        }

        let start = if self.remember_running_child {
            self.running_child.unwrap_or(0)
        } else {
            0
        };
        for i in start..ctx.child_count() {
            match ctx.tick_child(arg, i) {
                BehaviorResult::Running => {
                    self.running_child = Some(i);
                    return BehaviorResult::Running;
                }
                BehaviorResult::Fail => {
                    self.running_child = None;
                }
                BehaviorResult::Success => {
                    self.running_child = None;
                    if self.randomize_execution_order {
                        ctx.shuffle_children(&mut self.rng);
                    }
                    return BehaviorResult::Success;
                }
            }
        }
        BehaviorResult::Fail
    }

    fn max_children(&self) -> NumChildren {
        NumChildren::Infinite
    }

    fn min_children(&self) -> usize {
        1
    }
}
