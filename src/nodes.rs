//! Leaf nodes: condition checks, timers, cooldowns, one-shot actions and
//! event-triggered checks.
//!
//! Leaves that need the host (spatial queries, animation triggers) speak
//! through the behavior callback with the message types defined here; the
//! engine never implements those capabilities itself.

use std::cell::Cell;
use std::rc::Rc;

use once_cell::sync::Lazy;

use crate::{BehaviorCallback, BehaviorNode, BehaviorResult, Context, ResetCtx, Resettable, Symbol};

static TARGET_POSITION: Lazy<Symbol> = Lazy::new(|| "target_position".into());

/// Succeeds while the supplied check holds, fails otherwise. Never returns
/// `Running`.
pub struct ConditionNode<F> {
    check: F,
}

impl<F> ConditionNode<F>
where
    F: FnMut(&mut Context) -> bool,
{
    pub fn new(check: F) -> Self {
        Self { check }
    }
}

impl<F> BehaviorNode for ConditionNode<F>
where
    F: FnMut(&mut Context) -> bool,
{
    fn tick(&mut self, _arg: BehaviorCallback, ctx: &mut Context) -> BehaviorResult {
        if (self.check)(ctx) {
            BehaviorResult::Success
        } else {
            BehaviorResult::Fail
        }
    }
}

/// Succeeds at most once per `cooldown` interval of tree time.
///
/// The first evaluation always succeeds; each success re-arms the gate.
pub struct CooldownConditionNode {
    cooldown: f64,
    last_fire: Option<f64>,
}

impl CooldownConditionNode {
    pub fn new(cooldown: f32) -> Self {
        Self {
            cooldown: f64::from(cooldown),
            last_fire: None,
        }
    }
}

impl BehaviorNode for CooldownConditionNode {
    fn tick(&mut self, _arg: BehaviorCallback, ctx: &mut Context) -> BehaviorResult {
        let now = ctx.time();
        match self.last_fire {
            Some(last) if now - last < self.cooldown => BehaviorResult::Fail,
            _ => {
                self.last_fire = Some(now);
                BehaviorResult::Success
            }
        }
    }
}

/// Query message sent by [`TargetInRangeNode`] through the behavior
/// callback. The host answers with the located target's position (any
/// payload type), or `None` when nothing is in range.
pub struct RangeQuery {
    pub radius: f32,
}

/// Asks the host whether a target is within `radius`; on a hit, stores the
/// host's answer in the blackboard (under `target_position` by default) and
/// succeeds.
pub struct TargetInRangeNode {
    radius: f32,
    output: Symbol,
}

impl TargetInRangeNode {
    pub fn new(radius: f32) -> Self {
        Self {
            radius,
            output: *TARGET_POSITION,
        }
    }

    /// Store the answer under a different blackboard key.
    pub fn output(mut self, key: impl Into<Symbol>) -> Self {
        self.output = key.into();
        self
    }
}

impl BehaviorNode for TargetInRangeNode {
    fn tick(&mut self, arg: BehaviorCallback, ctx: &mut Context) -> BehaviorResult {
        match arg(&RangeQuery {
            radius: self.radius,
        }) {
            Some(position) => {
                ctx.set_any(self.output, position);
                BehaviorResult::Success
            }
            None => BehaviorResult::Fail,
        }
    }
}

/// Host-facing handle for [`EventConditionNode`]: cloneable latch the host
/// fires when its event happens.
#[derive(Clone, Default)]
pub struct EventTrigger(Rc<Cell<bool>>);

impl EventTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fire(&self) {
        self.0.set(true);
    }

    fn take(&self) -> bool {
        self.0.replace(false)
    }
}

/// Succeeds for exactly one evaluation after its trigger fired, then reverts
/// to failing until the next fire.
pub struct EventConditionNode {
    trigger: EventTrigger,
}

impl EventConditionNode {
    pub fn new(trigger: EventTrigger) -> Self {
        Self { trigger }
    }
}

impl BehaviorNode for EventConditionNode {
    fn tick(&mut self, _arg: BehaviorCallback, _ctx: &mut Context) -> BehaviorResult {
        if self.trigger.take() {
            BehaviorResult::Success
        } else {
            BehaviorResult::Fail
        }
    }
}

/// Accumulates elapsed time while `Running`; succeeds once the configured
/// duration has been reached. Resettable back to zero.
pub struct TimerNode {
    duration: f32,
    elapsed: f32,
}

impl TimerNode {
    pub fn new(duration: f32) -> Self {
        Self {
            duration,
            elapsed: 0.0,
        }
    }
}

impl BehaviorNode for TimerNode {
    fn tick(&mut self, _arg: BehaviorCallback, ctx: &mut Context) -> BehaviorResult {
        self.elapsed += ctx.dt();
        if self.elapsed >= self.duration {
            BehaviorResult::Success
        } else {
            BehaviorResult::Running
        }
    }

    fn as_resettable(&mut self) -> Option<&mut dyn Resettable> {
        Some(self)
    }
}

impl Resettable for TimerNode {
    fn reset(&mut self, _ctx: &mut ResetCtx) {
        self.elapsed = 0.0;
    }
}

/// Message sent by [`PlayAnimationNode`] through the behavior callback when
/// an activation starts.
pub struct AnimationTrigger {
    pub name: Symbol,
}

/// Signals the start of a timed host action (an animation) exactly once per
/// activation, then runs out the configured duration. Resettable, which arms
/// the trigger for the next activation.
pub struct PlayAnimationNode {
    name: Symbol,
    duration: f32,
    elapsed: f32,
}

impl PlayAnimationNode {
    pub fn new(name: impl Into<Symbol>, duration: f32) -> Self {
        Self {
            name: name.into(),
            duration,
            elapsed: 0.0,
        }
    }
}

impl BehaviorNode for PlayAnimationNode {
    fn tick(&mut self, arg: BehaviorCallback, ctx: &mut Context) -> BehaviorResult {
        if self.elapsed == 0.0 {
            arg(&AnimationTrigger { name: self.name });
        }
        self.elapsed += ctx.dt();
        if self.elapsed >= self.duration {
            BehaviorResult::Success
        } else {
            BehaviorResult::Running
        }
    }

    fn as_resettable(&mut self) -> Option<&mut dyn Resettable> {
        Some(self)
    }
}

impl Resettable for PlayAnimationNode {
    fn reset(&mut self, _ctx: &mut ResetCtx) {
        self.elapsed = 0.0;
    }
}

/// Logs a message and succeeds. Handy for probing tree shape during
/// development.
pub struct DebugNode {
    message: String,
}

impl Default for DebugNode {
    fn default() -> Self {
        Self {
            message: "debug node reached".to_owned(),
        }
    }
}

impl DebugNode {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl BehaviorNode for DebugNode {
    fn tick(&mut self, _arg: BehaviorCallback, _ctx: &mut Context) -> BehaviorResult {
        tracing::debug!("{}", self.message);
        BehaviorResult::Success
    }
}

#[cfg(test)]
mod tests {
    use std::any::Any;

    use super::*;
    use crate::{SequenceNode, TreeBuilder};

    fn leaf_tree(node: impl BehaviorNode + 'static) -> crate::BehaviorTree {
        let mut builder = TreeBuilder::new();
        let root = builder.add(node);
        builder.build(root).unwrap()
    }

    #[test]
    fn condition_reports_the_check() {
        let mut tree = leaf_tree(ConditionNode::new(|ctx| {
            ctx.get::<i32>("hp").copied().unwrap_or(0) > 0
        }));
        assert_eq!(tree.tick(0.1, &mut |_| None), BehaviorResult::Fail);
        tree.blackboard_mut().set("hp", 10i32);
        assert_eq!(tree.tick(0.1, &mut |_| None), BehaviorResult::Success);
    }

    #[test]
    fn cooldown_gates_by_elapsed_tree_time() {
        let mut tree = leaf_tree(CooldownConditionNode::new(5.0));
        let expected = [
            BehaviorResult::Success, // first call always passes
            BehaviorResult::Fail,
            BehaviorResult::Fail,
            BehaviorResult::Fail,
            BehaviorResult::Fail,
            BehaviorResult::Success, // exactly 5.0 elapsed since the last pass
            BehaviorResult::Fail,    // the success above re-armed the gate
        ];
        for want in expected {
            assert_eq!(tree.tick(1.0, &mut |_| None), want);
        }
    }

    #[test]
    fn event_condition_fires_exactly_once_per_trigger() {
        let trigger = EventTrigger::new();
        let mut tree = leaf_tree(EventConditionNode::new(trigger.clone()));

        assert_eq!(tree.tick(0.1, &mut |_| None), BehaviorResult::Fail);
        trigger.fire();
        assert_eq!(tree.tick(0.1, &mut |_| None), BehaviorResult::Success);
        assert_eq!(tree.tick(0.1, &mut |_| None), BehaviorResult::Fail);
    }

    #[test]
    fn timer_accumulates_and_completes() {
        let mut tree = leaf_tree(TimerNode::new(2.0));
        assert_eq!(tree.tick(1.0, &mut |_| None), BehaviorResult::Running);
        assert_eq!(tree.tick(1.0, &mut |_| None), BehaviorResult::Success);
    }

    #[test]
    fn timer_rearms_through_sequence_reset() {
        let mut builder = TreeBuilder::new();
        let root = builder.add(SequenceNode::default());
        builder.child(root, TimerNode::new(2.0)).unwrap();
        let mut tree = builder.build(root).unwrap();

        assert_eq!(tree.tick(1.0, &mut |_| None), BehaviorResult::Running);
        assert_eq!(tree.tick(1.0, &mut |_| None), BehaviorResult::Success);
        // reset-on-success re-armed the timer, so the cycle starts over.
        assert_eq!(tree.tick(1.0, &mut |_| None), BehaviorResult::Running);
    }

    #[test]
    fn animation_triggers_once_per_activation() {
        let mut tree = leaf_tree(PlayAnimationNode::new("slash", 2.0));
        let mut triggers: Vec<Symbol> = Vec::new();
        let mut callback = |msg: &dyn Any| {
            if let Some(trigger) = msg.downcast_ref::<AnimationTrigger>() {
                triggers.push(trigger.name);
            }
            None
        };

        assert_eq!(tree.tick(1.0, &mut callback), BehaviorResult::Running);
        assert_eq!(tree.tick(1.0, &mut callback), BehaviorResult::Success);
        assert_eq!(tree.tick(1.0, &mut callback), BehaviorResult::Success);
        assert_eq!(triggers.len(), 1);
        assert_eq!(triggers[0], "slash");
    }

    #[test]
    fn in_range_stores_the_host_answer() {
        let mut tree = leaf_tree(TargetInRangeNode::new(5.0));
        let result = tree.tick(0.1, &mut |msg| {
            msg.downcast_ref::<RangeQuery>().map(|query| {
                assert_eq!(query.radius, 5.0);
                Box::new([4.0f32, 3.0]) as Box<dyn Any>
            })
        });
        assert_eq!(result, BehaviorResult::Success);
        assert_eq!(
            tree.blackboard().get::<[f32; 2]>("target_position"),
            Some(&[4.0, 3.0])
        );
    }

    #[test]
    fn in_range_fails_without_a_host_answer() {
        let mut tree = leaf_tree(TargetInRangeNode::new(5.0));
        assert_eq!(tree.tick(0.1, &mut |_| None), BehaviorResult::Fail);
        assert!(!tree.blackboard().contains("target_position"));
    }

    #[test]
    fn in_range_output_key_is_configurable() {
        let mut tree = leaf_tree(TargetInRangeNode::new(2.0).output("intruder"));
        tree.tick(0.1, &mut |msg| {
            msg.downcast_ref::<RangeQuery>()
                .map(|_| Box::new([0.5f32, 0.5]) as Box<dyn Any>)
        });
        assert!(tree.blackboard().contains("intruder"));
        assert!(!tree.blackboard().contains("target_position"));
    }

    #[test]
    fn debug_node_always_succeeds() {
        let mut tree = leaf_tree(DebugNode::default());
        assert_eq!(tree.tick(0.1, &mut |_| None), BehaviorResult::Success);
    }
}
