//! The atomic reactive unit.
//!
//! A `Trigger` is data, not a subclass: a priority plus one of a small
//! closed set of bodies. Skill-specific logic lives entirely in the
//! callbacks a body carries; the dispatcher never needs to know which
//! skill built a trigger.
//!
//! Every body preserves the three-stage gate: condition (cheap, by
//! event identity/ownership) → predicate (may inspect game state) →
//! action. The condition is a data enum so the gate stays inspectable;
//! predicate and action are `Rc` function values receiving the owner
//! and event context explicitly, never capturing it.

use std::cell::Cell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::event::{GameEvent, GameEventArgs};
use crate::core::{CardId, GameState, PlayerId};
use crate::game::Game;
use crate::skills::SkillId;
use crate::ui::{CardUsageVerifier, Prompt};

/// Unique identifier for a registered trigger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TriggerId(pub u32);

impl TriggerId {
    /// Create a new trigger ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for TriggerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Trigger({})", self.0)
    }
}

/// Priority of the armed one-shot loss trigger.
///
/// Runs after every ordinary trigger so it observes the final
/// post-change state.
pub const ARMED_LOSS_PRIORITY: i32 = i32::MIN;

/// The cheap ownership gate checked before anything else runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerCondition {
    /// Fire regardless of who the event is about.
    Global,
    /// Fire only when the trigger's owner is the event source.
    OwnerIsSource,
    /// Fire only when the trigger's owner is among the targets.
    OwnerIsTarget,
}

impl TriggerCondition {
    /// Evaluate the gate for a trigger owned by `owner`.
    #[must_use]
    pub fn matches(self, owner: Option<PlayerId>, args: &GameEventArgs) -> bool {
        match self {
            TriggerCondition::Global => true,
            TriggerCondition::OwnerIsSource => owner == Some(args.source),
            TriggerCondition::OwnerIsTarget => {
                owner.is_some_and(|o| args.targets.contains(&o))
            }
        }
    }
}

/// Event context handed to predicates and actions.
///
/// Owner and skill identity are passed explicitly so callbacks never
/// capture state that goes stale across re-registration.
pub struct TriggerContext<'a> {
    /// The owner relation at fire time, if any.
    pub owner: Option<PlayerId>,
    /// The event channel that fired.
    pub event: GameEvent,
    /// The event payload.
    pub args: &'a GameEventArgs,
}

/// Executability check: may inspect game state (hand size, attributes).
pub type TriggerPredicate = Rc<dyn Fn(&TriggerContext<'_>, &GameState) -> bool>;

/// The effect of a trigger. May ask decisions, mutate state and fire
/// further events (re-entrant dispatch).
pub type TriggerAction = Rc<dyn Fn(&mut Game, &TriggerContext<'_>)>;

/// Effect of a usage-collecting trigger, receiving the chosen cards
/// and players.
pub type UsageAction = Rc<dyn Fn(&mut Game, &TriggerContext<'_>, &[CardId], &[PlayerId])>;

/// A generic trigger built from injected callbacks.
///
/// Covers both the plain trigger (no predicate) and the
/// relay-with-predicate variant; no per-skill subtypes exist.
#[derive(Clone)]
pub struct RelayTrigger {
    /// Cheap ownership gate.
    pub condition: TriggerCondition,
    /// Optional executability check, run after the condition.
    pub can_execute: Option<TriggerPredicate>,
    /// The effect.
    pub action: TriggerAction,
}

impl RelayTrigger {
    /// Plain trigger: condition then action, no predicate.
    pub fn new(action: TriggerAction, condition: TriggerCondition) -> Self {
        Self {
            condition,
            can_execute: None,
            action,
        }
    }

    /// Relay trigger with an executability predicate.
    pub fn with_predicate(
        can_execute: TriggerPredicate,
        action: TriggerAction,
        condition: TriggerCondition,
    ) -> Self {
        Self {
            condition,
            can_execute: Some(can_execute),
            action,
        }
    }
}

/// Effect flavor of a skill-activation trigger.
#[derive(Clone)]
pub enum ActivationEffect {
    /// Execute directly after confirmation/notification.
    Simple(TriggerAction),
    /// Collect a card/player selection first, then execute with it.
    Usage {
        /// Validates the collected selection.
        verifier: Rc<dyn CardUsageVerifier>,
        /// Receives the validated cards and players.
        action: UsageAction,
    },
}

/// A trigger wrapping the skill-activation sub-protocol.
///
/// Runs the three-stage gate, then confirmation, then (for the usage
/// flavor) selection collection, then the usage notification, then the
/// effect. A failed ask at any step aborts this firing only.
#[derive(Clone)]
pub struct SkillActivation {
    /// The skill this trigger activates.
    pub skill: SkillId,
    /// Enforced skills activate without asking.
    pub enforced: bool,
    /// Awakening skills activate without asking.
    pub awakening: bool,
    /// Tri-state confirmation override: `Some(true)` always asks,
    /// `Some(false)` never asks, `None` asks unless enforced/awakening.
    pub ask_confirmation: Option<bool>,
    /// Broadcast an `ActionLog` before executing the effect.
    pub auto_notify: bool,
    /// Hint index forwarded in the notification.
    pub special_effect_hint: i32,
    /// Prompt for the selection ask; defaults to the skill's usage prompt.
    pub prompt: Option<Prompt>,
    /// Cheap ownership gate.
    pub condition: TriggerCondition,
    /// Optional executability check.
    pub can_execute: Option<TriggerPredicate>,
    /// What to run once the protocol completes.
    pub effect: ActivationEffect,
}

/// Shared arming state of a deferred loss trigger.
///
/// Holds the armed one-shot's registration id and the owner it was
/// armed against, so re-arming can drop a stale registration.
pub(crate) type ArmedState = Rc<Cell<Option<(TriggerId, PlayerId)>>>;

/// Skill-scoped deferred trigger: arms a one-shot on skill gain.
#[derive(Clone)]
pub struct LossWatch {
    /// The skill whose loss is being watched.
    pub skill: SkillId,
    /// Runs exactly once when the loss event arrives.
    pub cleanup: TriggerAction,
    pub(crate) armed: ArmedState,
}

impl LossWatch {
    /// Create a loss watch for `skill`.
    pub fn new(skill: SkillId, cleanup: TriggerAction) -> Self {
        Self {
            skill,
            cleanup,
            armed: Rc::new(Cell::new(None)),
        }
    }
}

/// The armed one-shot registered by a `LossWatch`.
///
/// Unregisters itself after its first firing.
#[derive(Clone)]
pub struct ArmedLoss {
    /// The skill whose loss fires the cleanup.
    pub skill: SkillId,
    /// The cleanup action, run exactly once.
    pub cleanup: TriggerAction,
    pub(crate) armed: ArmedState,
}

/// One of the closed set of trigger bodies.
#[derive(Clone)]
pub enum TriggerBody {
    /// Plain or relay-with-predicate trigger.
    Relay(RelayTrigger),
    /// Skill-activation sub-protocol.
    Activation(SkillActivation),
    /// Deferred arming trigger for skill loss.
    LossWatch(LossWatch),
    /// The armed one-shot itself.
    ArmedLoss(ArmedLoss),
}

impl TriggerBody {
    fn kind(&self) -> &'static str {
        match self {
            TriggerBody::Relay(_) => "Relay",
            TriggerBody::Activation(_) => "Activation",
            TriggerBody::LossWatch(_) => "LossWatch",
            TriggerBody::ArmedLoss(_) => "ArmedLoss",
        }
    }
}

/// A priority plus a body. The owner relation lives in the dispatcher,
/// not here.
#[derive(Clone)]
pub struct Trigger {
    /// Higher runs first; ties break by registration order.
    pub priority: i32,
    /// What the trigger does when run.
    pub body: TriggerBody,
}

impl Trigger {
    /// Create a trigger with default priority 0.
    #[must_use]
    pub fn new(body: TriggerBody) -> Self {
        Self { priority: 0, body }
    }

    /// Shorthand for a plain relay trigger.
    #[must_use]
    pub fn relay(action: TriggerAction, condition: TriggerCondition) -> Self {
        Self::new(TriggerBody::Relay(RelayTrigger::new(action, condition)))
    }

    /// Set priority (builder pattern). Higher priority fires first.
    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

impl std::fmt::Debug for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Trigger")
            .field("priority", &self.priority)
            .field("body", &self.body.kind())
            .finish()
    }
}
