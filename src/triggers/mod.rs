//! Event-driven trigger system.
//!
//! Independently-authored skills react to game events without central
//! coordination: each registers triggers into the [`Dispatcher`], which
//! fires them in priority order when an event occurs. See
//! [`crate::game::Game::fire`] for the dispatch loop itself.

pub mod dispatcher;
pub mod event;
pub mod trigger;

pub use dispatcher::{Dispatcher, TriggerRecord};
pub use event::{GameEvent, GameEventArgs};
pub use trigger::{
    ActivationEffect, ArmedLoss, LossWatch, RelayTrigger, SkillActivation, Trigger, TriggerAction,
    TriggerBody, TriggerCondition, TriggerContext, TriggerId, TriggerPredicate, UsageAction,
    ARMED_LOSS_PRIORITY,
};
