//! Skills: named bundles of triggers with an install lifecycle.
//!
//! A `TriggerSkill` owns an insertion-ordered mapping from event
//! channel to trigger. Installing it on a player registers every
//! trigger with the owner relation set; uninstalling removes them.
//! Install and uninstall must alternate strictly - violating that is a
//! programming error, not a recoverable condition.

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::game::Game;
use crate::triggers::{
    ActivationEffect, GameEvent, LossWatch, SkillActivation, Trigger, TriggerAction, TriggerBody,
    TriggerCondition, TriggerId, TriggerPredicate, UsageAction,
};
use crate::core::PlayerId;
use crate::ui::CardUsageVerifier;

/// Unique identifier for a skill.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SkillId(pub u32);

impl SkillId {
    /// Create a new skill ID.
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

impl std::fmt::Display for SkillId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Skill({})", self.0)
    }
}

#[derive(Clone, Debug)]
struct Installed {
    owner: PlayerId,
    ids: Vec<(GameEvent, TriggerId)>,
}

/// A named bundle of triggers installable on a player.
///
/// ## Lifecycle
///
/// ```text
/// defined --install--> installed --uninstall--> defined --install--> ...
/// ```
///
/// Double install or uninstall-without-install panics with the skill
/// name; a skill's triggers are on at most one player at a time.
pub struct TriggerSkill {
    id: SkillId,
    name: String,
    enforced: bool,
    awakening: bool,
    triggers: Vec<(GameEvent, Trigger)>,
    installed: Option<Installed>,
}

impl TriggerSkill {
    /// Define a new skill.
    #[must_use]
    pub fn new(id: SkillId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            enforced: false,
            awakening: false,
            triggers: Vec::new(),
            installed: None,
        }
    }

    /// Mark the skill as enforced: it activates without asking.
    #[must_use]
    pub fn enforced(mut self) -> Self {
        self.enforced = true;
        self
    }

    /// Mark the skill as awakening: a once-per-game transformation,
    /// activated without asking.
    #[must_use]
    pub fn awakening(mut self) -> Self {
        self.awakening = true;
        self
    }

    /// Bind a trigger to an event channel (builder pattern).
    ///
    /// Insertion order is preserved and becomes registration order on
    /// install.
    #[must_use]
    pub fn on(mut self, event: GameEvent, trigger: Trigger) -> Self {
        self.triggers.push((event, trigger));
        self
    }

    /// The skill's id.
    #[must_use]
    pub fn id(&self) -> SkillId {
        self.id
    }

    /// The skill's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the skill is enforced.
    #[must_use]
    pub fn is_enforced(&self) -> bool {
        self.enforced
    }

    /// Whether the skill is an awakening skill.
    #[must_use]
    pub fn is_awakening(&self) -> bool {
        self.awakening
    }

    /// The player this skill is currently installed on, if any.
    #[must_use]
    pub fn owner(&self) -> Option<PlayerId> {
        self.installed.as_ref().map(|i| i.owner)
    }

    // === Activation trigger constructors ===
    //
    // These bake the skill's identity and enforced/awakening flags into
    // the trigger body so the dispatcher needs no skill registry.

    /// Auto-notifying activation trigger (simple flavor).
    ///
    /// Confirmation follows the skill flags: asked unless the skill is
    /// enforced or awakening.
    #[must_use]
    pub fn activation(&self, condition: TriggerCondition, action: TriggerAction) -> Trigger {
        Trigger::new(TriggerBody::Activation(SkillActivation {
            skill: self.id,
            enforced: self.enforced,
            awakening: self.awakening,
            ask_confirmation: None,
            auto_notify: true,
            special_effect_hint: 0,
            prompt: None,
            condition,
            can_execute: None,
            effect: ActivationEffect::Simple(action),
        }))
    }

    /// Activation trigger with an executability predicate.
    #[must_use]
    pub fn activation_with_predicate(
        &self,
        condition: TriggerCondition,
        can_execute: TriggerPredicate,
        action: TriggerAction,
    ) -> Trigger {
        let mut trigger = self.activation(condition, action);
        if let TriggerBody::Activation(ref mut act) = trigger.body {
            act.can_execute = Some(can_execute);
        }
        trigger
    }

    /// Usage-collecting activation trigger.
    ///
    /// The selection ask itself implies consent, so the separate
    /// confirmation question is disabled.
    #[must_use]
    pub fn usage_activation(
        &self,
        condition: TriggerCondition,
        verifier: Rc<dyn CardUsageVerifier>,
        action: UsageAction,
    ) -> Trigger {
        Trigger::new(TriggerBody::Activation(SkillActivation {
            skill: self.id,
            enforced: self.enforced,
            awakening: self.awakening,
            ask_confirmation: Some(false),
            auto_notify: true,
            special_effect_hint: 0,
            prompt: None,
            condition,
            can_execute: None,
            effect: ActivationEffect::Usage { verifier, action },
        }))
    }

    /// Usage-collecting activation trigger with a predicate.
    #[must_use]
    pub fn usage_activation_with_predicate(
        &self,
        condition: TriggerCondition,
        can_execute: TriggerPredicate,
        verifier: Rc<dyn CardUsageVerifier>,
        action: UsageAction,
    ) -> Trigger {
        let mut trigger = self.usage_activation(condition, verifier, action);
        if let TriggerBody::Activation(ref mut act) = trigger.body {
            act.can_execute = Some(can_execute);
        }
        trigger
    }

    /// Deferred loss-watch trigger for this skill.
    ///
    /// Bind it to `PlayerSkillSetChanged` (or any arming channel); the
    /// cleanup runs exactly once, when this skill is lost by the owner.
    #[must_use]
    pub fn loss_watch(&self, cleanup: TriggerAction) -> Trigger {
        Trigger::new(TriggerBody::LossWatch(LossWatch::new(self.id, cleanup)))
    }

    // === Lifecycle ===

    /// Install the skill's triggers on a player.
    ///
    /// # Panics
    ///
    /// Panics if the triggers are already installed.
    pub fn install(&mut self, game: &mut Game, owner: PlayerId) {
        assert!(
            self.installed.is_none(),
            "triggers already installed for skill {}",
            self.name
        );

        let ids = self
            .triggers
            .iter()
            .map(|(event, trigger)| {
                (*event, game.dispatcher.register(*event, Some(owner), trigger.clone()))
            })
            .collect();

        self.installed = Some(Installed { owner, ids });
    }

    /// Uninstall the skill's triggers.
    ///
    /// # Panics
    ///
    /// Panics if the triggers are not currently installed.
    pub fn uninstall(&mut self, game: &mut Game) {
        assert!(
            self.installed.is_some(),
            "triggers not installed yet for skill {}",
            self.name
        );

        let installed = self.installed.take().expect("checked above");
        for (event, id) in installed.ids {
            game.dispatcher.unregister(event, id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skill_id() {
        let id = SkillId::new(5);
        assert_eq!(id.raw(), 5);
        assert_eq!(format!("{}", id), "Skill(5)");
    }

    #[test]
    fn test_skill_builder() {
        let skill = TriggerSkill::new(SkillId::new(1), "Ambush").enforced();

        assert_eq!(skill.id(), SkillId::new(1));
        assert_eq!(skill.name(), "Ambush");
        assert!(skill.is_enforced());
        assert!(!skill.is_awakening());
        assert_eq!(skill.owner(), None);
    }

    #[test]
    fn test_activation_carries_flags() {
        let skill = TriggerSkill::new(SkillId::new(2), "Resolve").awakening();
        let trigger = skill.activation(TriggerCondition::OwnerIsSource, Rc::new(|_, _| {}));

        let TriggerBody::Activation(act) = trigger.body else {
            panic!("expected activation body");
        };
        assert_eq!(act.skill, SkillId::new(2));
        assert!(act.awakening);
        assert!(!act.enforced);
        assert!(act.auto_notify);
        assert_eq!(act.ask_confirmation, None);
    }

    #[test]
    fn test_usage_activation_skips_confirmation() {
        use crate::ui::FreeformUsageVerifier;

        let skill = TriggerSkill::new(SkillId::new(3), "Pick");
        let trigger = skill.usage_activation(
            TriggerCondition::OwnerIsSource,
            Rc::new(FreeformUsageVerifier),
            Rc::new(|_, _, _, _| {}),
        );

        let TriggerBody::Activation(act) = trigger.body else {
            panic!("expected activation body");
        };
        assert_eq!(act.ask_confirmation, Some(false));
    }
}
