//! The game session: dispatch loop, activation protocol, skill lifecycle.
//!
//! `Game` owns the state, the dispatcher and the per-seat decision
//! proxies, and runs the whole event/trigger/decision pipeline on one
//! logical thread. Parallelism is expressed as independent sessions,
//! never as concurrent dispatch within one.
//!
//! ## Firing
//!
//! `fire` walks a stable snapshot of the registrations for the event,
//! in priority order, re-fetching each record by id so triggers removed
//! mid-fire are skipped and triggers registered mid-fire wait for the
//! next call. Actions may fire further events; the outer iteration is
//! unaffected because it holds no borrow into the table.

use std::cell::RefCell;
use std::rc::Rc;

use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::core::{GameState, PlayerId, PlayerMap};
use crate::skills::{SkillId, TriggerSkill};
use crate::triggers::{
    ActivationEffect, ArmedLoss, Dispatcher, GameEvent, GameEventArgs, LossWatch, RelayTrigger,
    SkillActivation, Trigger, TriggerBody, TriggerContext, TriggerId, ARMED_LOSS_PRIORITY,
};
use crate::ui::{
    ActionLog, CardChoiceAnswer, CardChoiceRequest, CardChoiceVerifier, CardUsageAnswer,
    CardUsageVerifier, NotificationProxy, NullNotificationProxy, Prompt, QueuedUiProxy, UiProxy,
    CHOICE_YES,
};

/// Shared handle to a seat's decision provider.
pub type SharedUiProxy = Rc<RefCell<dyn UiProxy>>;

/// Shared handle to the notification sink.
pub type SharedNotificationProxy = Rc<RefCell<dyn NotificationProxy>>;

/// One game session.
pub struct Game {
    /// Session state inspected by predicates and verifiers.
    pub state: GameState,
    /// The trigger registry.
    pub dispatcher: Dispatcher,
    proxies: PlayerMap<SharedUiProxy>,
    notifier: SharedNotificationProxy,
}

impl Game {
    /// Create a session with scripted (initially declining) proxies and
    /// a discarding notification sink.
    #[must_use]
    pub fn new(player_count: usize, seed: u64) -> Self {
        Self {
            state: GameState::new(player_count, seed),
            dispatcher: Dispatcher::new(),
            proxies: PlayerMap::new(player_count, |_| {
                Rc::new(RefCell::new(QueuedUiProxy::new())) as SharedUiProxy
            }),
            notifier: Rc::new(RefCell::new(NullNotificationProxy)),
        }
    }

    /// Replace a seat's decision provider.
    pub fn set_proxy(&mut self, player: PlayerId, proxy: SharedUiProxy) {
        self.proxies[player] = proxy;
    }

    /// Get a seat's decision provider.
    #[must_use]
    pub fn proxy(&self, player: PlayerId) -> SharedUiProxy {
        self.proxies[player].clone()
    }

    /// Replace the notification sink.
    pub fn set_notifier(&mut self, notifier: SharedNotificationProxy) {
        self.notifier = notifier;
    }

    // === Dispatch ===

    /// Fire an event: run every registered trigger in priority order.
    ///
    /// Re-entrant calls are supported; registrations changed mid-fire
    /// only affect subsequent fires.
    pub fn fire(&mut self, event: GameEvent, args: &GameEventArgs) {
        trace!(?event, source = %args.source, "fire");

        for id in self.dispatcher.snapshot(event) {
            // Re-fetch per id: a trigger unregistered by an earlier
            // action in this same fire must not run.
            let Some((owner, trigger)) = self.dispatcher.fetch(id) else {
                continue;
            };
            let ctx = TriggerContext { owner, event, args };
            self.run_trigger(id, &trigger, &ctx);
        }
    }

    fn run_trigger(&mut self, id: TriggerId, trigger: &Trigger, ctx: &TriggerContext<'_>) {
        match &trigger.body {
            TriggerBody::Relay(relay) => self.run_relay(relay, ctx),
            TriggerBody::Activation(act) => self.run_activation(act, ctx),
            TriggerBody::LossWatch(watch) => self.run_loss_watch(watch, ctx),
            TriggerBody::ArmedLoss(armed) => self.run_armed_loss(id, armed, ctx),
        }
    }

    /// The three-stage gate: condition, predicate, action.
    fn run_relay(&mut self, relay: &RelayTrigger, ctx: &TriggerContext<'_>) {
        if !relay.condition.matches(ctx.owner, ctx.args) {
            return;
        }
        if let Some(can_execute) = &relay.can_execute {
            if !can_execute(ctx, &self.state) {
                return;
            }
        }
        (relay.action)(self, ctx);
    }

    /// The skill-activation sub-protocol.
    ///
    /// Gated → Confirming → CollectingUsage → Notifying → Executing;
    /// a failed ask anywhere aborts this firing with no notification
    /// and no state change.
    fn run_activation(&mut self, act: &SkillActivation, ctx: &TriggerContext<'_>) {
        let Some(owner) = ctx.owner else {
            return;
        };
        if !act.condition.matches(Some(owner), ctx.args) {
            return;
        }
        if let Some(can_execute) = &act.can_execute {
            if !can_execute(ctx, &self.state) {
                return;
            }
        }

        let confirm = act
            .ask_confirmation
            .unwrap_or(!act.enforced && !act.awakening);
        if confirm && !self.confirm_skill_use(owner, act.skill) {
            debug!(%owner, skill = %act.skill, "skill activation declined");
            return;
        }

        match &act.effect {
            ActivationEffect::Simple(action) => {
                if act.auto_notify {
                    self.notify_skill_use(owner, &[], act.skill, act.special_effect_hint);
                }
                action(self, ctx);
            }
            ActivationEffect::Usage { verifier, action } => {
                let prompt = act
                    .prompt
                    .clone()
                    .unwrap_or_else(|| Prompt::card_usage(act.skill));
                let Some(answer) = self.ask_card_usage(owner, &prompt, verifier.as_ref()) else {
                    debug!(%owner, skill = %act.skill, "usage ask failed, aborting activation");
                    return;
                };
                debug_assert!(
                    answer.skill.is_none(),
                    "usage answer must not nest a skill"
                );
                // Notification precedes the effect so observers never
                // see the effect un-announced.
                if act.auto_notify {
                    self.notify_skill_use(owner, &answer.players, act.skill, act.special_effect_hint);
                }
                action(self, ctx, &answer.cards, &answer.players);
            }
        }
    }

    /// Arm (or re-arm against a new owner) the one-shot loss trigger.
    fn run_loss_watch(&mut self, watch: &LossWatch, ctx: &TriggerContext<'_>) {
        let Some(owner) = ctx.owner else {
            return;
        };
        if ctx.args.source != owner {
            return;
        }
        if ctx.event == GameEvent::PlayerSkillSetChanged
            && (ctx.args.is_losing_skill || !ctx.args.skills.contains(&watch.skill))
        {
            return;
        }

        if let Some((armed_id, armed_owner)) = watch.armed.get() {
            if armed_owner == owner {
                return; // already armed against this owner
            }
            // Owner was reassigned while armed: drop the stale watch.
            self.dispatcher
                .unregister(GameEvent::PlayerSkillSetChanged, armed_id);
        }

        let armed = Trigger::new(TriggerBody::ArmedLoss(ArmedLoss {
            skill: watch.skill,
            cleanup: watch.cleanup.clone(),
            armed: watch.armed.clone(),
        }))
        .with_priority(ARMED_LOSS_PRIORITY);

        let armed_id =
            self.dispatcher
                .register(GameEvent::PlayerSkillSetChanged, Some(owner), armed);
        watch.armed.set(Some((armed_id, owner)));
        trace!(skill = %watch.skill, %owner, "loss watch armed");
    }

    /// Fire the cleanup exactly once, then self-unregister.
    fn run_armed_loss(&mut self, id: TriggerId, armed: &ArmedLoss, ctx: &TriggerContext<'_>) {
        let Some(owner) = ctx.owner else {
            return;
        };
        if ctx.args.source != owner
            || !ctx.args.is_losing_skill
            || !ctx.args.skills.contains(&armed.skill)
        {
            return;
        }

        (armed.cleanup)(self, ctx);
        self.dispatcher
            .unregister(GameEvent::PlayerSkillSetChanged, id);
        if let Some((armed_id, _)) = armed.armed.get() {
            if armed_id == id {
                armed.armed.set(None);
            }
        }
        trace!(skill = %armed.skill, %owner, "loss cleanup fired");
    }

    // === Decisions ===

    /// Ask a seat's proxy for a card usage.
    pub fn ask_card_usage(
        &mut self,
        player: PlayerId,
        prompt: &Prompt,
        verifier: &dyn CardUsageVerifier,
    ) -> Option<CardUsageAnswer> {
        let proxy = self.proxies[player].clone();
        let answer = proxy.borrow_mut().ask_card_usage(&self.state, prompt, verifier);
        answer
    }

    /// Ask a seat's proxy for a card choice.
    pub fn ask_card_choice(
        &mut self,
        player: PlayerId,
        request: &CardChoiceRequest,
        verifier: &dyn CardChoiceVerifier,
    ) -> Option<CardChoiceAnswer> {
        let proxy = self.proxies[player].clone();
        let answer = proxy
            .borrow_mut()
            .ask_card_choice(&self.state, request, verifier);
        answer
    }

    /// Ask a seat's proxy a multiple-choice question.
    pub fn ask_multiple_choice(
        &mut self,
        player: PlayerId,
        prompt: &Prompt,
        options: &[Prompt],
    ) -> Option<usize> {
        let proxy = self.proxies[player].clone();
        let answer = proxy.borrow_mut().ask_multiple_choice(prompt, options);
        answer
    }

    fn confirm_skill_use(&mut self, owner: PlayerId, skill: SkillId) -> bool {
        let options = Prompt::yes_no();
        self.ask_multiple_choice(owner, &Prompt::skill_confirmation(skill), &options)
            == Some(CHOICE_YES)
    }

    /// Broadcast a skill use and append it to the history.
    pub fn notify_skill_use(
        &mut self,
        source: PlayerId,
        targets: &[PlayerId],
        skill: SkillId,
        special_effect_hint: i32,
    ) {
        let log = ActionLog {
            source,
            targets: SmallVec::from_slice(targets),
            skill,
            special_effect_hint,
        };
        self.state.record(log.clone());
        self.notifier.borrow_mut().notify_skill_use(&log);
    }

    // === Skill lifecycle ===

    /// Install a skill on a player and announce the gain.
    pub fn acquire_skill(&mut self, player: PlayerId, skill: &mut TriggerSkill) {
        skill.install(self, player);
        self.state.skill_sets[player].insert(skill.id());

        let args = GameEventArgs::skill_change(player, [skill.id()], false);
        self.fire(GameEvent::PlayerSkillSetChanged, &args);
    }

    /// Uninstall a skill and announce the loss.
    ///
    /// The skill's own triggers are removed before the loss event
    /// fires, so only the armed one-shot observes it.
    pub fn lose_skill(&mut self, player: PlayerId, skill: &mut TriggerSkill) {
        skill.uninstall(self);
        self.state.skill_sets[player].remove(&skill.id());

        let args = GameEventArgs::skill_change(player, [skill.id()], true);
        self.fire(GameEvent::PlayerSkillSetChanged, &args);
    }
}
