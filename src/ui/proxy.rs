//! The decision interface and its answer types.
//!
//! `UiProxy` is the boundary a trigger calls into to obtain a player's
//! choice, decoupled from how the choice is produced: local input, a
//! scripted AI seat ([`QueuedUiProxy`]) or the network
//! ([`crate::net::NetworkUiProxy`]). Every ask can answer "no valid
//! answer" as `None` without panicking.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::prompt::Prompt;
use super::verifier::{CardChoiceVerifier, CardUsageVerifier};
use crate::core::{CardId, DeckPlace, GameState, PlayerId};
use crate::skills::SkillId;

/// Record of a skill invocation, broadcast to observers before the
/// effect resolves.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionLog {
    /// The player invoking the skill.
    pub source: PlayerId,
    /// The players targeted, if any.
    pub targets: SmallVec<[PlayerId; 2]>,
    /// Which skill.
    pub skill: SkillId,
    /// Optional special-effect index for presentation.
    pub special_effect_hint: i32,
}

/// Answer to a card-usage question.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardUsageAnswer {
    /// Skill chosen to answer with, if any.
    pub skill: Option<SkillId>,
    /// Selected cards.
    pub cards: Vec<CardId>,
    /// Selected players.
    pub players: Vec<PlayerId>,
}

/// Answer to a card-choice question.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardChoiceAnswer {
    /// One group of cards per result deck.
    pub groups: Vec<Vec<CardId>>,
    /// Result of the extra option question, when one was offered.
    pub option_result: Option<i64>,
}

/// A card-choice question: rearrange cards from source piles into
/// named result piles with per-pile maxima.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardChoiceRequest {
    /// What is being asked.
    pub prompt: Prompt,
    /// Piles the cards come from.
    pub source_decks: Vec<DeckPlace>,
    /// Names of the result piles.
    pub result_deck_names: Vec<String>,
    /// Maximum cards per result pile.
    pub result_deck_maxima: Vec<usize>,
    /// Extra option labels, answered alongside the selection.
    pub options: Option<Vec<Prompt>>,
}

/// The decision interface.
///
/// All three asks block until an answer, a definitive failure or a
/// timeout is observed; `None` means "no valid answer" and is always a
/// recoverable outcome.
pub trait UiProxy {
    /// Ask for a card usage: optional skill, cards, players.
    fn ask_card_usage(
        &mut self,
        state: &GameState,
        prompt: &Prompt,
        verifier: &dyn CardUsageVerifier,
    ) -> Option<CardUsageAnswer>;

    /// Ask for a card choice: groups of cards per result pile.
    fn ask_card_choice(
        &mut self,
        state: &GameState,
        request: &CardChoiceRequest,
        verifier: &dyn CardChoiceVerifier,
    ) -> Option<CardChoiceAnswer>;

    /// Ask a multiple-choice question; returns the chosen option index.
    fn ask_multiple_choice(&mut self, prompt: &Prompt, options: &[Prompt]) -> Option<usize>;

    /// Close out the current question in the UI (end of a question's
    /// lifetime, not an error).
    fn freeze(&mut self) {}

    /// Seconds a question may stay open.
    fn timeout_seconds(&self) -> u32;

    /// Set the question timeout.
    fn set_timeout_seconds(&mut self, seconds: u32);
}

/// Observer notifications emitted by the engine.
pub trait NotificationProxy {
    /// A skill is being used; sent before the effect resolves.
    fn notify_skill_use(&mut self, log: &ActionLog);

    /// A multiple-choice question was resolved (or defaulted).
    fn notify_multiple_choice_result(&mut self, player: PlayerId, option: &Prompt);
}

/// Notification sink that discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullNotificationProxy;

impl NotificationProxy for NullNotificationProxy {
    fn notify_skill_use(&mut self, _log: &ActionLog) {}

    fn notify_multiple_choice_result(&mut self, _player: PlayerId, _option: &Prompt) {}
}

/// Notification sink that remembers everything, for assertions.
#[derive(Clone, Debug, Default)]
pub struct MemoryNotificationProxy {
    /// Skill-use notifications in arrival order.
    pub skill_logs: Vec<ActionLog>,
    /// Multiple-choice results in arrival order.
    pub choice_results: Vec<(PlayerId, Prompt)>,
}

impl NotificationProxy for MemoryNotificationProxy {
    fn notify_skill_use(&mut self, log: &ActionLog) {
        self.skill_logs.push(log.clone());
    }

    fn notify_multiple_choice_result(&mut self, player: PlayerId, option: &Prompt) {
        self.choice_results.push((player, option.clone()));
    }
}

/// Scripted decision provider.
///
/// Answers are queued ahead of time and popped per ask; an empty queue
/// answers `None`. This is the local provider for AI seats and tests.
#[derive(Default)]
pub struct QueuedUiProxy {
    usage: VecDeque<Option<CardUsageAnswer>>,
    choice: VecDeque<Option<CardChoiceAnswer>>,
    multi: VecDeque<Option<usize>>,
    timeout_seconds: u32,
    /// Number of freeze calls observed.
    pub frozen: u32,
}

impl QueuedUiProxy {
    /// Create an empty proxy (declines every question).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a card-usage answer (`None` = decline).
    pub fn push_usage(&mut self, answer: Option<CardUsageAnswer>) {
        self.usage.push_back(answer);
    }

    /// Queue a card-choice answer (`None` = decline).
    pub fn push_choice(&mut self, answer: Option<CardChoiceAnswer>) {
        self.choice.push_back(answer);
    }

    /// Queue a multiple-choice answer (`None` = decline).
    pub fn push_multi(&mut self, answer: Option<usize>) {
        self.multi.push_back(answer);
    }
}

impl UiProxy for QueuedUiProxy {
    fn ask_card_usage(
        &mut self,
        _state: &GameState,
        _prompt: &Prompt,
        _verifier: &dyn CardUsageVerifier,
    ) -> Option<CardUsageAnswer> {
        self.usage.pop_front().flatten()
    }

    fn ask_card_choice(
        &mut self,
        _state: &GameState,
        _request: &CardChoiceRequest,
        _verifier: &dyn CardChoiceVerifier,
    ) -> Option<CardChoiceAnswer> {
        self.choice.pop_front().flatten()
    }

    fn ask_multiple_choice(&mut self, _prompt: &Prompt, _options: &[Prompt]) -> Option<usize> {
        self.multi.pop_front().flatten()
    }

    fn freeze(&mut self) {
        self.frozen += 1;
    }

    fn timeout_seconds(&self) -> u32 {
        self.timeout_seconds
    }

    fn set_timeout_seconds(&mut self, seconds: u32) {
        self.timeout_seconds = seconds;
    }
}
