//! Networked decision proxy.
//!
//! `NetworkUiProxy` wraps a local [`UiProxy`] and a transport. The
//! active seat collects its local answer, transmits it and announces
//! the question boundary; inactive seats still ask their local proxy
//! (keeping the UI in step) but transmit nothing. Every seat then reads
//! the authoritative answer back off the transport, so all seats
//! resolve each question identically.
//!
//! ## Wire layout
//!
//! Answers are flat integer item sequences:
//!
//! - card usage: `success, [skill_flag, skill?], card_count, cards...,
//!   player_count, players...` (failure is the single item `0`)
//! - card choice: `success, group_count, (len, cards...)*` plus one
//!   trailing option item when the request carried extra options
//! - multiple choice: `success, index`
//!
//! Prompt content is pre-shared and never retransmitted.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, trace};

use super::replay::ReplaySync;
use super::transport::AnswerTransport;
use crate::core::{CardId, GameState, PlayerId};
use crate::skills::SkillId;
use crate::ui::{
    CardChoiceAnswer, CardChoiceRequest, CardChoiceVerifier, CardUsageAnswer, CardUsageVerifier,
    NotificationProxy, Prompt, UiProxy, VerifierResult,
};

const ANSWER_FAILED: i64 = 0;
const ANSWER_OK: i64 = 1;

// === Wire codec ===

/// Encode a card-usage answer (or a failure marker) as one frame.
pub fn encode_usage_answer<T: AnswerTransport>(
    transport: &mut T,
    answer: Option<&CardUsageAnswer>,
) {
    transport.begin_answer();
    let Some(answer) = answer else {
        transport.push_item(ANSWER_FAILED);
        transport.flush();
        return;
    };

    transport.push_item(ANSWER_OK);
    match answer.skill {
        Some(skill) => {
            transport.push_item(1);
            transport.push_item(i64::from(skill.raw()));
        }
        None => transport.push_item(0),
    }
    transport.push_item(answer.cards.len() as i64);
    for card in &answer.cards {
        transport.push_item(i64::from(card.raw()));
    }
    transport.push_item(answer.players.len() as i64);
    for player in &answer.players {
        transport.push_item(i64::from(player.index() as u32));
    }
    transport.flush();
}

/// Decode a card-usage answer; `None` on failure marker, malformed
/// items or disconnect.
pub fn decode_usage_answer<T: AnswerTransport>(transport: &mut T) -> Option<CardUsageAnswer> {
    if transport.next_item()? != ANSWER_OK {
        return None;
    }

    let skill = match transport.next_item()? {
        0 => None,
        _ => Some(SkillId::new(u32::try_from(transport.next_item()?).ok()?)),
    };

    let card_count = usize::try_from(transport.next_item()?).ok()?;
    let mut cards = Vec::with_capacity(card_count);
    for _ in 0..card_count {
        cards.push(CardId::new(u32::try_from(transport.next_item()?).ok()?));
    }

    let player_count = usize::try_from(transport.next_item()?).ok()?;
    let mut players = Vec::with_capacity(player_count);
    for _ in 0..player_count {
        players.push(PlayerId::new(u8::try_from(transport.next_item()?).ok()?));
    }

    Some(CardUsageAnswer {
        skill,
        cards,
        players,
    })
}

/// Encode a card-choice answer. `has_option` must match the request's
/// `options` on both ends.
pub fn encode_choice_answer<T: AnswerTransport>(
    transport: &mut T,
    answer: Option<&CardChoiceAnswer>,
    has_option: bool,
) {
    transport.begin_answer();
    let Some(answer) = answer else {
        transport.push_item(ANSWER_FAILED);
        transport.flush();
        return;
    };

    transport.push_item(ANSWER_OK);
    transport.push_item(answer.groups.len() as i64);
    for group in &answer.groups {
        transport.push_item(group.len() as i64);
        for card in group {
            transport.push_item(i64::from(card.raw()));
        }
    }
    if has_option {
        transport.push_item(answer.option_result.unwrap_or(0));
    }
    transport.flush();
}

/// Decode a card-choice answer.
pub fn decode_choice_answer<T: AnswerTransport>(
    transport: &mut T,
    has_option: bool,
) -> Option<CardChoiceAnswer> {
    if transport.next_item()? != ANSWER_OK {
        return None;
    }

    let group_count = usize::try_from(transport.next_item()?).ok()?;
    let mut groups = Vec::with_capacity(group_count);
    for _ in 0..group_count {
        let len = usize::try_from(transport.next_item()?).ok()?;
        let mut group = Vec::with_capacity(len);
        for _ in 0..len {
            group.push(CardId::new(u32::try_from(transport.next_item()?).ok()?));
        }
        groups.push(group);
    }

    let option_result = if has_option {
        Some(transport.next_item()?)
    } else {
        None
    };

    Some(CardChoiceAnswer {
        groups,
        option_result,
    })
}

/// Encode a multiple-choice answer.
pub fn encode_multi_answer<T: AnswerTransport>(transport: &mut T, answer: Option<usize>) {
    transport.begin_answer();
    match answer {
        Some(index) => {
            transport.push_item(ANSWER_OK);
            transport.push_item(index as i64);
        }
        None => transport.push_item(ANSWER_FAILED),
    }
    transport.flush();
}

/// Decode a multiple-choice answer.
pub fn decode_multi_answer<T: AnswerTransport>(transport: &mut T) -> Option<usize> {
    if transport.next_item()? != ANSWER_OK {
        return None;
    }
    usize::try_from(transport.next_item()?).ok()
}

// === The proxy ===

/// Decision proxy for a networked seat.
pub struct NetworkUiProxy<P, T> {
    inner: P,
    transport: T,
    host: PlayerId,
    active: bool,
    sync: ReplaySync<'static>,
    strict: bool,
    timeout_seconds: u32,
    notifier: Option<Rc<RefCell<dyn NotificationProxy>>>,
}

impl<P: UiProxy, T: AnswerTransport> NetworkUiProxy<P, T> {
    /// Wrap a local proxy for the seat `host`. Starts active, lenient,
    /// with timing sync off.
    #[must_use]
    pub fn new(inner: P, transport: T, host: PlayerId) -> Self {
        Self {
            inner,
            transport,
            host,
            active: true,
            sync: ReplaySync::Off,
            strict: false,
            timeout_seconds: 0,
            notifier: None,
        }
    }

    /// Set the timing mode (builder pattern).
    #[must_use]
    pub fn with_sync(mut self, sync: ReplaySync<'static>) -> Self {
        self.sync = sync;
        self
    }

    /// Enable strict verification: a remote answer failing the
    /// question's verifier is a contract violation (builder pattern).
    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Attach a notification sink for choice results (builder pattern).
    #[must_use]
    pub fn with_notifier(mut self, notifier: Rc<RefCell<dyn NotificationProxy>>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Mark this seat as the one whose answers are authoritative.
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Whether this seat currently transmits its answers.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Unwrap back into the local proxy and transport.
    pub fn into_inner(self) -> (P, T) {
        (self.inner, self.transport)
    }

    /// Pace the question (record or replay timing) and, on the active
    /// seat, announce the boundary.
    fn sync_question(&mut self) {
        self.sync.pace_question();
        if self.active {
            self.transport.advance_question();
        }
    }
}

impl<P: UiProxy, T: AnswerTransport> UiProxy for NetworkUiProxy<P, T> {
    fn ask_card_usage(
        &mut self,
        state: &GameState,
        prompt: &Prompt,
        verifier: &dyn CardUsageVerifier,
    ) -> Option<CardUsageAnswer> {
        // Inactive seats still ask locally so the UI tracks the
        // question, but their answer never reaches the wire.
        let local = self.inner.ask_card_usage(state, prompt, verifier);
        if self.active {
            encode_usage_answer(&mut self.transport, local.as_ref());
        }
        self.sync_question();

        let answer = decode_usage_answer(&mut self.transport);
        self.inner.freeze();

        if self.strict {
            if let Some(answer) = &answer {
                let result =
                    verifier.verify(state, self.host, answer.skill, &answer.cards, &answer.players);
                assert!(
                    result == VerifierResult::Success,
                    "remote card usage answer failed verification"
                );
            }
        }
        trace!(host = %self.host, ok = answer.is_some(), "card usage resolved");
        answer
    }

    fn ask_card_choice(
        &mut self,
        state: &GameState,
        request: &CardChoiceRequest,
        verifier: &dyn CardChoiceVerifier,
    ) -> Option<CardChoiceAnswer> {
        let has_option = request.options.is_some();

        let local = self.inner.ask_card_choice(state, request, verifier);
        if self.active {
            encode_choice_answer(&mut self.transport, local.as_ref(), has_option);
        }
        self.sync_question();

        let answer = decode_choice_answer(&mut self.transport, has_option);
        self.inner.freeze();

        if self.strict {
            if let Some(answer) = &answer {
                assert!(
                    verifier.verify(&answer.groups) == VerifierResult::Success,
                    "remote card choice answer failed verification"
                );
            }
        }
        trace!(host = %self.host, ok = answer.is_some(), "card choice resolved");
        answer
    }

    fn ask_multiple_choice(&mut self, prompt: &Prompt, options: &[Prompt]) -> Option<usize> {
        let local = self.inner.ask_multiple_choice(prompt, options);
        if self.active {
            encode_multi_answer(&mut self.transport, local);
        }
        self.sync_question();

        let answer = decode_multi_answer(&mut self.transport);
        self.inner.freeze();

        // The result is announced whether or not the ask succeeded; a
        // failed ask defaults to the first option.
        if let Some(notifier) = &self.notifier {
            if let Some(option) = options.get(answer.unwrap_or(0)) {
                notifier
                    .borrow_mut()
                    .notify_multiple_choice_result(self.host, option);
            }
        }
        if answer.is_none() {
            debug!(host = %self.host, key = %prompt.key, "multiple choice defaulted");
        }
        answer
    }

    fn freeze(&mut self) {
        self.inner.freeze();
    }

    fn timeout_seconds(&self) -> u32 {
        self.timeout_seconds
    }

    fn set_timeout_seconds(&mut self, seconds: u32) {
        self.timeout_seconds = seconds;
        self.inner.set_timeout_seconds(seconds);
    }
}
