//! Answer verification.
//!
//! A verifier is a capability object validating a candidate answer
//! against game-state constraints. The asking side supplies one with
//! every question; every accepted answer must pass it (locally always,
//! remotely in strict mode).

use crate::core::{CardId, GameState, PlayerId};
use crate::skills::SkillId;

/// Outcome of verifying a candidate answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VerifierResult {
    /// The answer is complete and valid.
    Success,
    /// The answer is a valid prefix but incomplete.
    Partial,
    /// The answer is invalid.
    Fail,
}

/// Validates a card-usage answer: optional skill, cards, players.
pub trait CardUsageVerifier {
    /// Verify a candidate answer from `source`.
    fn verify(
        &self,
        state: &GameState,
        source: PlayerId,
        skill: Option<SkillId>,
        cards: &[CardId],
        players: &[PlayerId],
    ) -> VerifierResult;
}

/// Validates a card-choice answer: groups of cards.
pub trait CardChoiceVerifier {
    /// Verify the grouped selection.
    fn verify(&self, groups: &[Vec<CardId>]) -> VerifierResult;
}

/// Accepts any answer. Used by skills whose effect needs no selection
/// constraints of its own.
pub struct FreeformUsageVerifier;

impl CardUsageVerifier for FreeformUsageVerifier {
    fn verify(
        &self,
        _state: &GameState,
        _source: PlayerId,
        _skill: Option<SkillId>,
        _cards: &[CardId],
        _players: &[PlayerId],
    ) -> VerifierResult {
        VerifierResult::Success
    }
}

/// Bounds-checked usage verifier over the asker's hand.
///
/// Requires no nested skill, `min_cards..=max_cards` cards all present
/// in the source player's hand, and `min_players..=max_players` valid
/// target seats.
pub struct HandCardUsageVerifier {
    /// Minimum number of cards.
    pub min_cards: usize,
    /// Maximum number of cards.
    pub max_cards: usize,
    /// Minimum number of target players.
    pub min_players: usize,
    /// Maximum number of target players.
    pub max_players: usize,
}

impl HandCardUsageVerifier {
    /// Verifier requiring exactly `cards` cards and no targets.
    #[must_use]
    pub fn cards_only(cards: usize) -> Self {
        Self {
            min_cards: cards,
            max_cards: cards,
            min_players: 0,
            max_players: 0,
        }
    }
}

impl CardUsageVerifier for HandCardUsageVerifier {
    fn verify(
        &self,
        state: &GameState,
        source: PlayerId,
        skill: Option<SkillId>,
        cards: &[CardId],
        players: &[PlayerId],
    ) -> VerifierResult {
        if skill.is_some() {
            return VerifierResult::Fail;
        }
        if cards.len() > self.max_cards || players.len() > self.max_players {
            return VerifierResult::Fail;
        }

        let hand = state.hand(source);
        if cards.iter().any(|c| !hand.contains(c)) {
            return VerifierResult::Fail;
        }
        if players
            .iter()
            .any(|p| p.index() >= state.player_count())
        {
            return VerifierResult::Fail;
        }

        if cards.len() < self.min_cards || players.len() < self.min_players {
            return VerifierResult::Partial;
        }
        VerifierResult::Success
    }
}

/// Choice verifier enforcing per-group maxima.
pub struct GroupSizeChoiceVerifier {
    /// Maximum cards per result group; also fixes the group count.
    pub maxima: Vec<usize>,
}

impl CardChoiceVerifier for GroupSizeChoiceVerifier {
    fn verify(&self, groups: &[Vec<CardId>]) -> VerifierResult {
        if groups.len() > self.maxima.len() {
            return VerifierResult::Fail;
        }
        if groups
            .iter()
            .zip(&self.maxima)
            .any(|(group, &max)| group.len() > max)
        {
            return VerifierResult::Fail;
        }
        if groups.len() < self.maxima.len() {
            return VerifierResult::Partial;
        }
        VerifierResult::Success
    }
}
