//! Game session state.
//!
//! `GameState` holds the data the trigger engine and verifiers inspect:
//! hands, decks, per-player skill sets, per-player attribute values and
//! the action history. Card rules themselves live in game-specific
//! callbacks; the state only stores ids and counters.
//!
//! ## Attribute values (i64 only)
//!
//! `attributes` uses `FxHashMap<String, i64>` per player:
//! - Booleans: use 0/1
//! - Card references: use `CardId.0 as i64`
//! - Enums: use discriminant values

use im::{HashSet as ImHashSet, Vector};
use rustc_hash::FxHashMap;

use super::card::CardId;
use super::player::{PlayerId, PlayerMap};
use super::rng::GameRng;
use crate::skills::SkillId;
use crate::ui::ActionLog;

/// Complete state of one game session.
#[derive(Clone, Debug)]
pub struct GameState {
    player_count: usize,

    /// Turn number (starts at 1).
    pub turn_number: u32,

    /// Active player (whose turn it is).
    pub active_player: PlayerId,

    /// Private hands per player.
    hands: PlayerMap<Vec<CardId>>,

    /// Private draw piles per player (top = end of vec).
    decks: PlayerMap<Vec<CardId>>,

    /// Skills currently held by each player.
    pub skill_sets: PlayerMap<ImHashSet<SkillId>>,

    /// Per-player attribute values - games define the keys.
    pub attributes: PlayerMap<FxHashMap<String, i64>>,

    /// Skill invocations announced so far, oldest first.
    pub history: Vector<ActionLog>,

    /// Deterministic RNG for shuffles and deals.
    pub rng: GameRng,
}

impl GameState {
    /// Create a new game state.
    #[must_use]
    pub fn new(player_count: usize, seed: u64) -> Self {
        assert!(player_count > 0, "Must have at least 1 player");
        assert!(player_count <= 255, "At most 255 players supported");

        Self {
            player_count,
            turn_number: 1,
            active_player: PlayerId::new(0),
            hands: PlayerMap::with_default(player_count),
            decks: PlayerMap::with_default(player_count),
            skill_sets: PlayerMap::new(player_count, |_| ImHashSet::new()),
            attributes: PlayerMap::with_default(player_count),
            history: Vector::new(),
            rng: GameRng::new(seed),
        }
    }

    /// Get player count.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.player_count
    }

    /// Iterate over all player IDs.
    pub fn player_ids(&self) -> impl Iterator<Item = PlayerId> {
        PlayerId::all(self.player_count)
    }

    // === Hands ===

    /// Get a player's hand.
    #[must_use]
    pub fn hand(&self, player: PlayerId) -> &[CardId] {
        &self.hands[player]
    }

    /// Add a card to a player's hand.
    pub fn add_to_hand(&mut self, player: PlayerId, card: CardId) {
        self.hands[player].push(card);
    }

    /// Remove a card from a player's hand.
    ///
    /// Returns true if the card was found and removed.
    pub fn remove_from_hand(&mut self, player: PlayerId, card: CardId) -> bool {
        if let Some(pos) = self.hands[player].iter().position(|&c| c == card) {
            self.hands[player].remove(pos);
            true
        } else {
            false
        }
    }

    // === Decks ===

    /// Set a player's deck.
    pub fn set_deck(&mut self, player: PlayerId, deck: Vec<CardId>) {
        self.decks[player] = deck;
    }

    /// Get a player's deck.
    #[must_use]
    pub fn deck(&self, player: PlayerId) -> &[CardId] {
        &self.decks[player]
    }

    /// Draw a card from a player's deck to hand.
    ///
    /// Returns the drawn card ID, or None if the deck is empty.
    pub fn draw_card(&mut self, player: PlayerId) -> Option<CardId> {
        let card = self.decks[player].pop()?;
        self.add_to_hand(player, card);
        Some(card)
    }

    /// Shuffle a player's deck.
    pub fn shuffle_deck(&mut self, player: PlayerId) {
        let deck = std::mem::take(&mut self.decks[player]);
        let mut deck = deck;
        self.rng.shuffle(&mut deck);
        self.decks[player] = deck;
    }

    // === Skills ===

    /// Check whether a player currently holds a skill.
    #[must_use]
    pub fn has_skill(&self, player: PlayerId, skill: SkillId) -> bool {
        self.skill_sets[player].contains(&skill)
    }

    // === Attributes ===

    /// Get an attribute value with a default.
    #[must_use]
    pub fn attribute(&self, player: PlayerId, key: &str, default: i64) -> i64 {
        self.attributes[player].get(key).copied().unwrap_or(default)
    }

    /// Set an attribute value.
    pub fn set_attribute(&mut self, player: PlayerId, key: impl Into<String>, value: i64) {
        self.attributes[player].insert(key.into(), value);
    }

    /// Modify an attribute value by delta.
    pub fn modify_attribute(&mut self, player: PlayerId, key: &str, delta: i64) {
        let current = self.attribute(player, key, 0);
        self.attributes[player].insert(key.to_string(), current + delta);
    }

    // === History ===

    /// Record a skill invocation.
    pub fn record(&mut self, log: ActionLog) {
        self.history.push_back(log);
    }
}
