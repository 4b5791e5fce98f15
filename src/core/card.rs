//! Card identity and deck addressing.
//!
//! The engine does not hold card rules - cards are opaque ids whose
//! meaning lives in game-specific code and verifiers. `DeckPlace`
//! addresses a pile of cards for the card-choice ask: a deck kind plus
//! an optional owning player (global piles like a shared discard have
//! no owner).

use serde::{Deserialize, Serialize};

use super::player::PlayerId;

/// Unique identifier for a card in a game session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardId(pub u32);

impl CardId {
    /// Create a new card ID.
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

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Card({})", self.0)
    }
}

/// The kinds of piles a card can live in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeckKind {
    /// A player's hand.
    Hand,
    /// A player's draw pile.
    Library,
    /// Face-up discard pile.
    Discard,
    /// Cards equipped in front of a player.
    Equipment,
}

/// Address of a pile of cards.
///
/// Used as the source-deck designator in card-choice requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeckPlace {
    /// Owning player, or `None` for shared piles.
    pub player: Option<PlayerId>,
    /// Which pile.
    pub deck: DeckKind,
}

impl DeckPlace {
    /// Address a player-owned pile.
    #[must_use]
    pub const fn of(player: PlayerId, deck: DeckKind) -> Self {
        Self {
            player: Some(player),
            deck,
        }
    }

    /// Address a shared pile.
    #[must_use]
    pub const fn shared(deck: DeckKind) -> Self {
        Self { player: None, deck }
    }
}
