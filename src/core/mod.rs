//! Core types: players, cards, state, RNG.

pub mod card;
pub mod player;
pub mod rng;
pub mod state;

pub use card::{CardId, DeckKind, DeckPlace};
pub use player::{PlayerId, PlayerMap};
pub use rng::GameRng;
pub use state::GameState;
