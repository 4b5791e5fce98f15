//! Game events and their payloads.
//!
//! A `GameEvent` names a point in the turn/action lifecycle and acts as
//! the dispatch channel key. It carries no data of its own; the payload
//! travels separately in `GameEventArgs`, which always names a source
//! player plus event-specific fields.

use serde::{Deserialize, Serialize};

use crate::core::{CardId, PlayerId};
use crate::skills::SkillId;

/// A point in the game's turn/action lifecycle.
///
/// Triggers register against one of these channels; firing an event
/// invokes every trigger registered for it in priority order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameEvent {
    /// The game is set up and about to begin.
    GameStart,
    /// A player's turn begins.
    TurnStart,
    /// Before the phase sequence of a turn starts.
    PhaseBeforeStart,
    /// The first checkpoint inside a phase.
    PhaseBeginStart,
    /// The phase's main window opens.
    PhaseStart,
    /// The phase's main effects resolve.
    PhaseProceed,
    /// The phase's main window closes.
    PhaseEnd,
    /// After the phase has fully ended.
    PhasePostEnd,
    /// A player's turn ends.
    TurnEnd,
    /// A card was used (declared, cost paid).
    CardUsed,
    /// A card took effect.
    CardPlayed,
    /// A player gained cards.
    CardsAcquired,
    /// A player lost cards.
    CardsLost,
    /// A player's skill set changed (gain or loss).
    PlayerSkillSetChanged,
    /// Damage is being inflicted.
    DamageInflicted,
    /// A player's health total changed.
    HealthChanged,
    /// A player is at the brink of death.
    PlayerDying,
    /// A player died.
    PlayerDead,
}

/// Per-event payload.
///
/// Every event names a `source` player. The remaining fields are filled
/// per event kind: skill-set-change events carry the skills involved
/// and whether they are being lost, card events carry the cards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEventArgs {
    /// The player the event originates from.
    pub source: PlayerId,

    /// Players affected by the event, if any.
    pub targets: Vec<PlayerId>,

    /// Cards involved in the event, if any.
    pub cards: Vec<CardId>,

    /// Skills involved in a skill-set-change event.
    pub skills: Vec<SkillId>,

    /// For `PlayerSkillSetChanged`: true when the skills are being lost.
    pub is_losing_skill: bool,
}

impl GameEventArgs {
    /// Create args with just a source player.
    #[must_use]
    pub fn new(source: PlayerId) -> Self {
        Self {
            source,
            targets: Vec::new(),
            cards: Vec::new(),
            skills: Vec::new(),
            is_losing_skill: false,
        }
    }

    /// Set the target players (builder pattern).
    #[must_use]
    pub fn with_targets(mut self, targets: impl IntoIterator<Item = PlayerId>) -> Self {
        self.targets = targets.into_iter().collect();
        self
    }

    /// Add a card (builder pattern).
    #[must_use]
    pub fn with_card(mut self, card: CardId) -> Self {
        self.cards.push(card);
        self
    }

    /// Payload for a skill-set-change event.
    #[must_use]
    pub fn skill_change(
        source: PlayerId,
        skills: impl IntoIterator<Item = SkillId>,
        losing: bool,
    ) -> Self {
        Self {
            source,
            targets: Vec::new(),
            cards: Vec::new(),
            skills: skills.into_iter().collect(),
            is_losing_skill: losing,
        }
    }
}
