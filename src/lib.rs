//! # relay-ccg
//!
//! A turn-based multiplayer card game engine core: a priority-ordered
//! trigger dispatch engine plus a networked decision protocol with
//! timing record/replay.
//!
//! ## Design Principles
//!
//! 1. **Data Over Subclasses**: A trigger is a priority plus one of a
//!    closed set of bodies carrying injected callbacks. Skill-specific
//!    logic never leaks into the dispatcher.
//!
//! 2. **Explicit Context**: Owner and event identity flow into every
//!    callback at fire time; callbacks never capture state that goes
//!    stale across re-registration.
//!
//! 3. **Single-Threaded Dispatch**: One session runs on one logical
//!    thread; re-entrant fires iterate stable snapshots. Parallelism is
//!    independent sessions.
//!
//! 4. **Decisions Are Fallible**: Every ask can answer "no valid
//!    answer" without panicking; the activation protocol aborts a
//!    firing cleanly on any failed ask.
//!
//! ## Modules
//!
//! - `core`: Player/card IDs, per-player maps, state, RNG
//! - `triggers`: Events, trigger bodies, the priority dispatcher
//! - `skills`: Skill identity and the install/uninstall lifecycle
//! - `ui`: Prompts, verifiers, the decision and notification interfaces
//! - `net`: Answer transport, wire codec, timing record/replay
//! - `game`: The session tying dispatch, decisions and skills together

pub mod core;
pub mod triggers;
pub mod skills;
pub mod ui;
pub mod net;
pub mod game;

// Re-export commonly used types
pub use crate::core::{CardId, DeckKind, DeckPlace, GameRng, GameState, PlayerId, PlayerMap};

pub use crate::triggers::{
    Dispatcher, GameEvent, GameEventArgs, Trigger, TriggerAction, TriggerBody, TriggerCondition,
    TriggerContext, TriggerId, TriggerPredicate,
};

pub use crate::skills::{SkillId, TriggerSkill};

pub use crate::ui::{
    ActionLog, CardChoiceAnswer, CardChoiceRequest, CardChoiceVerifier, CardUsageAnswer,
    CardUsageVerifier, NotificationProxy, Prompt, QueuedUiProxy, UiProxy, VerifierResult,
};

pub use crate::net::{
    AnswerTransport, ChannelTransport, Frame, LoopbackTransport, NetworkUiProxy, ReplayController,
    ReplayError, ReplaySync, StreamTransport,
};

pub use crate::game::{Game, SharedNotificationProxy, SharedUiProxy};
