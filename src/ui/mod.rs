//! Decision interface: prompts, verifiers, proxies.

pub mod prompt;
pub mod proxy;
pub mod verifier;

pub use prompt::{Prompt, CHOICE_NO, CHOICE_YES};
pub use proxy::{
    ActionLog, CardChoiceAnswer, CardChoiceRequest, CardUsageAnswer, MemoryNotificationProxy,
    NotificationProxy, NullNotificationProxy, QueuedUiProxy, UiProxy,
};
pub use verifier::{
    CardChoiceVerifier, CardUsageVerifier, FreeformUsageVerifier, GroupSizeChoiceVerifier,
    HandCardUsageVerifier, VerifierResult,
};
