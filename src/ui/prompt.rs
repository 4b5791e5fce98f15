//! Prompts: what a question is about.
//!
//! A prompt is a translation key plus arguments; the engine never
//! renders it, UI collaborators do. Prompt content is pre-shared, so
//! the wire protocol never retransmits it.

use serde::{Deserialize, Serialize};

use crate::skills::SkillId;

/// Index of the "no" option in a yes/no question.
pub const CHOICE_NO: usize = 0;
/// Index of the "yes" option in a yes/no question.
pub const CHOICE_YES: usize = 1;

/// A question or option label, as key + arguments.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    /// Translation key.
    pub key: String,
    /// Substitution arguments.
    pub args: Vec<String>,
}

impl Prompt {
    /// Create a prompt with no arguments.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            args: Vec::new(),
        }
    }

    /// Add a substitution argument (builder pattern).
    #[must_use]
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// The yes/no question asked before activating a skill.
    #[must_use]
    pub fn skill_confirmation(skill: SkillId) -> Self {
        Self::new("skill.use.confirm").with_arg(skill.to_string())
    }

    /// The selection prompt of a usage-collecting skill trigger.
    #[must_use]
    pub fn card_usage(skill: SkillId) -> Self {
        Self::new("skill.use.cards").with_arg(skill.to_string())
    }

    /// The standard yes/no option pair; "yes" is index [`CHOICE_YES`].
    #[must_use]
    pub fn yes_no() -> Vec<Prompt> {
        vec![Self::new("choice.no"), Self::new("choice.yes")]
    }
}
