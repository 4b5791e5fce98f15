//! Skills: named trigger bundles with a strict install lifecycle.

pub mod skill;

pub use skill::{SkillId, TriggerSkill};
