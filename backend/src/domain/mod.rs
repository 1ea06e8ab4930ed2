//! # Domain Module
//!
//! Game rules of Bharat Money Quest.
//!
//! - [`progression`] pure profile transitions: quest outcomes, daily answers,
//!   level thresholds and badge predicates.
//! - [`daily_rotation`] which challenge is shown today and whether it was
//!   already answered.
//! - [`quest_session`] the select, reveal and finalize flow of a single quest.
//! - [`advisory`] optional tip and narration capabilities with fallbacks.
//! - [`catalog`] the static content shipped with the game.
//! - [`game_service`] orchestration of the above around the stored profile.

pub mod advisory;
pub mod catalog;
pub mod clock;
pub mod daily_rotation;
pub mod game_service;
pub mod progression;
pub mod quest_session;

pub use advisory::{AdvisoryKit, AdvisoryService, GenerativeAdvisor, Narrator, SilentNarrator, StaticAdvisor};
pub use catalog::ContentCatalog;
pub use clock::{Clock, SystemClock};
#[cfg(test)]
pub use clock::FixedClock;
pub use game_service::{GameError, GameService};
pub use progression::{Badge, Level, ProgressionEngine, RepeatRewardPolicy};
pub use quest_session::{QuestSession, QuestSessionError, SessionPhase};
