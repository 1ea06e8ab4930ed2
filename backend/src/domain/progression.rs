//! Progression engine: how a profile evolves after quest and daily outcomes.
//!
//! Both transitions are pure. They take the current profile by reference and
//! return the next one; persisting it is the caller's job.
//!
//! ## Rules
//!
//! - `xp` and `coins` never decrease; negative deltas are ignored
//! - `health_score` is clamped to `[0, 100]` whenever a delta is applied
//! - `level` is recomputed from `xp` on every transition
//! - badges and completed quests only ever grow

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shared::{DailyChallenge, QuestChoice, UserProfile};
use std::collections::BTreeSet;
use std::fmt;
use tracing::{debug, info};

use super::catalog::ContentCatalog;
use super::daily_rotation::day_stamp;

pub use shared::MAX_HEALTH;
/// XP granted for a wrong daily answer
pub const DAILY_CONSOLATION_XP: u32 = 5;
/// Coins granted for a correct daily answer
pub const DAILY_CORRECT_COINS: u32 = 20;

/// Display level derived from accumulated xp
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    BeginnerSaver,
    FinanceExplorer,
    WealthBuilder,
    BharatMoneyChampion,
}

impl Level {
    /// Evaluated low to high; the last threshold exceeded wins
    const THRESHOLDS: [(u32, Level); 3] = [
        (500, Level::FinanceExplorer),
        (1000, Level::WealthBuilder),
        (2500, Level::BharatMoneyChampion),
    ];

    pub fn for_xp(xp: u32) -> Level {
        let mut level = Level::BeginnerSaver;
        for (threshold, candidate) in Self::THRESHOLDS {
            if xp > threshold {
                level = candidate;
            }
        }
        level
    }

    pub fn label(&self) -> &'static str {
        match self {
            Level::BeginnerSaver => "Beginner Saver",
            Level::FinanceExplorer => "Finance Explorer",
            Level::WealthBuilder => "Wealth Builder",
            Level::BharatMoneyChampion => "Bharat Money Champion",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Badge {
    BudgetHero,
    SavingsStreak,
    FraudProtector,
    SmartInvestor,
}

impl Badge {
    pub const ALL: [Badge; 4] = [
        Badge::BudgetHero,
        Badge::SavingsStreak,
        Badge::FraudProtector,
        Badge::SmartInvestor,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Badge::BudgetHero => "Budget Hero",
            Badge::SavingsStreak => "Savings Streak",
            Badge::FraudProtector => "Fraud Protector",
            Badge::SmartInvestor => "Smart Investor",
        }
    }

    /// Unlock predicate, checked against the post-transition profile.
    ///
    /// `catalog_completed` counts only completed ids the current catalog
    /// still contains.
    pub fn is_earned(&self, profile: &UserProfile, catalog_completed: usize, total_quests: usize) -> bool {
        match self {
            Badge::BudgetHero => !profile.completed_quests.is_empty(),
            Badge::SavingsStreak => profile.xp >= 500,
            Badge::FraudProtector => profile.health_score >= 90,
            Badge::SmartInvestor => catalog_completed >= total_quests,
        }
    }
}

impl fmt::Display for Badge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What happens when a quest that is already completed is finalized again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepeatRewardPolicy {
    /// Apply the choice's rewards again
    #[default]
    Regrant,
    /// Replays are recorded but grant nothing
    CompletionOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DailyVerdict {
    Correct,
    Incorrect,
    /// Today's challenge was already answered, nothing changed
    AlreadyAnswered,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailyOutcome {
    pub profile: UserProfile,
    pub verdict: DailyVerdict,
    pub xp_gained: u32,
    pub coins_gained: u32,
}

impl DailyOutcome {
    pub fn is_correct(&self) -> bool {
        self.verdict == DailyVerdict::Correct
    }
}

/// Clamp `current + delta` into `[0, MAX_HEALTH]`
pub fn clamp_health(current: u8, delta: i32) -> u8 {
    (i64::from(current) + i64::from(delta)).clamp(0, i64::from(MAX_HEALTH)) as u8
}

fn add_reward(current: u32, delta: i32) -> u32 {
    if delta <= 0 {
        return current;
    }
    current.saturating_add(delta.unsigned_abs())
}

/// Badge labels present in `after` but not in `before`
pub fn newly_earned_badges(before: &UserProfile, after: &UserProfile) -> Vec<String> {
    after.badges.difference(&before.badges).cloned().collect()
}

#[derive(Debug, Clone)]
pub struct ProgressionEngine {
    total_quests: usize,
    /// Ids of the current catalog; `None` counts every completed id
    catalog_quests: Option<BTreeSet<String>>,
    repeat_rewards: RepeatRewardPolicy,
}

impl ProgressionEngine {
    pub fn new(total_quests: usize) -> Self {
        Self {
            total_quests,
            catalog_quests: None,
            repeat_rewards: RepeatRewardPolicy::default(),
        }
    }

    /// Engine whose "all quests" badge only counts quests of `catalog`
    pub fn for_catalog(catalog: &ContentCatalog) -> Self {
        Self {
            catalog_quests: Some(catalog.quests().iter().map(|q| q.id.clone()).collect()),
            ..Self::new(catalog.quest_count())
        }
    }

    pub fn with_repeat_rewards(mut self, policy: RepeatRewardPolicy) -> Self {
        self.repeat_rewards = policy;
        self
    }

    pub fn repeat_rewards(&self) -> RepeatRewardPolicy {
        self.repeat_rewards
    }

    /// Apply the rewards of the chosen option and mark the quest completed
    pub fn apply_quest_outcome(&self, profile: &UserProfile, choice: &QuestChoice, quest_id: &str) -> UserProfile {
        let mut next = profile.clone();
        let replay = !next.completed_quests.insert(quest_id.to_string());

        if replay && self.repeat_rewards == RepeatRewardPolicy::CompletionOnly {
            debug!("Quest '{}' replayed, rewards not granted again", quest_id);
        } else {
            next.xp = add_reward(next.xp, choice.xp_reward);
            next.coins = next.coins.saturating_add(choice.coin_reward);
            next.health_score = clamp_health(next.health_score, choice.health_delta);
        }

        self.refresh_derived(&mut next);

        info!(
            "Quest '{}' applied: xp {} -> {}, coins {} -> {}, health {} -> {}",
            quest_id, profile.xp, next.xp, profile.coins, next.coins, profile.health_score, next.health_score
        );
        next
    }

    /// Score an answer to the daily challenge. A second answer on the same
    /// day leaves the profile untouched.
    pub fn apply_daily_outcome(
        &self,
        profile: &UserProfile,
        challenge: &DailyChallenge,
        chosen_index: usize,
        today: NaiveDate,
    ) -> DailyOutcome {
        if profile.has_answered_daily_today {
            debug!("Daily challenge already answered by '{}'", profile.name);
            return DailyOutcome {
                profile: profile.clone(),
                verdict: DailyVerdict::AlreadyAnswered,
                xp_gained: 0,
                coins_gained: 0,
            };
        }

        let is_correct = chosen_index == challenge.correct_index;
        let (xp_gained, coins_gained) = if is_correct {
            (challenge.reward, DAILY_CORRECT_COINS)
        } else {
            (DAILY_CONSOLATION_XP, 0)
        };

        let mut next = profile.clone();
        next.xp = next.xp.saturating_add(xp_gained);
        next.coins = next.coins.saturating_add(coins_gained);
        next.last_daily_date = Some(day_stamp(today));
        next.has_answered_daily_today = true;
        self.refresh_derived(&mut next);

        info!(
            "Daily challenge answered by '{}' (correct: {}), +{} xp, +{} coins",
            next.name, is_correct, xp_gained, coins_gained
        );

        DailyOutcome {
            profile: next,
            verdict: if is_correct { DailyVerdict::Correct } else { DailyVerdict::Incorrect },
            xp_gained,
            coins_gained,
        }
    }

    /// Recompute the level label and union in newly satisfied badges
    pub fn refresh_derived(&self, profile: &mut UserProfile) {
        profile.level = Level::for_xp(profile.xp).label().to_string();
        let catalog_completed = self.catalog_completed(profile);

        for badge in Badge::ALL {
            if badge.is_earned(profile, catalog_completed, self.total_quests)
                && profile.badges.insert(badge.label().to_string())
            {
                info!("Badge unlocked for '{}': {}", profile.name, badge);
            }
        }
    }

    /// Completed quests that still exist in the catalog
    pub fn catalog_completed(&self, profile: &UserProfile) -> usize {
        match &self.catalog_quests {
            Some(ids) => profile.completed_quests.iter().filter(|id| ids.contains(*id)).count(),
            None => profile.completed_quests.len(),
        }
    }
}
