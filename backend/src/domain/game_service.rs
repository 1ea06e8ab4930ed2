//! # Game Service
//!
//! Owns the live player profile and the single active quest session, and
//! turns UI intents (onboard, open quest, pick option, finish, answer the
//! daily challenge) into progression engine transitions followed by a save.
//!
//! The in-memory profile is the source of truth. A failed save is reported
//! in the response (`saveError`) but the new progress is kept, and the next
//! successful save carries it forward.

use chrono::NaiveDate;
use shared::{
    DailyAnswerResponse, DailyChallengeResponse, FinalizeQuestResponse, HealthBand, OnboardingRequest,
    ProfileResponse, QuestMapResponse, QuestSummary, RevealResponse, SessionStatusResponse, StartQuestResponse,
    ToolkitResponse, UserProfile,
};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::advisory::AdvisoryKit;
use super::catalog::ContentCatalog;
use super::clock::Clock;
use super::daily_rotation::{day_stamp, refresh_daily_flag, select_daily};
use super::progression::{newly_earned_badges, Level, ProgressionEngine, MAX_HEALTH};
use super::quest_session::{headline, QuestSession, QuestSessionError};
use crate::storage::ProfileRepository;

#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("No player profile yet, complete onboarding first")]
    NeedsOnboarding,
    #[error("A profile already exists, reset it before onboarding again")]
    AlreadyOnboarded,
    #[error("Quest '{0}' does not exist")]
    UnknownQuest(String),
    #[error("Quest '{0}' is already in progress, finish or cancel it first")]
    SessionActive(String),
    #[error("No quest is in progress")]
    NoActiveSession,
    #[error(transparent)]
    Session(#[from] QuestSessionError),
    #[error("Answer {index} does not exist, the challenge has {available} options")]
    InvalidDailyAnswer { index: usize, available: usize },
    #[error("Today's challenge was already answered, come back tomorrow")]
    AlreadyAnsweredToday,
    #[error("No daily challenges are available")]
    EmptyDailyPool,
    #[error("Storage error: {0:#}")]
    Storage(#[from] anyhow::Error),
}

pub struct GameService {
    repository: ProfileRepository,
    catalog: Arc<ContentCatalog>,
    engine: ProgressionEngine,
    clock: Arc<dyn Clock>,
    advisory: AdvisoryKit,
    profile: Option<UserProfile>,
    session: Option<QuestSession>,
}

impl GameService {
    pub fn new(
        repository: ProfileRepository,
        catalog: Arc<ContentCatalog>,
        engine: ProgressionEngine,
        clock: Arc<dyn Clock>,
        advisory: AdvisoryKit,
    ) -> Self {
        Self {
            repository,
            catalog,
            engine,
            clock,
            advisory,
            profile: None,
            session: None,
        }
    }

    pub fn catalog(&self) -> &ContentCatalog {
        &self.catalog
    }

    /// Load the stored profile. Unreadable records are treated as absent.
    pub async fn load(&mut self) -> Option<&UserProfile> {
        self.profile = match self.repository.load().await {
            Ok(Some(stored)) => {
                let mut profile = refresh_daily_flag(stored, self.clock.today());
                profile.level = Level::for_xp(profile.xp).label().to_string();
                profile.health_score = profile.health_score.min(MAX_HEALTH);
                info!("Welcome back '{}' ({}, {} xp)", profile.name, profile.level, profile.xp);
                Some(profile)
            }
            Ok(None) => {
                info!("No stored profile, onboarding required");
                None
            }
            Err(e) => {
                warn!("Failed to load profile, starting as a new user: {:#}", e);
                None
            }
        };
        self.profile.as_ref()
    }

    pub fn current_profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    pub fn has_active_session(&self) -> bool {
        self.session.is_some()
    }

    pub fn profile_view(&self) -> Result<ProfileResponse, GameError> {
        let profile = self.require_profile()?;
        Ok(ProfileResponse {
            profile: profile.clone(),
            health_band: HealthBand::from_score(profile.health_score),
            save_error: None,
        })
    }

    /// Create the initial profile and save it right away.
    ///
    /// An existing profile is never replaced here; `reset` comes first.
    pub async fn onboard(&mut self, request: OnboardingRequest) -> Result<ProfileResponse, GameError> {
        if let Some(existing) = &self.profile {
            warn!("Onboarding refused, '{}' already has a profile", existing.name);
            return Err(GameError::AlreadyOnboarded);
        }

        let profile = UserProfile::new(&request.name, request.persona, request.goal);
        info!("Onboarding '{}' as {} aiming to {}", profile.name, profile.persona, profile.goal);

        self.session = None;
        let save_error = self.persist(&profile).await;
        let health_band = HealthBand::from_score(profile.health_score);
        self.profile = Some(profile.clone());

        Ok(ProfileResponse {
            profile,
            health_band,
            save_error,
        })
    }

    /// Delete the stored profile and return to onboarding
    pub async fn reset(&mut self) -> Result<(), GameError> {
        self.repository.reset().await?;
        self.session = None;
        self.profile = None;
        Ok(())
    }

    pub fn quest_map(&self) -> Result<QuestMapResponse, GameError> {
        let profile = self.require_profile()?;
        let quests: Vec<QuestSummary> = self
            .catalog
            .quests()
            .iter()
            .map(|quest| QuestSummary {
                id: quest.id.clone(),
                title: quest.title.clone(),
                category: quest.category,
                description: quest.description.clone(),
                difficulty: quest.difficulty,
                reward_info: quest.reward_info.clone(),
                icon: quest.icon.clone(),
                completed: profile.has_completed(&quest.id),
            })
            .collect();
        let completed_count = quests.iter().filter(|q| q.completed).count();

        Ok(QuestMapResponse {
            total_count: quests.len(),
            completed_count,
            quests,
        })
    }

    pub fn start_quest(&mut self, quest_id: &str) -> Result<StartQuestResponse, GameError> {
        self.require_profile()?;
        if let Some(active) = &self.session {
            warn!("Refusing to open '{}' while '{}' is in progress", quest_id, active.quest().id);
            return Err(GameError::SessionActive(active.quest().id.clone()));
        }

        let quest = self
            .catalog
            .quest(quest_id)
            .cloned()
            .ok_or_else(|| GameError::UnknownQuest(quest_id.to_string()))?;

        let session = QuestSession::start(quest.clone(), self.advisory.clone());
        let session_id = session.id().to_string();
        info!("Quest '{}' opened (session {})", quest.id, session_id);
        self.session = Some(session);

        Ok(StartQuestResponse { session_id, quest })
    }

    pub fn select_option(&mut self, option_index: usize) -> Result<RevealResponse, GameError> {
        let profile = self.profile.as_ref().ok_or(GameError::NeedsOnboarding)?;
        let session = self.session.as_mut().ok_or(GameError::NoActiveSession)?;
        let session_id = session.id().to_string();

        let choice = session.select(option_index, profile).map_err(|e| {
            warn!("Option {} rejected: {}", option_index, e);
            e
        })?;

        Ok(RevealResponse {
            session_id,
            option_index,
            headline: headline(choice).to_string(),
            feedback: choice.feedback.clone(),
            is_correct: choice.is_correct,
            xp_reward: choice.xp_reward,
            coin_reward: choice.coin_reward,
            health_delta: choice.health_delta,
        })
    }

    pub fn session_status(&self) -> Result<SessionStatusResponse, GameError> {
        let session = self.session.as_ref().ok_or(GameError::NoActiveSession)?;
        Ok(SessionStatusResponse {
            session_id: session.id().to_string(),
            quest_id: session.quest().id.clone(),
            selected_option: session.selected_index(),
            tip: session.tip(),
        })
    }

    /// Apply the revealed choice, end the session and save
    pub async fn finalize_quest(&mut self) -> Result<FinalizeQuestResponse, GameError> {
        let before = self.require_profile()?.clone();
        let session = self.session.as_ref().ok_or(GameError::NoActiveSession)?;

        let after = session.finalize(&self.engine, &before)?;
        let quest_id = session.quest().id.clone();
        self.session = None;

        let new_badges = newly_earned_badges(&before, &after);
        let level_changed = before.level != after.level;
        if level_changed {
            info!("'{}' reached level {}", after.name, after.level);
        }
        debug!("Quest '{}' finalized with new badges {:?}", quest_id, new_badges);

        let save_error = self.persist(&after).await;
        self.profile = Some(after.clone());

        Ok(FinalizeQuestResponse {
            profile: after,
            new_badges,
            level_changed,
            save_error,
        })
    }

    /// Drop the active session without touching the profile
    pub fn cancel_quest(&mut self) -> bool {
        match self.session.take() {
            Some(session) => {
                info!("Quest '{}' cancelled (session {})", session.quest().id, session.id());
                true
            }
            None => {
                debug!("Cancel requested without an active quest");
                false
            }
        }
    }

    pub fn todays_challenge(&mut self) -> Result<DailyChallengeResponse, GameError> {
        let today = self.clock.today();
        let answered_today = self.refresh_for(today)?.has_answered_daily_today;
        let challenge = select_daily(self.catalog.daily_pool(), today).ok_or(GameError::EmptyDailyPool)?;

        Ok(DailyChallengeResponse {
            date: day_stamp(today),
            question: challenge.question.clone(),
            options: challenge.options.clone(),
            reward: challenge.reward,
            answered_today,
        })
    }

    pub async fn answer_daily(&mut self, chosen_index: usize) -> Result<DailyAnswerResponse, GameError> {
        let today = self.clock.today();
        let profile = self.refresh_for(today)?.clone();
        let challenge = select_daily(self.catalog.daily_pool(), today)
            .cloned()
            .ok_or(GameError::EmptyDailyPool)?;

        if profile.has_answered_daily_today {
            warn!("'{}' already answered the daily challenge for {}", profile.name, day_stamp(today));
            return Err(GameError::AlreadyAnsweredToday);
        }
        if chosen_index >= challenge.options.len() {
            return Err(GameError::InvalidDailyAnswer {
                index: chosen_index,
                available: challenge.options.len(),
            });
        }

        let outcome = self.engine.apply_daily_outcome(&profile, &challenge, chosen_index, today);
        let save_error = self.persist(&outcome.profile).await;
        self.profile = Some(outcome.profile.clone());

        Ok(DailyAnswerResponse {
            is_correct: outcome.is_correct(),
            correct_index: challenge.correct_index,
            explanation: challenge.explanation,
            xp_gained: outcome.xp_gained,
            coins_gained: outcome.coins_gained,
            profile: outcome.profile,
            save_error,
        })
    }

    pub fn toolkit(&self) -> ToolkitResponse {
        ToolkitResponse {
            items: self.catalog.toolkit().to_vec(),
        }
    }

    fn require_profile(&self) -> Result<&UserProfile, GameError> {
        self.profile.as_ref().ok_or(GameError::NeedsOnboarding)
    }

    /// Re-check the answered flag against `today`, the process may outlive midnight
    fn refresh_for(&mut self, today: NaiveDate) -> Result<&UserProfile, GameError> {
        let profile = self.profile.take().ok_or(GameError::NeedsOnboarding)?;
        Ok(&*self.profile.insert(refresh_daily_flag(profile, today)))
    }

    async fn persist(&self, profile: &UserProfile) -> Option<String> {
        match self.repository.save(profile).await {
            Ok(()) => None,
            Err(e) => {
                error!("Progress kept in memory but not saved: {:#}", e);
                Some(format!("{:#}", e))
            }
        }
    }
}
