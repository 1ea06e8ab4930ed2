//! Ephemeral state of a quest attempt.
//!
//! A session starts in `Presenting`, moves to `Revealed` when the player picks
//! an option, and ends when the owner finalizes or drops it. Nothing touches
//! the profile until finalize. Selecting also kicks off the advisory tip and
//! the narration of the feedback in the background; dropping the session
//! aborts whatever is still in flight, so a late tip never lands anywhere.

use shared::{Quest, QuestChoice, UserProfile};
use std::sync::{Arc, Mutex};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::debug;
use uuid::Uuid;

use super::advisory::{quest_action, AdvisoryKit, FALLBACK_TIP};
use super::progression::ProgressionEngine;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuestSessionError {
    #[error("Option {index} does not exist, the quest has {available} options")]
    InvalidOption { index: usize, available: usize },
    #[error("An option was already chosen for this quest")]
    AlreadyRevealed,
    #[error("Choose an option before finishing the quest")]
    NothingSelected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Presenting,
    Revealed { option_index: usize },
}

/// Feedback title shown after a choice
pub fn headline(choice: &QuestChoice) -> &'static str {
    if choice.is_correct {
        "Smart Choice!"
    } else {
        "Learning Moment"
    }
}

pub struct QuestSession {
    id: Uuid,
    quest: Quest,
    phase: SessionPhase,
    tip: Arc<Mutex<Option<String>>>,
    side_tasks: Vec<JoinHandle<()>>,
    advisory: AdvisoryKit,
}

impl QuestSession {
    pub fn start(quest: Quest, advisory: AdvisoryKit) -> Self {
        let id = Uuid::new_v4();
        debug!("Quest session {} started for '{}'", id, quest.id);
        Self {
            id,
            quest,
            phase: SessionPhase::Presenting,
            tip: Arc::new(Mutex::new(None)),
            side_tasks: Vec::new(),
            advisory,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn quest(&self) -> &Quest {
        &self.quest
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_revealed(&self) -> bool {
        matches!(self.phase, SessionPhase::Revealed { .. })
    }

    pub fn selected_index(&self) -> Option<usize> {
        match self.phase {
            SessionPhase::Presenting => None,
            SessionPhase::Revealed { option_index } => Some(option_index),
        }
    }

    pub fn selected_choice(&self) -> Option<&QuestChoice> {
        self.selected_index().map(|index| &self.quest.options[index])
    }

    /// Reveal an option. The first choice is final for the session.
    pub fn select(&mut self, option_index: usize, profile: &UserProfile) -> Result<&QuestChoice, QuestSessionError> {
        if self.is_revealed() {
            return Err(QuestSessionError::AlreadyRevealed);
        }

        let available = self.quest.options.len();
        if option_index >= available {
            return Err(QuestSessionError::InvalidOption { index: option_index, available });
        }

        self.phase = SessionPhase::Revealed { option_index };
        debug!("Session {} revealed option {}", self.id, option_index);

        let choice = self.quest.options[option_index].clone();
        self.spawn_side_calls(&choice, profile);

        Ok(&self.quest.options[option_index])
    }

    fn spawn_side_calls(&mut self, choice: &QuestChoice, profile: &UserProfile) {
        let Ok(runtime) = Handle::try_current() else {
            debug!("No async runtime for session {}, using fallback tip", self.id);
            store_tip(&self.tip, FALLBACK_TIP.to_string());
            return;
        };

        let kit = self.advisory.clone();
        let slot = Arc::clone(&self.tip);
        let persona = profile.persona.label();
        let goal = profile.goal.label();
        let action = quest_action(&choice.text, &self.quest.title);
        let session_id = self.id;
        self.side_tasks.push(runtime.spawn(async move {
            let tip = kit.insight(persona, goal, &action).await;
            store_tip(&slot, tip);
            debug!("Tip ready for session {}", session_id);
        }));

        let narrator = Arc::clone(&self.advisory.narrator);
        let feedback = choice.feedback.clone();
        self.side_tasks.push(runtime.spawn(async move {
            if let Err(e) = narrator.speak(&feedback).await {
                debug!("Narration skipped: {}", e);
            }
        }));
    }

    /// The advisory tip, `None` while still pending
    pub fn tip(&self) -> Option<String> {
        match self.tip.lock() {
            Ok(slot) => slot.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Apply the revealed choice to `profile`.
    ///
    /// Never waits for the tip. The owner discards the session afterwards.
    pub fn finalize(&self, engine: &ProgressionEngine, profile: &UserProfile) -> Result<UserProfile, QuestSessionError> {
        let choice = self.selected_choice().ok_or(QuestSessionError::NothingSelected)?;
        Ok(engine.apply_quest_outcome(profile, choice, &self.quest.id))
    }
}

impl Drop for QuestSession {
    fn drop(&mut self) {
        for task in &self.side_tasks {
            task.abort();
        }
    }
}

fn store_tip(slot: &Mutex<Option<String>>, tip: String) {
    let mut guard = match slot.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    *guard = Some(tip);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::advisory::{AdvisoryService, Narrator, SilentNarrator, StaticAdvisor, NO_ADVISOR_TIP};
    use crate::domain::catalog::ContentCatalog;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    fn q2() -> Quest {
        ContentCatalog::bundled().quest("q2").cloned().unwrap()
    }

    fn kit_with(advisor: Arc<dyn AdvisoryService>, narrator: Arc<dyn Narrator>) -> AdvisoryKit {
        AdvisoryKit {
            advisor,
            narrator,
            timeout: Duration::from_secs(5),
        }
    }

    struct SlowAdvisor {
        finished: Arc<AtomicBool>,
    }

    #[async_trait]
    impl AdvisoryService for SlowAdvisor {
        async fn get_insight(&self, _: &str, _: &str, _: &str) -> anyhow::Result<String> {
            tokio::time::sleep(Duration::from_millis(200)).await;
            self.finished.store(true, Ordering::SeqCst);
            Ok("late tip".to_string())
        }
    }

    #[derive(Default)]
    struct RecordingNarrator {
        spoken: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Narrator for RecordingNarrator {
        async fn speak(&self, text: &str) -> anyhow::Result<()> {
            self.spoken.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    async fn wait_for_tip(session: &QuestSession) -> Option<String> {
        for _ in 0..100 {
            if let Some(tip) = session.tip() {
                return Some(tip);
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        None
    }

    #[test]
    fn test_new_session_is_presenting() {
        let session = QuestSession::start(q2(), AdvisoryKit::default());
        assert_eq!(session.phase(), SessionPhase::Presenting);
        assert!(session.selected_choice().is_none());
        assert!(session.tip().is_none());
    }

    #[test]
    fn test_select_reveals_choice() {
        let mut session = QuestSession::start(q2(), AdvisoryKit::default());

        let choice = session.select(1, &UserProfile::default()).unwrap();
        assert!(choice.is_correct);
        assert_eq!(headline(choice), "Smart Choice!");

        assert_eq!(session.phase(), SessionPhase::Revealed { option_index: 1 });
        // Outside a runtime the tip falls back immediately
        assert_eq!(session.tip().as_deref(), Some(FALLBACK_TIP));
    }

    #[test]
    fn test_first_choice_is_final() {
        let mut session = QuestSession::start(q2(), AdvisoryKit::default());
        session.select(0, &UserProfile::default()).unwrap();

        assert_eq!(session.select(1, &UserProfile::default()), Err(QuestSessionError::AlreadyRevealed));
        assert_eq!(session.selected_index(), Some(0));
    }

    #[test]
    fn test_invalid_option_keeps_presenting() {
        let mut session = QuestSession::start(q2(), AdvisoryKit::default());

        let err = session.select(2, &UserProfile::default()).unwrap_err();
        assert_eq!(err, QuestSessionError::InvalidOption { index: 2, available: 2 });
        assert_eq!(session.phase(), SessionPhase::Presenting);
    }

    #[test]
    fn test_finalize_requires_reveal() {
        let session = QuestSession::start(q2(), AdvisoryKit::default());
        let engine = ProgressionEngine::new(4);

        let result = session.finalize(&engine, &UserProfile::default());
        assert_eq!(result, Err(QuestSessionError::NothingSelected));
    }

    #[test]
    fn test_finalize_applies_chosen_option() {
        let mut session = QuestSession::start(q2(), AdvisoryKit::default());
        let engine = ProgressionEngine::new(4);
        let profile = UserProfile::default();

        session.select(0, &profile).unwrap();
        let next = session.finalize(&engine, &profile).unwrap();

        assert_eq!(next.health_score, 20);
        assert_eq!(next.xp, 0);
        assert!(next.has_completed("q2"));
        assert_eq!(headline(&session.quest().options[0]), "Learning Moment");
    }

    #[tokio::test]
    async fn test_tip_arrives_in_background() {
        let narrator = Arc::new(RecordingNarrator::default());
        let mut session = QuestSession::start(q2(), kit_with(Arc::new(StaticAdvisor), narrator.clone()));

        session.select(1, &UserProfile::default()).unwrap();

        assert_eq!(wait_for_tip(&session).await.as_deref(), Some(NO_ADVISOR_TIP));
        tokio::time::sleep(Duration::from_millis(20)).await;
        let spoken = narrator.spoken.lock().unwrap().clone();
        assert_eq!(spoken, vec![session.quest().options[1].feedback.clone()]);
    }

    #[tokio::test]
    async fn test_finalize_does_not_wait_for_tip() {
        let finished = Arc::new(AtomicBool::new(false));
        let advisor = Arc::new(SlowAdvisor { finished: finished.clone() });
        let mut session = QuestSession::start(q2(), kit_with(advisor, Arc::new(SilentNarrator)));
        let profile = UserProfile::default();

        session.select(1, &profile).unwrap();
        let next = session.finalize(&ProgressionEngine::new(4), &profile).unwrap();

        assert_eq!(next.xp, 60);
        assert!(session.tip().is_none());
        assert!(!finished.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_dropped_session_ignores_late_tip() {
        let finished = Arc::new(AtomicBool::new(false));
        let advisor = Arc::new(SlowAdvisor { finished: finished.clone() });
        let mut session = QuestSession::start(q2(), kit_with(advisor, Arc::new(SilentNarrator)));

        session.select(0, &UserProfile::default()).unwrap();
        drop(session);

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(!finished.load(Ordering::SeqCst), "advisory call should have been aborted");
    }
}
