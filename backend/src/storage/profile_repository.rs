//! # Profile Repository
//!
//! Persists the single player profile as one JSON record under a fixed key of
//! the key-value store. Saves overwrite the whole record (last write wins) and
//! no validation happens here: the progression engine only hands over valid
//! profiles.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info};

use super::traits::KeyValueStorage;
use shared::UserProfile;

/// Key the profile record is stored under
pub const PROFILE_KEY: &str = "bharat_money_user";

#[derive(Clone)]
pub struct ProfileRepository {
    storage: Arc<dyn KeyValueStorage>,
}

impl ProfileRepository {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }

    /// Load the persisted profile, `None` when nothing was saved yet
    pub async fn load(&self) -> Result<Option<UserProfile>> {
        let Some(raw) = self.storage.get_value(PROFILE_KEY).await? else {
            debug!("No stored profile under '{}'", PROFILE_KEY);
            return Ok(None);
        };

        let profile: UserProfile = serde_json::from_str(&raw)
            .with_context(|| format!("Stored profile under '{}' is not valid JSON", PROFILE_KEY))?;

        debug!("Loaded profile for '{}' ({} xp)", profile.name, profile.xp);
        Ok(Some(profile))
    }

    /// Overwrite the persisted profile
    pub async fn save(&self, profile: &UserProfile) -> Result<()> {
        let json = serde_json::to_string(profile)?;
        self.storage
            .put_value(PROFILE_KEY, &json)
            .await
            .context("Failed to save profile")?;
        debug!("Saved profile for '{}'", profile.name);
        Ok(())
    }

    /// Delete the persisted profile, returning to the pre-onboarding state
    pub async fn reset(&self) -> Result<bool> {
        let deleted = self.storage.delete_value(PROFILE_KEY).await?;
        info!("Profile reset (record existed: {})", deleted);
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sqlite::SqliteStore;
    use shared::{FinancialGoal, PersonaType};

    async fn setup_test() -> (ProfileRepository, Arc<SqliteStore>) {
        let store = Arc::new(SqliteStore::init_test().await.expect("Failed to create test database"));
        (ProfileRepository::new(store.clone()), store)
    }

    #[tokio::test]
    async fn test_load_without_record_is_none() {
        let (repo, _) = setup_test().await;
        assert!(repo.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let (repo, _) = setup_test().await;
        let mut profile = UserProfile::new("Meera", PersonaType::Woman, FinancialGoal::BudgetSmarter);
        profile.xp = 90;
        profile.completed_quests.insert("q1".to_string());

        repo.save(&profile).await.unwrap();

        let loaded = repo.load().await.unwrap().expect("profile should exist");
        assert_eq!(loaded, profile);
    }

    #[tokio::test]
    async fn test_save_overwrites_previous_record() {
        let (repo, store) = setup_test().await;
        let mut profile = UserProfile::new("Meera", PersonaType::Woman, FinancialGoal::BudgetSmarter);
        repo.save(&profile).await.unwrap();

        profile.coins = 250;
        repo.save(&profile).await.unwrap();

        assert_eq!(repo.load().await.unwrap().unwrap().coins, 250);
        assert_eq!(store.list_keys().await.unwrap(), vec![PROFILE_KEY]);
    }

    #[tokio::test]
    async fn test_reset_removes_record() {
        let (repo, _) = setup_test().await;
        repo.save(&UserProfile::default()).await.unwrap();

        assert!(repo.reset().await.unwrap());
        assert!(repo.load().await.unwrap().is_none());
        assert!(!repo.reset().await.unwrap());
    }

    #[tokio::test]
    async fn test_partial_record_gets_defaults() {
        let (repo, store) = setup_test().await;
        store
            .put_value(PROFILE_KEY, r#"{"name":"Old Timer","xp":700,"coins":300}"#)
            .await
            .unwrap();

        let loaded = repo.load().await.unwrap().unwrap();
        assert_eq!(loaded.name, "Old Timer");
        assert_eq!(loaded.xp, 700);
        assert_eq!(loaded.health_score, 50);
        assert!(loaded.badges.is_empty());
        assert_eq!(loaded.last_daily_date, None);
        assert!(!loaded.has_answered_daily_today);
    }

    #[tokio::test]
    async fn test_corrupt_record_is_an_error() {
        let (repo, store) = setup_test().await;
        store.put_value(PROFILE_KEY, "not json").await.unwrap();

        assert!(repo.load().await.is_err());
    }
}
