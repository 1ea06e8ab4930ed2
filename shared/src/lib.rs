use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Display name used when the player leaves the onboarding name blank
pub const DEFAULT_PLAYER_NAME: &str = "Guest User";
/// Coins granted to every new profile
pub const STARTING_COINS: u32 = 100;
/// Health score of a new profile
pub const STARTING_HEALTH: u8 = 50;
/// Upper bound of the health score
pub const MAX_HEALTH: u8 = 100;
/// Level label of a new profile
pub const STARTING_LEVEL: &str = "Beginner Saver";

/// Learning track chosen during onboarding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PersonaType {
    #[default]
    Student,
    Woman,
    Farmer,
    #[serde(rename = "Young Adult")]
    YoungAdult,
}

impl PersonaType {
    pub const ALL: [PersonaType; 4] = [
        PersonaType::Student,
        PersonaType::Woman,
        PersonaType::Farmer,
        PersonaType::YoungAdult,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PersonaType::Student => "Student",
            PersonaType::Woman => "Woman",
            PersonaType::Farmer => "Farmer",
            PersonaType::YoungAdult => "Young Adult",
        }
    }
}

impl fmt::Display for PersonaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Main financial goal chosen during onboarding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum FinancialGoal {
    #[default]
    #[serde(rename = "Save Better")]
    SaveBetter,
    #[serde(rename = "Budget Smarter")]
    BudgetSmarter,
    #[serde(rename = "Learn Credit")]
    LearnCredit,
    #[serde(rename = "Start Investing")]
    StartInvesting,
    #[serde(rename = "Stay Safe from Scams")]
    StaySafe,
}

impl FinancialGoal {
    pub const ALL: [FinancialGoal; 5] = [
        FinancialGoal::SaveBetter,
        FinancialGoal::BudgetSmarter,
        FinancialGoal::LearnCredit,
        FinancialGoal::StartInvesting,
        FinancialGoal::StaySafe,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FinancialGoal::SaveBetter => "Save Better",
            FinancialGoal::BudgetSmarter => "Budget Smarter",
            FinancialGoal::LearnCredit => "Learn Credit",
            FinancialGoal::StartInvesting => "Start Investing",
            FinancialGoal::StaySafe => "Stay Safe from Scams",
        }
    }
}

impl fmt::Display for FinancialGoal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The persisted player profile.
///
/// Serialized as a flat camelCase JSON record. Every field has a default so
/// records written by older versions (missing `badges`, `lastDailyDate`, ...)
/// still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    pub name: String,
    pub persona: PersonaType,
    pub goal: FinancialGoal,
    pub xp: u32,
    pub coins: u32,
    /// Cached level label, always recomputed from `xp` on transitions
    pub level: String,
    #[serde(deserialize_with = "saturating_health")]
    pub health_score: u8,
    pub badges: BTreeSet<String>,
    pub completed_quests: BTreeSet<String>,
    /// Day stamp such as "Mon Jan 01 2024"
    pub last_daily_date: Option<String>,
    pub has_answered_daily_today: bool,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            name: DEFAULT_PLAYER_NAME.to_string(),
            persona: PersonaType::default(),
            goal: FinancialGoal::default(),
            xp: 0,
            coins: STARTING_COINS,
            level: STARTING_LEVEL.to_string(),
            health_score: STARTING_HEALTH,
            badges: BTreeSet::new(),
            completed_quests: BTreeSet::new(),
            last_daily_date: None,
            has_answered_daily_today: false,
        }
    }
}

impl UserProfile {
    /// Build the initial profile created at the end of onboarding
    pub fn new(name: &str, persona: PersonaType, goal: FinancialGoal) -> Self {
        let name = name.trim();
        Self {
            name: if name.is_empty() {
                DEFAULT_PLAYER_NAME.to_string()
            } else {
                name.to_string()
            },
            persona,
            goal,
            ..Self::default()
        }
    }

    pub fn has_completed(&self, quest_id: &str) -> bool {
        self.completed_quests.contains(quest_id)
    }

    pub fn has_badge(&self, badge: &str) -> bool {
        self.badges.contains(badge)
    }
}

/// Reads any stored number into `[0, MAX_HEALTH]`, so one out-of-range value
/// does not make the whole record unreadable
fn saturating_health<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    struct HealthVisitor;

    impl<'de> Visitor<'de> for HealthVisitor {
        type Value = u8;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a health score number")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<u8, E> {
            Ok(v.min(u64::from(MAX_HEALTH)) as u8)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<u8, E> {
            Ok(v.clamp(0, i64::from(MAX_HEALTH)) as u8)
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<u8, E> {
            if v.is_nan() {
                return Ok(STARTING_HEALTH);
            }
            Ok(v.clamp(0.0, f64::from(MAX_HEALTH)) as u8)
        }

        fn visit_unit<E: de::Error>(self) -> Result<u8, E> {
            Ok(STARTING_HEALTH)
        }
    }

    deserializer.deserialize_any(HealthVisitor)
}

/// Coarse banding of the health score used by display consumers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthBand {
    Healthy,
    Moderate,
    AtRisk,
}

impl HealthBand {
    pub fn from_score(score: u8) -> Self {
        if score > 70 {
            HealthBand::Healthy
        } else if score > 40 {
            HealthBand::Moderate
        } else {
            HealthBand::AtRisk
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestCategory {
    Beginner,
    Digital,
    Advanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// One selectable answer of a quest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestChoice {
    pub text: String,
    pub feedback: String,
    pub xp_reward: i32,
    pub coin_reward: u32,
    pub health_delta: i32,
    /// Display only: the reward values carry the actual effect
    pub is_correct: bool,
}

/// A scenario-based multiple-choice learning unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quest {
    pub id: String,
    pub title: String,
    pub category: QuestCategory,
    pub description: String,
    pub scenario: String,
    pub options: Vec<QuestChoice>,
    pub difficulty: Difficulty,
    pub reward_info: String,
    pub icon: String,
}

/// Short reference article shown in the money toolkit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolkitItem {
    pub id: String,
    pub title: String,
    pub content: String,
    pub icon: String,
    pub color: String,
}

/// A single trivia question of the daily rotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyChallenge {
    pub question: String,
    pub options: Vec<String>,
    pub correct_index: usize,
    pub explanation: String,
    /// XP granted for a correct answer
    pub reward: u32,
}

/// Request for finishing onboarding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub persona: PersonaType,
    #[serde(default)]
    pub goal: FinancialGoal,
}

/// Profile plus display helpers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub profile: UserProfile,
    pub health_band: HealthBand,
    /// Set when the latest change could not be written to storage
    pub save_error: Option<String>,
}

/// A quest as listed on the quest map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestSummary {
    pub id: String,
    pub title: String,
    pub category: QuestCategory,
    pub description: String,
    pub difficulty: Difficulty,
    pub reward_info: String,
    pub icon: String,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestMapResponse {
    pub quests: Vec<QuestSummary>,
    pub completed_count: usize,
    pub total_count: usize,
}

/// Response after opening a quest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartQuestResponse {
    pub session_id: String,
    pub quest: Quest,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectOptionRequest {
    pub option_index: usize,
}

/// Feedback revealed after an option is chosen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevealResponse {
    pub session_id: String,
    pub option_index: usize,
    pub headline: String,
    pub feedback: String,
    pub is_correct: bool,
    pub xp_reward: i32,
    pub coin_reward: u32,
    pub health_delta: i32,
}

/// Current state of the active quest session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatusResponse {
    pub session_id: String,
    pub quest_id: String,
    pub selected_option: Option<usize>,
    /// Advisory tip, `None` while it is still being fetched
    pub tip: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizeQuestResponse {
    pub profile: UserProfile,
    pub new_badges: Vec<String>,
    pub level_changed: bool,
    pub save_error: Option<String>,
}

/// Today's daily challenge, without the answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyChallengeResponse {
    pub date: String,
    pub question: String,
    pub options: Vec<String>,
    pub reward: u32,
    pub answered_today: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyAnswerRequest {
    pub chosen_index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyAnswerResponse {
    pub is_correct: bool,
    pub correct_index: usize,
    pub explanation: String,
    pub xp_gained: u32,
    pub coins_gained: u32,
    pub profile: UserProfile,
    pub save_error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolkitResponse {
    pub items: Vec<ToolkitItem>,
}

/// Error body returned by the REST layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_profile_defaults() {
        let profile = UserProfile::new("Rajesh", PersonaType::Farmer, FinancialGoal::StartInvesting);

        assert_eq!(profile.name, "Rajesh");
        assert_eq!(profile.persona, PersonaType::Farmer);
        assert_eq!(profile.goal, FinancialGoal::StartInvesting);
        assert_eq!(profile.xp, 0);
        assert_eq!(profile.coins, 100);
        assert_eq!(profile.health_score, 50);
        assert_eq!(profile.level, "Beginner Saver");
        assert!(profile.badges.is_empty());
        assert!(profile.completed_quests.is_empty());
        assert_eq!(profile.last_daily_date, None);
        assert!(!profile.has_answered_daily_today);
    }

    #[test]
    fn test_blank_name_uses_placeholder() {
        for name in ["", "   ", "\t"] {
            let profile = UserProfile::new(name, PersonaType::Student, FinancialGoal::SaveBetter);
            assert_eq!(profile.name, DEFAULT_PLAYER_NAME, "name {:?} should default", name);
        }

        let profile = UserProfile::new("  Priya ", PersonaType::Woman, FinancialGoal::StaySafe);
        assert_eq!(profile.name, "Priya");
    }

    #[test]
    fn test_profile_json_uses_flat_camel_case_fields() {
        let mut profile = UserProfile::new("Asha", PersonaType::YoungAdult, FinancialGoal::StaySafe);
        profile.completed_quests.insert("q2".to_string());

        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["persona"], "Young Adult");
        assert_eq!(json["goal"], "Stay Safe from Scams");
        assert_eq!(json["healthScore"], 50);
        assert_eq!(json["completedQuests"], serde_json::json!(["q2"]));
        assert_eq!(json["lastDailyDate"], serde_json::Value::Null);
        assert_eq!(json["hasAnsweredDailyToday"], false);
    }

    #[test]
    fn test_record_missing_newer_fields_still_loads() {
        // Shape written before badges and daily tracking existed
        let legacy = r#"{
            "name": "Ravi",
            "persona": "Farmer",
            "goal": "Learn Credit",
            "xp": 120,
            "coins": 140,
            "level": "Beginner Saver",
            "healthScore": 65,
            "completedQuests": ["q1", "q3"]
        }"#;

        let profile: UserProfile = serde_json::from_str(legacy).unwrap();
        assert_eq!(profile.name, "Ravi");
        assert_eq!(profile.xp, 120);
        assert_eq!(profile.completed_quests.len(), 2);
        assert!(profile.badges.is_empty());
        assert_eq!(profile.last_daily_date, None);
        assert!(!profile.has_answered_daily_today);
    }

    #[test]
    fn test_duplicate_ids_collapse_on_load() {
        let json = r#"{"completedQuests": ["q1", "q1", "q2"], "badges": ["Budget Hero", "Budget Hero"]}"#;
        let profile: UserProfile = serde_json::from_str(json).unwrap();

        assert_eq!(profile.completed_quests.len(), 2);
        assert_eq!(profile.badges.len(), 1);
        assert_eq!(profile.name, DEFAULT_PLAYER_NAME);
    }

    #[test]
    fn test_out_of_range_health_saturates_on_load() {
        let profile: UserProfile = serde_json::from_str(r#"{"name":"Ravi","xp":10,"healthScore":180}"#).unwrap();
        assert_eq!(profile.health_score, 100);

        let json = r#"{"xp":900,"healthScore":256,"completedQuests":["q1","q2"]}"#;
        let profile: UserProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.health_score, 100);
        assert_eq!(profile.xp, 900);
        assert_eq!(profile.completed_quests.len(), 2);

        let profile: UserProfile = serde_json::from_str(r#"{"healthScore":-12}"#).unwrap();
        assert_eq!(profile.health_score, 0);

        let profile: UserProfile = serde_json::from_str(r#"{"healthScore":72.6}"#).unwrap();
        assert_eq!(profile.health_score, 72);

        let profile: UserProfile = serde_json::from_str(r#"{"healthScore":null}"#).unwrap();
        assert_eq!(profile.health_score, STARTING_HEALTH);
    }

    #[test]
    fn test_health_band_thresholds() {
        assert_eq!(HealthBand::from_score(100), HealthBand::Healthy);
        assert_eq!(HealthBand::from_score(71), HealthBand::Healthy);
        assert_eq!(HealthBand::from_score(70), HealthBand::Moderate);
        assert_eq!(HealthBand::from_score(41), HealthBand::Moderate);
        assert_eq!(HealthBand::from_score(40), HealthBand::AtRisk);
        assert_eq!(HealthBand::from_score(0), HealthBand::AtRisk);
    }

    #[test]
    fn test_labels_match_serialized_names() {
        for persona in PersonaType::ALL {
            let json = serde_json::to_string(&persona).unwrap();
            assert_eq!(json, format!("\"{}\"", persona.label()));
        }
        for goal in FinancialGoal::ALL {
            let json = serde_json::to_string(&goal).unwrap();
            assert_eq!(json, format!("\"{}\"", goal));
        }
    }
}
