//! Advisory tip and narration capabilities.
//!
//! Both are optional flavour around a quest reveal. They are called
//! fire-and-forget by the quest session, never by the progression engine, and
//! every failure degrades to a fixed fallback (tip) or to silence (narration).

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::AdvisoryConfig;

/// Tip used when no advisory backend is configured
pub const NO_ADVISOR_TIP: &str = "Great job on making a financial decision! Keep learning.";
/// Tip used when the advisor answers with an empty text
pub const EMPTY_REPLY_TIP: &str = "Good decision! Every rupee saved is a rupee earned.";
/// Tip used on error or timeout
pub const FALLBACK_TIP: &str = "Great progress! Keep going on your quest.";

pub const SYSTEM_INSTRUCTION: &str = "You are Bharat Finance Buddy, a friendly mentor for Indian users learning money management. Use simple English mixed with occasional common Indian financial terms.";

#[async_trait]
pub trait AdvisoryService: Send + Sync {
    /// One-sentence supportive tip for the player's latest action
    async fn get_insight(&self, persona: &str, goal: &str, action: &str) -> Result<String>;
}

#[async_trait]
pub trait Narrator: Send + Sync {
    async fn speak(&self, text: &str) -> Result<()>;
}

/// Action description sent to the advisor after a quest choice
pub fn quest_action(choice_text: &str, quest_title: &str) -> String {
    format!("chose: {} in quest {}", choice_text, quest_title)
}

pub fn build_prompt(persona: &str, goal: &str, action: &str) -> String {
    format!(
        "User is a {} with goal {}. They just {}. Provide a 1-sentence supportive financial tip in a friendly Indian context.",
        persona, goal, action
    )
}

/// Ask the advisor, falling back to [`FALLBACK_TIP`] on error or timeout
pub async fn insight_or_fallback(
    advisor: &dyn AdvisoryService,
    timeout: Duration,
    persona: &str,
    goal: &str,
    action: &str,
) -> String {
    match tokio::time::timeout(timeout, advisor.get_insight(persona, goal, action)).await {
        Ok(Ok(tip)) => tip,
        Ok(Err(e)) => {
            warn!("Advisory tip failed, using fallback: {}", e);
            FALLBACK_TIP.to_string()
        }
        Err(_) => {
            warn!("Advisory tip timed out after {:?}, using fallback", timeout);
            FALLBACK_TIP.to_string()
        }
    }
}

/// Offline advisor answering with a fixed encouragement
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticAdvisor;

#[async_trait]
impl AdvisoryService for StaticAdvisor {
    async fn get_insight(&self, _persona: &str, _goal: &str, _action: &str) -> Result<String> {
        Ok(NO_ADVISOR_TIP.to_string())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SilentNarrator;

#[async_trait]
impl Narrator for SilentNarrator {
    async fn speak(&self, _text: &str) -> Result<()> {
        Ok(())
    }
}

/// Advisor backed by a hosted generative text API
pub struct GenerativeAdvisor {
    client: Client,
    api_url: String,
    model: String,
    api_key: String,
}

impl GenerativeAdvisor {
    pub fn new(api_url: &str, model: &str, api_key: &str) -> Self {
        Self {
            client: Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_url, self.model)
    }
}

#[async_trait]
impl AdvisoryService for GenerativeAdvisor {
    async fn get_insight(&self, persona: &str, goal: &str, action: &str) -> Result<String> {
        let request = GenerateRequest {
            system_instruction: Content::text(SYSTEM_INSTRUCTION),
            contents: vec![Content::text(&build_prompt(persona, goal, action))],
        };

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow!("Advisory API error {}: {}", status, error_text));
        }

        let reply: GenerateResponse = response.json().await?;
        let text = reply.first_text().unwrap_or_default();
        if text.trim().is_empty() {
            debug!("Advisory API returned an empty tip");
            return Ok(EMPTY_REPLY_TIP.to_string());
        }
        Ok(text.trim().to_string())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    system_instruction: Content,
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    fn text(text: &str) -> Self {
        Self {
            parts: vec![Part { text: Some(text.to_string()) }],
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Content,
}

impl GenerateResponse {
    fn first_text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        Some(text)
    }
}

/// The optional side capabilities handed to every quest session
#[derive(Clone)]
pub struct AdvisoryKit {
    pub advisor: Arc<dyn AdvisoryService>,
    pub narrator: Arc<dyn Narrator>,
    pub timeout: Duration,
}

impl Default for AdvisoryKit {
    fn default() -> Self {
        Self {
            advisor: Arc::new(StaticAdvisor),
            narrator: Arc::new(SilentNarrator),
            timeout: Duration::from_millis(AdvisoryConfig::default().timeout_ms),
        }
    }
}

impl AdvisoryKit {
    pub fn from_config(config: &AdvisoryConfig) -> Self {
        let timeout = Duration::from_millis(config.timeout_ms);
        let advisor: Arc<dyn AdvisoryService> = match config.api_key.as_deref() {
            Some(key) if config.enabled && !key.trim().is_empty() => {
                info!("Advisory tips enabled using model {}", config.model);
                Arc::new(GenerativeAdvisor::new(&config.api_url, &config.model, key.trim()))
            }
            _ => {
                info!("No advisory API key configured, using static tips");
                Arc::new(StaticAdvisor)
            }
        };

        Self {
            advisor,
            narrator: Arc::new(SilentNarrator),
            timeout,
        }
    }

    pub async fn insight(&self, persona: &str, goal: &str, action: &str) -> String {
        insight_or_fallback(self.advisor.as_ref(), self.timeout, persona, goal, action).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingAdvisor;

    #[async_trait]
    impl AdvisoryService for FailingAdvisor {
        async fn get_insight(&self, _: &str, _: &str, _: &str) -> Result<String> {
            Err(anyhow!("service unavailable"))
        }
    }

    struct SlowAdvisor;

    #[async_trait]
    impl AdvisoryService for SlowAdvisor {
        async fn get_insight(&self, _: &str, _: &str, _: &str) -> Result<String> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok("too late".to_string())
        }
    }

    #[test]
    fn test_prompt_and_action_text() {
        let action = quest_action("Report the number and delete the message.", "The UPI Scam Shield");
        assert_eq!(action, "chose: Report the number and delete the message. in quest The UPI Scam Shield");

        let prompt = build_prompt("Young Adult", "Stay Safe from Scams", &action);
        assert!(prompt.starts_with("User is a Young Adult with goal Stay Safe from Scams. They just chose:"));
        assert!(prompt.ends_with("friendly Indian context."));
    }

    #[tokio::test]
    async fn test_static_advisor_tip() {
        let tip = insight_or_fallback(&StaticAdvisor, Duration::from_secs(1), "Student", "Save Better", "chose").await;
        assert_eq!(tip, NO_ADVISOR_TIP);
    }

    #[tokio::test]
    async fn test_error_maps_to_fallback() {
        let tip = insight_or_fallback(&FailingAdvisor, Duration::from_secs(1), "Farmer", "Learn Credit", "chose").await;
        assert_eq!(tip, FALLBACK_TIP);
    }

    #[tokio::test]
    async fn test_timeout_maps_to_fallback() {
        let tip = insight_or_fallback(&SlowAdvisor, Duration::from_millis(50), "Woman", "Save Better", "chose").await;
        assert_eq!(tip, FALLBACK_TIP);
    }

    #[test]
    fn test_kit_without_key_is_static() {
        let config = AdvisoryConfig {
            api_key: None,
            ..AdvisoryConfig::default()
        };
        let kit = AdvisoryKit::from_config(&config);
        assert_eq!(kit.timeout, Duration::from_millis(config.timeout_ms));
    }

    #[test]
    fn test_response_text_extraction() {
        let reply: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"Save a little "},{"text":"every week."}]}}]}"#,
        )
        .unwrap();
        assert_eq!(reply.first_text().as_deref(), Some("Save a little every week."));

        let empty: GenerateResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(empty.first_text(), None);
    }

    #[test]
    fn test_request_shape() {
        let request = GenerateRequest {
            system_instruction: Content::text(SYSTEM_INSTRUCTION),
            contents: vec![Content::text("hello")],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hello");
        assert!(json["systemInstruction"]["parts"][0]["text"].as_str().unwrap().contains("Bharat Finance Buddy"));
    }
}
