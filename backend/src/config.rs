use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::domain::progression::RepeatRewardPolicy;
use crate::storage::sqlite::DATABASE_URL;

/// Environment variable naming the TOML config file
pub const CONFIG_PATH_ENV: &str = "BHARAT_MONEY_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "bharat_money.toml";
/// Environment variable overriding `advisory.api_key`
pub const API_KEY_ENV: &str = "BHARAT_MONEY_API_KEY";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub advisory: AdvisoryConfig,
    pub progression: ProgressionConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
    pub allowed_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:3000".to_string(),
            allowed_origin: "http://localhost:8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub database_url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_url: DATABASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisoryConfig {
    pub enabled: bool,
    pub api_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout_ms: u64,
}

impl Default for AdvisoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-3-flash-preview".to_string(),
            api_key: None,
            timeout_ms: 4000,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionConfig {
    pub repeat_rewards: RepeatRewardPolicy,
}

impl AppConfig {
    pub fn load(config_path: &Path) -> Result<AppConfig> {
        let config_content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

        let config: AppConfig = toml::from_str(&config_content).with_context(|| "Failed to parse config TOML")?;

        if config.advisory.timeout_ms == 0 {
            return Err(anyhow::anyhow!("advisory.timeout_ms must be greater than zero"));
        }

        Ok(config)
    }

    pub fn load_or_default(config_path: &Path) -> AppConfig {
        match Self::load(config_path) {
            Ok(config) => {
                info!("Loaded config from {:?}", config_path);
                config
            }
            Err(e) => {
                warn!("Failed to load config from {:?}: {:#}", config_path, e);
                info!("Using default config");
                AppConfig::default()
            }
        }
    }

    /// Config for the running process: file from `BHARAT_MONEY_CONFIG`, then
    /// the API key from `BHARAT_MONEY_API_KEY` when set
    pub fn from_env() -> AppConfig {
        let path = std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

        let config = Self::load_or_default(&path);
        config.with_api_key(std::env::var(API_KEY_ENV).ok())
    }

    fn with_api_key(mut self, api_key: Option<String>) -> AppConfig {
        if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
            self.advisory.api_key = Some(key);
        }
        self
    }
}
