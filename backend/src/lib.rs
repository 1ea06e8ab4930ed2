//! # Bharat Money Quest Backend
//!
//! Progression and rewards engine behind the Bharat Money Quest finance game.
//!
//! ## Architecture
//!
//! ```text
//! UI (any HTTP client)
//!     ↓
//! IO Layer (REST API)
//!     ↓
//! Domain Layer (progression rules, quest sessions, daily challenge)
//!     ↓
//! Storage Layer (profile record in a SQLite key-value table)
//! ```
//!
//! The progression engine is pure: profiles go in, new profiles come out.
//! [`domain::GameService`] owns the live profile, persists it after every
//! transition and keeps it in memory even when a save fails.

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

use anyhow::{Context, Result};
use axum::{
    http::{HeaderValue, Method},
    Router,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::domain::{AdvisoryKit, ContentCatalog, GameService, ProgressionEngine, SystemClock};
use crate::io::rest::{daily_apis, profile_apis, quest_apis, toolkit_apis};
use crate::storage::{ProfileRepository, SqliteStore};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub game: Arc<Mutex<GameService>>,
}

impl AppState {
    pub fn new(game: GameService) -> Self {
        Self {
            game: Arc::new(Mutex::new(game)),
        }
    }
}

/// Open storage, load the catalog and restore the stored profile
pub async fn initialize_backend(config: &AppConfig) -> Result<AppState> {
    info!("Setting up database at {}", config.storage.database_url);
    let store = SqliteStore::new(&config.storage.database_url)
        .await
        .context("Failed to open profile database")?;
    let repository = ProfileRepository::new(Arc::new(store));

    let catalog = ContentCatalog::bundled();
    info!(
        "Content catalog {} loaded: {} quests, {} daily challenges",
        catalog.version(),
        catalog.quest_count(),
        catalog.daily_pool().len()
    );

    let engine = ProgressionEngine::for_catalog(&catalog).with_repeat_rewards(config.progression.repeat_rewards);
    let advisory = AdvisoryKit::from_config(&config.advisory);

    let mut game = GameService::new(repository, catalog, engine, Arc::new(SystemClock), advisory);
    game.load().await;

    info!("Setting up application state");
    Ok(AppState::new(game))
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState, allowed_origin: &str) -> Router {
    // CORS setup to allow the UI to make requests
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(Any);
    let cors = match allowed_origin.parse::<HeaderValue>() {
        Ok(origin) => cors.allow_origin(origin),
        Err(e) => {
            warn!("Invalid allowed origin '{}' ({}), allowing any origin", allowed_origin, e);
            cors.allow_origin(Any)
        }
    };

    let api_routes = Router::new()
        .nest("/profile", profile_apis::router())
        .nest("/quests", quest_apis::router())
        .nest("/session", quest_apis::session_router())
        .nest("/daily", daily_apis::router())
        .nest("/toolkit", toolkit_apis::router());

    Router::new().nest("/api", api_routes).layer(cors).with_state(app_state)
}
