//! # REST API Interface Layer
//!
//! HTTP endpoints for the game, one module per area:
//!
//! - `profile_apis` `/api/profile`: onboarding, current profile, reset
//! - `quest_apis` `/api/quests` and `/api/session`: quest map and the quest flow
//! - `daily_apis` `/api/daily`: today's challenge and answering it
//! - `toolkit_apis` `/api/toolkit`: reference articles
//!
//! Handlers hold the game lock for the duration of one call, so requests are
//! applied one at a time against the single profile.

pub mod daily_apis;
pub mod profile_apis;
pub mod quest_apis;
pub mod toolkit_apis;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use shared::ErrorResponse;
use tracing::{error, warn};

use crate::domain::{GameError, QuestSessionError};

impl GameError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GameError::NeedsOnboarding | GameError::UnknownQuest(_) | GameError::EmptyDailyPool => {
                StatusCode::NOT_FOUND
            }
            GameError::AlreadyOnboarded
            | GameError::SessionActive(_)
            | GameError::NoActiveSession
            | GameError::AlreadyAnsweredToday => StatusCode::CONFLICT,
            GameError::Session(QuestSessionError::InvalidOption { .. }) | GameError::InvalidDailyAnswer { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            GameError::Session(QuestSessionError::AlreadyRevealed | QuestSessionError::NothingSelected) => {
                StatusCode::CONFLICT
            }
            GameError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GameError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        } else {
            warn!("Request rejected ({}): {}", status, self);
        }

        (status, Json(ErrorResponse { error: self.to_string() })).into_response()
    }
}
