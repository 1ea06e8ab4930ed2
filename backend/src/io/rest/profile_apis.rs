//! # REST API for the Player Profile
//!
//! Onboarding, reading the current profile and resetting all progress.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use shared::OnboardingRequest;
use tracing::info;

use crate::AppState;

/// Create a router for profile related APIs
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_profile).post(onboard).delete(reset_profile))
}

/// Current profile with its health band
pub async fn get_profile(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/profile");

    let game = state.game.lock().await;
    match game.profile_view() {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Finish onboarding and create the initial profile
pub async fn onboard(State(state): State<AppState>, Json(request): Json<OnboardingRequest>) -> impl IntoResponse {
    info!("POST /api/profile - request: {:?}", request);

    let mut game = state.game.lock().await;
    match game.onboard(request).await {
        Ok(response) => (StatusCode::CREATED, Json(response)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Delete the stored profile
pub async fn reset_profile(State(state): State<AppState>) -> impl IntoResponse {
    info!("DELETE /api/profile");

    let mut game = state.game.lock().await;
    match game.reset().await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}
