//! # REST API for the Daily Challenge

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use shared::DailyAnswerRequest;
use tracing::info;

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_daily_challenge))
        .route("/answer", post(answer_daily_challenge))
}

/// Today's question, without its answer
pub async fn get_daily_challenge(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/daily");

    let mut game = state.game.lock().await;
    match game.todays_challenge() {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn answer_daily_challenge(
    State(state): State<AppState>,
    Json(request): Json<DailyAnswerRequest>,
) -> impl IntoResponse {
    info!("POST /api/daily/answer - chosen: {}", request.chosen_index);

    let mut game = state.game.lock().await;
    match game.answer_daily(request.chosen_index).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => e.into_response(),
    }
}
