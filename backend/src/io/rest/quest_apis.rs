//! # REST API for Quests
//!
//! The quest map plus the single active quest session: open a quest, reveal
//! an option, poll for the advisory tip, then finalize or cancel.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde_json::json;
use shared::SelectOptionRequest;
use tracing::info;

use crate::AppState;

/// Routes under `/api/quests`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_quest_map))
        .route("/:quest_id/start", post(start_quest))
}

/// Routes under `/api/session`
pub fn session_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_session))
        .route("/select", post(select_option))
        .route("/finalize", post(finalize_quest))
        .route("/cancel", post(cancel_quest))
}

pub async fn get_quest_map(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/quests");

    let game = state.game.lock().await;
    match game.quest_map() {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn start_quest(State(state): State<AppState>, Path(quest_id): Path<String>) -> impl IntoResponse {
    info!("POST /api/quests/{}/start", quest_id);

    let mut game = state.game.lock().await;
    match game.start_quest(&quest_id) {
        Ok(response) => (StatusCode::CREATED, Json(response)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Active session and its tip, if one has arrived
pub async fn get_session(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/session");

    let game = state.game.lock().await;
    match game.session_status() {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn select_option(
    State(state): State<AppState>,
    Json(request): Json<SelectOptionRequest>,
) -> impl IntoResponse {
    info!("POST /api/session/select - option: {}", request.option_index);

    let mut game = state.game.lock().await;
    match game.select_option(request.option_index) {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn finalize_quest(State(state): State<AppState>) -> impl IntoResponse {
    info!("POST /api/session/finalize");

    let mut game = state.game.lock().await;
    match game.finalize_quest().await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn cancel_quest(State(state): State<AppState>) -> impl IntoResponse {
    info!("POST /api/session/cancel");

    let mut game = state.game.lock().await;
    let cancelled = game.cancel_quest();
    (StatusCode::OK, Json(json!({ "cancelled": cancelled }))).into_response()
}

#[cfg(test)]
mod tests {
    use crate::io::rest::test_support::{onboarded_router, parse, send};
    use axum::http::StatusCode;
    use shared::{FinalizeQuestResponse, QuestMapResponse, RevealResponse, SessionStatusResponse, StartQuestResponse};

    #[tokio::test]
    async fn test_quest_map_lists_catalog() {
        let router = onboarded_router().await;

        let (status, body) = send(&router, "GET", "/api/quests", None).await;
        assert_eq!(status, StatusCode::OK);

        let map: QuestMapResponse = parse(&body);
        assert_eq!(map.total_count, 4);
        assert_eq!(map.completed_count, 0);
        assert_eq!(map.quests[0].id, "q1");
    }

    #[tokio::test]
    async fn test_full_quest_flow() {
        let router = onboarded_router().await;

        let (status, body) = send(&router, "POST", "/api/quests/q2/start", None).await;
        assert_eq!(status, StatusCode::CREATED);
        let started: StartQuestResponse = parse(&body);
        assert_eq!(started.quest.options.len(), 2);

        let (status, body) = send(&router, "POST", "/api/session/select", Some(r#"{"optionIndex":1}"#)).await;
        assert_eq!(status, StatusCode::OK);
        let reveal: RevealResponse = parse(&body);
        assert_eq!(reveal.session_id, started.session_id);
        assert_eq!(reveal.headline, "Smart Choice!");

        let (status, body) = send(&router, "GET", "/api/session", None).await;
        assert_eq!(status, StatusCode::OK);
        let session: SessionStatusResponse = parse(&body);
        assert_eq!(session.selected_option, Some(1));

        let (status, body) = send(&router, "POST", "/api/session/finalize", None).await;
        assert_eq!(status, StatusCode::OK);
        let finished: FinalizeQuestResponse = parse(&body);
        assert_eq!(finished.profile.xp, 60);
        assert_eq!(finished.profile.coins, 130);
        assert_eq!(finished.profile.health_score, 70);
        assert_eq!(finished.new_badges, vec!["Budget Hero".to_string()]);

        let (status, _) = send(&router, "GET", "/api/session", None).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_second_selection_rejected() {
        let router = onboarded_router().await;
        send(&router, "POST", "/api/quests/q1/start", None).await;
        send(&router, "POST", "/api/session/select", Some(r#"{"optionIndex":0}"#)).await;

        let (status, _) = send(&router, "POST", "/api/session/select", Some(r#"{"optionIndex":1}"#)).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_invalid_option_and_unknown_quest() {
        let router = onboarded_router().await;

        let (status, _) = send(&router, "POST", "/api/quests/nope/start", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        send(&router, "POST", "/api/quests/q1/start", None).await;
        let (status, _) = send(&router, "POST", "/api/session/select", Some(r#"{"optionIndex":9}"#)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_cancel_is_idempotent() {
        let router = onboarded_router().await;
        send(&router, "POST", "/api/quests/q3/start", None).await;

        let (status, body) = send(&router, "POST", "/api/session/cancel", None).await;
        assert_eq!(status, StatusCode::OK);
        let value: serde_json::Value = parse(&body);
        assert_eq!(value["cancelled"], true);

        let (_, body) = send(&router, "POST", "/api/session/cancel", None).await;
        let value: serde_json::Value = parse(&body);
        assert_eq!(value["cancelled"], false);
    }
}
