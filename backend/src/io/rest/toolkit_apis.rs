use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use tracing::info;

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_toolkit))
}

/// Reference articles, available before onboarding too
pub async fn get_toolkit(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/toolkit");

    let game = state.game.lock().await;
    (StatusCode::OK, Json(game.toolkit())).into_response()
}

#[cfg(test)]
mod tests {
    use crate::io::rest::test_support::{parse, send, test_router};
    use axum::http::StatusCode;
    use shared::ToolkitResponse;

    #[tokio::test]
    async fn test_toolkit_items() {
        let router = test_router().await;

        let (status, body) = send(&router, "GET", "/api/toolkit", None).await;
        assert_eq!(status, StatusCode::OK);
        let toolkit: ToolkitResponse = parse(&body);
        assert_eq!(toolkit.items.len(), 3);
        assert_eq!(toolkit.items[0].id, "t1");
    }
}
