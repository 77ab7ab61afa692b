use axum::{Json, extract::State, response::IntoResponse};

use crate::state::AppState;

/// GET /activity: the feed, oldest first.
pub async fn get_feed(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.stores.activity.get_feed())
}
