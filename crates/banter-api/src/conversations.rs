use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;

use banter_types::api::{Claims, CreateConversationRequest};
use banter_types::models::Conversation;

use crate::error::{join_status, store_status};
use crate::state::AppState;

const MAX_TITLE_LEN: usize = 64;

fn valid_title(title: &str) -> bool {
    !title.is_empty()
        && title.len() <= MAX_TITLE_LEN
        && title.chars().all(|c| c.is_ascii_alphanumeric())
}

/// GET /conversations: every conversation, in creation order.
pub async fn list_conversations(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.stores.conversations.get_all_conversations())
}

/// POST /conversations: create a conversation owned by the session user.
pub async fn create_conversation(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateConversationRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let owner = state
        .stores
        .users
        .get_user(&claims.username)
        .ok_or(StatusCode::UNAUTHORIZED)?;

    if !valid_title(&req.title) {
        return Err(StatusCode::BAD_REQUEST);
    }
    if state.stores.conversations.is_title_taken(&req.title) {
        return Err(StatusCode::CONFLICT);
    }

    let conversation = Conversation::new(owner.id, req.title);

    let st = state.clone();
    let created = conversation.clone();
    tokio::task::spawn_blocking(move || st.stores.create_conversation(created, &owner))
        .await
        .map_err(join_status)?
        .map_err(store_status)?;

    info!("Conversation {} created by {}", conversation.title, claims.username);
    Ok((StatusCode::CREATED, Json(conversation)))
}
