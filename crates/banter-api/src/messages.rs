use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;

use banter_types::api::{ChatResponse, Claims, SendMessageRequest};

use crate::error::{join_status, store_status};
use crate::ingest::{IngestError, ingest_message};
use crate::state::AppState;

/// POST /chat/{title}: clean and store a message from the session user.
pub async fn send_message(
    State(state): State<AppState>,
    Path(title): Path<String>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    // Store writes block on SQLite; keep them off the async runtime
    let st = state.clone();
    let author = claims.username;
    let message = tokio::task::spawn_blocking(move || {
        ingest_message(&st.stores, &st.pipeline, &author, &title, &req.message)
    })
    .await
    .map_err(join_status)?
    .map_err(|e| match e {
        IngestError::UnknownAuthor(name) => {
            info!("Rejected message from unregistered user {}", name);
            StatusCode::UNAUTHORIZED
        }
        IngestError::UnknownConversation(_) => StatusCode::NOT_FOUND,
        IngestError::Store(e) => store_status(e),
    })?;

    Ok((StatusCode::CREATED, Json(message)))
}

/// GET /chat/{title}: the conversation and its messages, oldest first.
pub async fn get_messages(
    State(state): State<AppState>,
    Path(title): Path<String>,
) -> Result<impl IntoResponse, StatusCode> {
    let conversation = state
        .stores
        .conversations
        .get_conversation_with_title(&title)
        .ok_or(StatusCode::NOT_FOUND)?;

    let messages = state
        .stores
        .messages
        .get_messages_in_conversation(conversation.id);

    Ok(Json(ChatResponse {
        conversation,
        messages,
    }))
}
