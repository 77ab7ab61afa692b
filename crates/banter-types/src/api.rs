use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Conversation, Message, User};

// -- Session Claims --

/// Session token claims. Tokens are issued by the auth service; this crate
/// only defines their shape so banter-api can validate them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub exp: usize,
}

// -- Users --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterUserRequest {
    pub username: String,
    pub password_hash: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub language: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateProfileRequest {
    pub bio: String,
    pub language: String,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: User,
    pub messages: Vec<Message>,
}

// -- Conversations --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateConversationRequest {
    pub title: String,
}

// -- Messages --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SendMessageRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub conversation: Conversation,
    pub messages: Vec<Message>,
}
