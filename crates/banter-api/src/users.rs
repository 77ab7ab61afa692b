use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;

use banter_types::api::{Claims, ProfileResponse, RegisterUserRequest, UpdateProfileRequest};
use banter_types::models::User;

use crate::error::{join_status, store_status};
use crate::state::AppState;

fn valid_username(name: &str) -> bool {
    (3..=32).contains(&name.len()) && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// POST /users: called by the auth service once it has hashed the password.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterUserRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    if !valid_username(&req.username) || req.password_hash.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    if state.stores.users.is_user_registered(&req.username) {
        return Err(StatusCode::CONFLICT);
    }

    let mut user = User::new(req.username, req.password_hash);
    user.bio = req.bio;
    user.language = req.language;

    let st = state.clone();
    let created = user.clone();
    tokio::task::spawn_blocking(move || st.stores.register_user(created))
        .await
        .map_err(join_status)?
        .map_err(store_status)?;

    info!("Registered user {}", user.name);
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /users: every registered user, oldest first.
pub async fn list_users(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.stores.users.get_all_users())
}

/// GET /users/{name}: public profile plus everything the user has posted.
pub async fn profile(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, StatusCode> {
    let user = state
        .stores
        .users
        .get_user(&name)
        .ok_or(StatusCode::NOT_FOUND)?;
    let messages = state.stores.messages.get_messages_by_author(user.id);

    Ok(Json(ProfileResponse { user, messages }))
}

/// PUT /users/{name}/profile: users may only edit their own profile.
pub async fn update_profile(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    if claims.username != name {
        return Err(StatusCode::FORBIDDEN);
    }

    let mut user = state
        .stores
        .users
        .get_user(&name)
        .ok_or(StatusCode::NOT_FOUND)?;
    user.bio = req.bio;
    user.language = req.language;

    let st = state.clone();
    let updated = user.clone();
    tokio::task::spawn_blocking(move || st.stores.users.update_user(updated))
        .await
        .map_err(join_status)?
        .map_err(store_status)?;

    Ok(Json(user))
}
