use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::middleware::require_session;
use crate::state::AppState;
use crate::{activity, conversations, messages, users};

pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/users", get(users::list_users).post(users::register))
        .route("/users/{name}", get(users::profile))
        .route("/conversations", get(conversations::list_conversations))
        .route("/chat/{title}", get(messages::get_messages))
        .route("/activity", get(activity::get_feed));

    let protected_routes = Router::new()
        .route("/users/{name}/profile", put(users::update_profile))
        .route("/conversations", post(conversations::create_conversation))
        .route("/chat/{title}", post(messages::send_message))
        .layer(middleware::from_fn_with_state(state.clone(), require_session));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
