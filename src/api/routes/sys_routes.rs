//! Administration surface behind the private-key gate

use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};

use crate::api::app_state::AppState;
use crate::api::handlers::{app_key_handler::*, user_handler::*};
use crate::security::middleware::private_key_gate;

/// Router for /api/sys; every route requires the private master key
pub fn create_sys_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users", post(create_user))
        .route("/users/:id", get(get_user))
        .route("/users/:id", put(update_user))
        .route("/users/:id", delete(delete_user))
        .route("/users/:id/anonymize", delete(anonymize_user))
        .route("/keys", get(list_keys))
        .route("/keys", post(create_key))
        .route("/keys/:id", get(get_key))
        .route("/keys/:id", put(update_key))
        .route("/keys/:id", delete(delete_key))
        .route("/keys/:id/block", post(block_key))
        .route("/logs/access", get(list_access_logs))
        .layer(middleware::from_fn_with_state(state, private_key_gate))
}
