//! Client surface behind the anonymous public-key gate
//!
//! Everything under /api/v1 requires the encrypted public key header.
//! Resource routes additionally require a bearer token; group mutations
//! and the preferences resource require the admin role.

use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};

use crate::api::app_state::AppState;
use crate::api::handlers::{
    app_key_handler, auth_handler::*, group_handler::*, preference_handler::*, user_handler,
};
use crate::security::middleware::{anon_gate, require_admin, token_auth};

/// Router for /api/v1
pub fn create_v1_router(state: AppState) -> Router<AppState> {
    // No bearer token needed; flows identify the account by email.
    let public = Router::new()
        .route("/auth/login", post(login))
        .route("/auth/password/reset", post(request_password_reset))
        .route("/auth/password/reset/confirm", post(confirm_password_reset))
        .route("/auth/email/verify", post(request_email_verification))
        .route(
            "/auth/email/verify/confirm",
            post(confirm_email_verification),
        );

    let authenticated = Router::new()
        .route("/auth/me", get(me))
        .route("/auth/logout", post(logout))
        .route("/auth/revoke-all", post(revoke_all))
        .route("/auth/password", put(update_password))
        .route("/users", get(user_handler::list_users))
        .route("/users/:id", get(user_handler::get_user))
        .route("/keys", get(app_key_handler::list_keys))
        .route("/keys/:id", get(app_key_handler::get_key))
        .route("/groups", get(list_groups))
        .route("/groups/:id", get(get_group))
        .layer(middleware::from_fn_with_state(state.clone(), token_auth));

    let admin = Router::new()
        .route("/groups", post(create_group))
        .route("/groups/:id", put(update_group))
        .route("/groups/:id", delete(delete_group))
        .route("/groups/:id/toggle", post(toggle_group_status))
        .route("/preferences", get(list_preferences))
        .route("/preferences/:name", get(get_preference))
        .route("/preferences/:name", post(create_preference))
        .route("/preferences/:name", put(update_preference))
        .route("/preferences/:name", delete(delete_preference))
        .layer(middleware::from_fn(require_admin))
        .layer(middleware::from_fn_with_state(state.clone(), token_auth));

    Router::new()
        .merge(public)
        .merge(authenticated)
        .merge(admin)
        .layer(middleware::from_fn_with_state(state, anon_gate))
}
