//! Webhook surface behind the per-client API-key gate

use axum::{Router, middleware, routing::post};

use crate::api::app_state::AppState;
use crate::api::handlers::webhook_handler::chat_webhook;
use crate::security::middleware::api_key_gate;

/// Router for /webhook
pub fn create_webhook_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/chat", post(chat_webhook))
        .layer(middleware::from_fn_with_state(state, api_key_gate))
}
