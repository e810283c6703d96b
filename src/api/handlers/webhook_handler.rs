use axum::{Json, extract::Extension, response::IntoResponse};
use serde_json::json;
use tracing::debug;

use crate::{error::AppError, security::middleware::KeyContext};

/// Acknowledges inbound chat events from gated webhook clients
pub async fn chat_webhook(
    Extension(context): Extension<KeyContext>,
    Json(payload): Json<serde_json::Value>,
) -> Result<impl IntoResponse, AppError> {
    let key_id = context.key.as_ref().map(|k| k.id.as_str());
    debug!(
        full_access = context.full_access,
        key_id = key_id.unwrap_or("-"),
        "chat webhook received"
    );

    Ok(Json(json!({
        "received": true,
        "full_access": context.full_access,
        "size": payload.to_string().len(),
    })))
}
