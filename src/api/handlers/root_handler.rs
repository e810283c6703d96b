use axum::{Json, response::IntoResponse};
use serde_json::json;

/// Liveness probe at the service root
pub async fn root() -> impl IntoResponse {
    Json(json!({ "online": true }))
}
