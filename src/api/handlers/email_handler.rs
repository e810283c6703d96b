use axum::{Json, extract::State, response::IntoResponse};
use tracing::info;
use validator::Validate;

use crate::{
    api::{app_state::AppState, dto::email_dto::*},
    error::AppError,
    services::email::{OutboundEmail, html_template},
};

/// Sends a test message through the configured transport
pub async fn send_test_email(
    State(state): State<AppState>,
    Json(request): Json<SendTestEmailRequest>,
) -> Result<impl IntoResponse, AppError> {
    request.validate()?;

    let html = request.html.unwrap_or(true);
    let body = if html {
        html_template(&request.subject, &request.body)
    } else {
        request.body
    };

    let email = OutboundEmail {
        to: request.to.clone(),
        subject: request.subject.clone(),
        body,
        html,
        ..Default::default()
    };
    state.mailer.send(&email).await?;

    info!(to = %request.to, "test email dispatched");

    Ok(Json(SendTestEmailResponse {
        sent: true,
        message: "Test email dispatched".to_string(),
    }))
}
