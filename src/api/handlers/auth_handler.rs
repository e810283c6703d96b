use axum::{
    Json,
    extract::{Extension, State},
    http::{HeaderMap, header},
    response::IntoResponse,
};
use tracing::debug;
use validator::Validate;

use crate::{
    api::{app_state::AppState, dto::auth_dto::*, dto::user_dto::UserResponse},
    error::AppError,
    security::middleware::{CurrentUser, ip_from_headers},
};

/// Decrypt one credential field; malformed payloads are a validation error
fn decrypt_field(state: &AppState, field: &str, value: &str) -> Result<String, AppError> {
    state
        .encryption
        .decrypt_base64(value)
        .map_err(|_| AppError::Validation(format!("{} must be an encrypted payload", field)))
}

fn bearer_token(headers: &HeaderMap) -> Result<String, AppError> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|v| v.to_string())
        .ok_or_else(|| AppError::Authentication("Missing bearer token".to_string()))
}

pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    request.validate()?;

    let username = decrypt_field(&state, "username", &request.username)?;
    let password = decrypt_field(&state, "password", &request.password)?;
    let ip = ip_from_headers(&headers);

    debug!("login attempt");
    let result = match state.auth_service.login(&username, &password, &ip).await {
        Ok(result) => {
            state.metrics.record_auth(true);
            result
        }
        Err(err) => {
            state.metrics.record_auth(false);
            let (status, _): (u16, String) = (&err).into();
            if status == 429 {
                state.metrics.record_rate_limited();
            }
            return Err(err);
        }
    };

    Ok(Json(LoginResponse {
        token: result.token,
        user: UserResponse::from(result.user),
    }))
}

pub async fn me(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let user = state.auth_service.me(&current.0.id).await?;
    Ok(Json(UserResponse::from(user)))
}

pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let token = bearer_token(&headers)?;
    state.auth_service.logout(&token).await?;
    Ok(Json(AuthMessageResponse::new("Logged out")))
}

pub async fn revoke_all(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    state.auth_service.revoke_all(&current.0.id).await?;
    Ok(Json(AuthMessageResponse::new("All sessions revoked")))
}

pub async fn update_password(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(request): Json<UpdatePasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    request.validate()?;

    state
        .auth_service
        .update_password(&current.0.id, &request.current_password, &request.password)
        .await?;

    Ok(Json(AuthMessageResponse::new("Password updated")))
}

/// Always answers with the same message so addresses cannot be probed
pub async fn request_password_reset(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<PasswordResetRequest>,
) -> Result<impl IntoResponse, AppError> {
    request.validate()?;

    let ip = ip_from_headers(&headers);
    state
        .auth_service
        .request_password_reset(&request.email, &ip)
        .await?;

    Ok(Json(AuthMessageResponse::new(
        "If the address exists, a reset email has been sent",
    )))
}

pub async fn confirm_password_reset(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<PasswordResetConfirmRequest>,
) -> Result<impl IntoResponse, AppError> {
    request.validate()?;

    let ip = ip_from_headers(&headers);
    state
        .auth_service
        .confirm_password_reset(&request.email, &request.token, &request.password, &ip)
        .await?;

    Ok(Json(AuthMessageResponse::new("Password has been reset")))
}

pub async fn request_email_verification(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<EmailVerificationRequest>,
) -> Result<impl IntoResponse, AppError> {
    request.validate()?;

    let ip = ip_from_headers(&headers);
    state
        .auth_service
        .request_email_verification(&request.email, &ip)
        .await?;

    Ok(Json(AuthMessageResponse::new(
        "If the address exists, a verification email has been sent",
    )))
}

pub async fn confirm_email_verification(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<EmailVerificationConfirmRequest>,
) -> Result<impl IntoResponse, AppError> {
    request.validate()?;

    let ip = ip_from_headers(&headers);
    state
        .auth_service
        .confirm_email_verification(&request.email, &request.token, &ip)
        .await?;

    Ok(Json(AuthMessageResponse::new("Email verified")))
}
