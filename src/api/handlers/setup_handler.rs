use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::info;
use validator::Validate;

use crate::{
    api::{app_state::AppState, dto::setup_dto::*, dto::user_dto::UserResponse},
    error::AppError,
};

pub async fn setup_check(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let setup_required = state.user_service.setup_required().await?;
    Ok(Json(SetupCheckResponse { setup_required }))
}

/// One-shot creation of the initial super admin
pub async fn setup_create(
    State(state): State<AppState>,
    Json(request): Json<SetupCreateRequest>,
) -> Result<impl IntoResponse, AppError> {
    request.validate()?;

    let user = state
        .user_service
        .create_super_admin(
            &request.name,
            &request.email,
            &request.password,
            &request.password_confirmation,
        )
        .await?;

    info!(user_id = %user.id, "initial super admin created");

    Ok((
        StatusCode::CREATED,
        Json(SetupCreateResponse {
            user: UserResponse::from(user),
            message: "Setup completed".to_string(),
        }),
    ))
}
