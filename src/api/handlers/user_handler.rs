use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::debug;
use validator::Validate;

use crate::{
    api::{app_state::AppState, dto::user_dto::*},
    error::AppError,
    services::user::{CreateUserInput, UpdateUserInput},
};

pub async fn list_users(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let users = state.user_service.list().await?;
    let total = users.len();

    Ok(Json(UserListResponse {
        users: users.into_iter().map(UserResponse::from).collect(),
        total,
    }))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let user = state.user_service.find(&id).await?;
    Ok(Json(UserResponse::from(user)))
}

pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    request.validate()?;
    debug!(email = %request.email, "creating user");

    let user = state
        .user_service
        .create(CreateUserInput {
            name: request.name,
            last_name: request.last_name,
            email: request.email,
            username: request.username,
            password: request.password,
            role: request.role,
            active: request.active,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    request.validate()?;

    let user = state
        .user_service
        .update(
            &id,
            UpdateUserInput {
                name: request.name,
                last_name: request.last_name,
                email: request.email,
                username: request.username,
                password: request.password,
                role: request.role,
                active: request.active,
                settings: request.settings,
            },
        )
        .await?;

    Ok(Json(UserResponse::from(user)))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.user_service.delete(&id).await?;

    Ok(Json(UserActionResponse {
        id,
        message: "User deleted successfully".to_string(),
    }))
}

/// Irreversibly scrubs the account instead of deleting the row
pub async fn anonymize_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    debug!(user_id = %id, "anonymizing user");
    state.user_service.anonymize(&id).await?;

    Ok(Json(UserActionResponse {
        id,
        message: "User anonymized successfully".to_string(),
    }))
}
