use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::debug;
use validator::Validate;

use crate::{
    api::{app_state::AppState, dto::app_key_dto::*},
    error::AppError,
    services::app_key::{CreateAppKeyInput, UpdateAppKeyInput},
};

const DEFAULT_LOG_LIMIT: usize = 50;
const MAX_LOG_LIMIT: usize = 500;

pub async fn list_keys(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let keys = state.app_key_service.list().await?;
    let total = keys.len();

    Ok(Json(AppKeyListResponse {
        keys: keys.into_iter().map(AppKeyResponse::from).collect(),
        total,
    }))
}

pub async fn get_key(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let key = state.app_key_service.find(&id).await?;
    Ok(Json(AppKeyResponse::from(key)))
}

pub async fn create_key(
    State(state): State<AppState>,
    Json(request): Json<CreateAppKeyRequest>,
) -> Result<impl IntoResponse, AppError> {
    request.validate()?;
    debug!(description = %request.description, "creating api key");

    let key = state
        .app_key_service
        .create(CreateAppKeyInput {
            description: request.description,
            value: request.value,
            permission: request.permission,
            days_expires: request.days_expires,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(AppKeyResponse::from(key))))
}

pub async fn update_key(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateAppKeyRequest>,
) -> Result<impl IntoResponse, AppError> {
    request.validate()?;

    let key = state
        .app_key_service
        .update(
            &id,
            UpdateAppKeyInput {
                description: request.description,
                active: request.active,
                permission: request.permission,
                days_expires: request.days_expires,
            },
        )
        .await?;

    Ok(Json(AppKeyResponse::from(key)))
}

pub async fn delete_key(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.app_key_service.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn block_key(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<BlockAppKeyRequest>,
) -> Result<impl IntoResponse, AppError> {
    debug!(key_id = %id, blocked = request.blocked, "toggling api key block");
    state
        .app_key_service
        .set_blocked(&id, request.blocked)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_access_logs(
    State(state): State<AppState>,
    Query(params): Query<AccessLogParams>,
) -> Result<impl IntoResponse, AppError> {
    let limit = params.limit.unwrap_or(DEFAULT_LOG_LIMIT).min(MAX_LOG_LIMIT);
    let start = params.start.unwrap_or(0);

    let logs = state.app_key_service.access_logs(limit, start).await?;

    Ok(Json(AccessLogListResponse { logs, limit, start }))
}
