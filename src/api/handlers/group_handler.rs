use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    api::{app_state::AppState, dto::group_dto::*},
    error::AppError,
    services::group::{CreateGroupInput, UpdateGroupInput},
};

pub async fn list_groups(
    State(state): State<AppState>,
    Query(params): Query<ListGroupsParams>,
) -> Result<impl IntoResponse, AppError> {
    let groups = state
        .group_service
        .list(params.active_only.unwrap_or(false))
        .await?;
    let total = groups.len();

    Ok(Json(GroupListResponse { groups, total }))
}

pub async fn get_group(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let detail = state.group_service.show(&id).await?;
    Ok(Json(GroupDetailResponse { detail }))
}

pub async fn create_group(
    State(state): State<AppState>,
    Json(request): Json<CreateGroupRequest>,
) -> Result<impl IntoResponse, AppError> {
    request.validate()?;

    let group = state
        .group_service
        .create(CreateGroupInput {
            name: request.name,
            description: request.description,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(group)))
}

pub async fn update_group(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateGroupRequest>,
) -> Result<impl IntoResponse, AppError> {
    request.validate()?;

    let group = state
        .group_service
        .update(
            &id,
            UpdateGroupInput {
                name: request.name,
                description: request.description,
                active: request.active,
            },
        )
        .await?;

    Ok(Json(group))
}

pub async fn delete_group(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.group_service.delete(&id).await?;

    Ok(Json(GroupActionResponse {
        id,
        message: "Group deleted successfully".to_string(),
    }))
}

pub async fn toggle_group_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let group = state.group_service.toggle_status(&id).await?;
    Ok(Json(group))
}
