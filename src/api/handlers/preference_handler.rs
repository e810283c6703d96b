use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    api::{app_state::AppState, dto::preference_dto::*},
    error::AppError,
};

pub async fn list_preferences(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let preferences = state.preference_service.list().await?;
    let total = preferences.len();

    Ok(Json(PreferenceListResponse { preferences, total }))
}

pub async fn get_preference(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let preference = state.preference_service.show(&name).await?;
    Ok(Json(preference))
}

pub async fn create_preference(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(request): Json<PreferenceValueRequest>,
) -> Result<impl IntoResponse, AppError> {
    let preference = state.preference_service.store(&name, request.value).await?;
    Ok((StatusCode::CREATED, Json(preference)))
}

pub async fn update_preference(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(request): Json<PreferenceValueRequest>,
) -> Result<impl IntoResponse, AppError> {
    let preference = state
        .preference_service
        .update(&name, request.value)
        .await?;
    Ok(Json(preference))
}

pub async fn delete_preference(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.preference_service.delete(&name).await?;

    Ok(Json(PreferenceActionResponse {
        name,
        message: "Preference deleted successfully".to_string(),
    }))
}
