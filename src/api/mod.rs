//! REST API surface

#[cfg(test)]
mod api_tests;
pub mod app_state;
pub mod dto;
pub mod handlers;
pub mod routes;

use axum::{Router, routing::get, routing::post};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::api::app_state::AppState;
use crate::error::AppError;
use crate::observability::metrics_middleware;
use crate::security::middleware::security_headers_middleware;

pub fn create_router(app_state: AppState) -> Router {
    let metrics = app_state.metrics.clone();
    Router::new()
        .route("/", get(handlers::root_handler::root))
        .route("/setup/check", get(handlers::setup_handler::setup_check))
        .route("/setup/create", post(handlers::setup_handler::setup_create))
        .route(
            "/api/test/email",
            post(handlers::email_handler::send_test_email),
        )
        .nest("/api/sys", routes::sys_routes::create_sys_router(app_state.clone()))
        .nest("/api/v1", routes::v1_routes::create_v1_router(app_state.clone()))
        .nest(
            "/webhook",
            routes::webhook_routes::create_webhook_router(app_state.clone()),
        )
        .layer(axum::middleware::from_fn(security_headers_middleware))
        .layer(axum::middleware::from_fn(move |req, next| {
            metrics_middleware(req, next, metrics.clone())
        }))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}

pub async fn initialize_api(app_state: AppState) -> Result<Router, AppError> {
    tracing::info!("Initializing API router...");
    Ok(create_router(app_state))
}
