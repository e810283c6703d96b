//! Axum middleware for the gatekeeping pipeline and security headers.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};

use crate::api::app_state::AppState;
use crate::error::{AppError, Result};
use crate::models::app_key::AppKey;
use crate::models::user::User;
use crate::security::keys::KeyAccess;
use crate::security::roles::{UserRole, has_required_role};

/// Request extension attached by the api-key gate
#[derive(Debug, Clone)]
pub struct KeyContext {
    /// True when the private master key was presented
    pub full_access: bool,
    /// The matched client key, when not full access
    pub key: Option<AppKey>,
}

/// Request extension attached by the bearer-token middleware
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Best-effort client IP from proxy headers
pub fn client_ip(req: &Request) -> String {
    ip_from_headers(req.headers())
}

/// Same lookup for handlers that only hold the header map
pub fn ip_from_headers(headers: &HeaderMap) -> String {
    if let Some(forwarded) = headers.get("X-Forwarded-For").and_then(|h| h.to_str().ok()) {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    if let Some(real_ip) = headers.get("X-Real-IP").and_then(|h| h.to_str().ok()) {
        return real_ip.to_string();
    }

    "unknown".to_string()
}

fn header_value(req: &Request, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|h| h.to_str().ok())
        .map(|v| v.to_string())
}

fn count_if_rate_limited(state: &AppState, err: &AppError) {
    let (status, _): (u16, String) = err.into();
    if status == 429 {
        state.metrics.record_rate_limited();
    }
}

/// Private-key gate for the /api/sys surface
pub async fn private_key_gate(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response> {
    let api_key = header_value(&req, "apiKey");
    let ip = client_ip(&req);

    if let Err(err) = state.key_gate.check_private_key(api_key.as_deref(), &ip).await {
        count_if_rate_limited(&state, &err);
        return Err(err);
    }

    Ok(next.run(req).await)
}

/// API-key gate for webhook clients
pub async fn api_key_gate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response> {
    let api_key = header_value(&req, "apiKey");
    let ip = client_ip(&req);

    let access = match state.key_gate.check_app_key(api_key.as_deref(), &ip).await {
        Ok(access) => access,
        Err(err) => {
            count_if_rate_limited(&state, &err);
            return Err(err);
        }
    };

    let context = match access {
        KeyAccess::Full => KeyContext {
            full_access: true,
            key: None,
        },
        KeyAccess::Key(key) => KeyContext {
            full_access: false,
            key: Some(key),
        },
    };
    req.extensions_mut().insert(context);

    Ok(next.run(req).await)
}

/// Anonymous public-key gate for the /api/v1 surface
pub async fn anon_gate(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response> {
    let public_key = header_value(&req, "publicKey");
    state.key_gate.check_public_key(public_key.as_deref())?;
    Ok(next.run(req).await)
}

/// Bearer-token authentication
///
/// Resolves the token to a user and attaches it as a request extension.
pub async fn token_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|v| v.to_string())
        .ok_or_else(|| AppError::Authentication("Missing bearer token".to_string()))?;

    let user = state.auth_service.authenticate(&token).await?;
    req.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(req).await)
}

async fn role_gate(req: Request, next: Next, required: UserRole) -> Result<Response> {
    let current = req
        .extensions()
        .get::<CurrentUser>()
        .ok_or_else(|| AppError::Authentication("Not authenticated".to_string()))?;

    if !has_required_role(&current.0, required) {
        return Err(AppError::Authorization("Insufficient role".to_string()));
    }

    Ok(next.run(req).await)
}

/// Require at least the admin role; must run after `token_auth`
pub async fn require_admin(req: Request, next: Next) -> Result<Response> {
    role_gate(req, next, UserRole::Admin).await
}

/// Require at least the user role; must run after `token_auth`
pub async fn require_user(req: Request, next: Next) -> Result<Response> {
    role_gate(req, next, UserRole::User).await
}

/// Standard security headers on every response
pub async fn security_headers_middleware(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;

    let headers = response.headers_mut();
    headers.insert("X-Content-Type-Options", "nosniff".parse().unwrap());
    headers.insert("X-Frame-Options", "DENY".parse().unwrap());
    headers.insert(
        "Referrer-Policy",
        "strict-origin-when-cross-origin".parse().unwrap(),
    );
    headers.insert(
        "Strict-Transport-Security",
        "max-age=31536000; includeSubDomains".parse().unwrap(),
    );

    response
}
