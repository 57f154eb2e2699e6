use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::services::session;
use crate::state::AppState;

/// Checks the `Authorization: Bearer <token>` header for a valid admin session.
pub fn require_admin(state: &AppState, headers: &HeaderMap) -> Result<(), AppError> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let token = auth.strip_prefix("Bearer ").unwrap_or("");
    if token.is_empty() || !session::verify(&state.config.session_secret, token, state.clock.now()) {
        return Err(AppError::Unauthorized);
    }
    Ok(())
}

// POST /api/admin/login
#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    success: bool,
    token: String,
    expires_in: i64,
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    if !state.credentials.verify(&body.password).await? {
        tracing::warn!("failed admin login attempt");
        return Err(AppError::Unauthorized);
    }

    let token = session::issue(&state.config.session_secret, state.clock.now())
        .ok_or_else(|| AppError::Config("session secret rejected".to_string()))?;

    tracing::info!("admin logged in");
    Ok(Json(LoginResponse {
        success: true,
        token,
        expires_in: session::SESSION_TTL_SECS,
    }))
}

// POST /api/admin/change-password
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[serde(default, alias = "current_password")]
    pub current_password: String,
    #[serde(default, alias = "new_password")]
    pub new_password: String,
}

pub async fn change_password(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<ChangePasswordRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    require_admin(&state, &headers)?;
    state
        .credentials
        .change(&body.current_password, &body.new_password)
        .await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Password updated successfully",
    })))
}

// POST /api/admin/logout
pub async fn logout() -> Json<serde_json::Value> {
    Json(serde_json::json!({"success": true}))
}

// GET /api/admin/check
pub async fn check(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Json<serde_json::Value> {
    let authenticated = require_admin(&state, &headers).is_ok();
    Json(serde_json::json!({"authenticated": authenticated}))
}
