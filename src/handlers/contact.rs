use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::Deserialize;

use crate::errors::AppError;
use crate::handlers::admin::require_admin;
use crate::models::{ContactMessage, ContactSubmission};
use crate::state::AppState;

// POST /api/contact-messages
pub async fn create_message(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ContactSubmission>,
) -> Result<(StatusCode, Json<ContactMessage>), AppError> {
    let message = state.contacts.submit(&body).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

// GET /api/contact-messages
pub async fn list_messages(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<ContactMessage>>, AppError> {
    require_admin(&state, &headers)?;
    Ok(Json(state.contacts.list().await?))
}

// PUT /api/contact-messages/:id
#[derive(Deserialize)]
pub struct ReadUpdate {
    #[serde(default = "default_true")]
    pub is_read: bool,
}

fn default_true() -> bool {
    true
}

pub async fn update_message(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<ReadUpdate>,
) -> Result<Json<ContactMessage>, AppError> {
    require_admin(&state, &headers)?;
    Ok(Json(state.contacts.mark_read(id, body.is_read).await?))
}

// DELETE /api/contact-messages/:id
pub async fn delete_message(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    require_admin(&state, &headers)?;
    state.contacts.delete(id).await?;
    Ok(Json(serde_json::json!({"success": true})))
}
