use std::sync::Arc;

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use crate::errors::AppError;
use crate::handlers::bookings;
use crate::models::{BookingSource, BookingSubmission};
use crate::services::chatbot;
use crate::state::AppState;

const CHATBOT_DISABLED: &str = "Chatbot is currently disabled. Please contact us directly.";

#[derive(Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub booking: Option<BookingSubmission>,
}

// POST /api/chatbot
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ChatRequest>,
) -> Result<Response, AppError> {
    if let Some(submission) = body.booking {
        let created = bookings::submit(&state, &submission, BookingSource::Chatbot).await?;
        return Ok(Json(created).into_response());
    }

    let config = state.config_cache.get().await;
    if !config.chatbot_enabled() {
        return Ok(Json(serde_json::json!({
            "success": false,
            "message": CHATBOT_DISABLED,
        }))
        .into_response());
    }

    let message = body.message.unwrap_or_default();
    let payload = chatbot::respond(&message, &config);

    tracing::debug!(category = %payload.category, "chatbot reply");
    Ok(Json(payload).into_response())
}
