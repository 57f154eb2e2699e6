use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::handlers::admin::require_admin;
use crate::models::{BookingOutcome, BookingRecord, BookingSource, BookingStatus, BookingSubmission};
use crate::state::AppState;

const NOTIFICATION_WARNING: &str =
    "Your booking was saved, but we could not send the notification email. We will still contact you.";

#[derive(Serialize)]
pub struct BookingCreated {
    success: bool,
    message: &'static str,
    booking: BookingRecord,
    notification_sent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    warning: Option<&'static str>,
}

impl BookingCreated {
    pub fn new(booking: BookingRecord, notification_sent: bool) -> Self {
        Self {
            success: true,
            message: "Booking submitted successfully! We will contact you soon.",
            booking,
            notification_sent,
            warning: (!notification_sent).then_some(NOTIFICATION_WARNING),
        }
    }
}

/// Runs a submission through the pipeline and maps the outcome for HTTP.
pub async fn submit(
    state: &AppState,
    submission: &BookingSubmission,
    source: BookingSource,
) -> Result<BookingCreated, AppError> {
    match state.bookings.submit(submission, source).await? {
        BookingOutcome::Rejected { reason } => Err(reason.into()),
        BookingOutcome::Completed {
            record,
            notification_sent,
        } => Ok(BookingCreated::new(record, notification_sent)),
    }
}

// POST /api/bookings
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    Json(submission): Json<BookingSubmission>,
) -> Result<(StatusCode, Json<BookingCreated>), AppError> {
    let created = submit(&state, &submission, BookingSource::WebForm).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

// GET /api/bookings
pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<BookingRecord>>, AppError> {
    require_admin(&state, &headers)?;
    Ok(Json(state.bookings.list().await?))
}

// PUT /api/bookings/:id
#[derive(Deserialize)]
pub struct StatusUpdate {
    pub status: String,
}

pub async fn update_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<StatusUpdate>,
) -> Result<Json<BookingRecord>, AppError> {
    require_admin(&state, &headers)?;

    let next = BookingStatus::parse(&body.status)
        .ok_or_else(|| AppError::BadRequest(format!("unknown status: {}", body.status)))?;

    Ok(Json(state.bookings.update_status(id, next).await?))
}

// DELETE /api/bookings/:id
pub async fn delete_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    require_admin(&state, &headers)?;
    state.bookings.delete(id).await?;
    Ok(Json(serde_json::json!({"success": true})))
}
