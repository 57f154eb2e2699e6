use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::services::booking::BookingError;
use crate::services::catalog::CatalogError;
use crate::services::contact::ContactError;
use crate::services::credentials::CredentialError;
use crate::services::store::StoreError;
use crate::services::validation::ValidationError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    BadRequest(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("{0}")]
    Conflict(String),
}

impl From<BookingError> for AppError {
    fn from(e: BookingError) -> Self {
        match e {
            BookingError::InsertFailed(e) | BookingError::Store(e) => AppError::Store(e),
            BookingError::NotFound => AppError::NotFound("booking".to_string()),
            e @ BookingError::InvalidTransition { .. } => AppError::Conflict(e.to_string()),
        }
    }
}

impl From<ContactError> for AppError {
    fn from(e: ContactError) -> Self {
        match e {
            ContactError::Store(e) => AppError::Store(e),
            ContactError::NotFound => AppError::NotFound("message".to_string()),
            e => AppError::BadRequest(e.to_string()),
        }
    }
}

impl From<CatalogError> for AppError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::Store(e) => AppError::Store(e),
            CatalogError::NotFound => AppError::NotFound("item".to_string()),
            e @ CatalogError::MissingTitle => AppError::BadRequest(e.to_string()),
        }
    }
}

impl From<CredentialError> for AppError {
    fn from(e: CredentialError) -> Self {
        match e {
            CredentialError::Store(e) => AppError::Store(e),
            CredentialError::WrongPassword => AppError::Unauthorized,
            e => AppError::BadRequest(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
        };

        // backend details stay in the logs
        let message = match &self {
            AppError::Store(e) => {
                tracing::error!(error = %e, "store request failed");
                "Something went wrong. Please try again later.".to_string()
            }
            AppError::Config(e) => {
                tracing::error!(error = %e, "configuration error");
                "Server is not configured correctly".to_string()
            }
            other => other.to_string(),
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (AppError::Validation(ValidationError::InvalidPhone), StatusCode::BAD_REQUEST),
            (AppError::Store(StoreError::Backend("x".into())), StatusCode::INTERNAL_SERVER_ERROR),
            (AppError::Unauthorized, StatusCode::UNAUTHORIZED),
            (AppError::NotFound("booking".into()), StatusCode::NOT_FOUND),
            (AppError::Conflict("no".into()), StatusCode::CONFLICT),
        ];
        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[test]
    fn test_booking_errors_map() {
        let err: AppError = BookingError::InvalidTransition { from: "confirmed", to: "pending" }.into();
        assert!(matches!(err, AppError::Conflict(_)));
        let err: AppError = BookingError::InsertFailed(StoreError::Backend("down".into())).into();
        assert!(matches!(err, AppError::Store(_)));
    }

    #[test]
    fn test_content_errors_map() {
        let err: AppError = CatalogError::MissingTitle.into();
        assert!(matches!(err, AppError::BadRequest(_)));
        let err: AppError = CatalogError::NotFound.into();
        assert!(matches!(err, AppError::NotFound(_)));
        let err: AppError = CredentialError::WrongPassword.into();
        assert!(matches!(err, AppError::Unauthorized));
        let err: AppError = CredentialError::TooShort.into();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
