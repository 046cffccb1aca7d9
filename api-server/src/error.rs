//! Error handling

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use kneeforce_core::{Error as CoreError, InputValidationError};
use serde_json::json;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Request errors
    #[error(transparent)]
    InvalidInput(#[from] InputValidationError),

    #[error("malformed request body: {0}")]
    BadRequest(String),

    // Model errors
    #[error("model is not loaded")]
    ModelUnavailable,

    #[error("{0}")]
    ShapeMismatch(String),

    // Generic errors
    #[error("{0}")]
    InternalError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::InvalidInput(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::ModelUnavailable => {
                (StatusCode::SERVICE_UNAVAILABLE, "Model is not loaded".to_string())
            }
            AppError::ShapeMismatch(msg) => {
                tracing::error!("Feature layout mismatch: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Feature layout mismatch".to_string())
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let mut body = json!({
            "error": error_message,
            "status": status.as_u16()
        });
        if let AppError::InvalidInput(e) = &self {
            body["field"] = json!(e.field());
            body["reason"] = json!(e.reason);
        }

        (status, Json(body)).into_response()
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InputValidation(e) => AppError::InvalidInput(e),
            CoreError::ShapeMismatch(e) => AppError::ShapeMismatch(e.to_string()),
            CoreError::ModelNotLoaded => AppError::ModelUnavailable,
            other => AppError::InternalError(other.to_string()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}
