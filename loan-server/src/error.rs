//! Error handling
//!
//! Every prediction failure is recoverable: the caller gets a structured
//! body and the server keeps serving.

use axum::{
    extract::rejection::{FormRejection, JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use loan_core::PredictionError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Prediction errors
    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("{0}")]
    NotReady(String),

    // Request errors
    #[error("{0}")]
    BadRequest(String),

    // Generic errors
    #[error("{0}")]
    InternalError(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingField(_) | AppError::InvalidValue { .. } | AppError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::NotReady(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable kind
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::MissingField(_) => "missing_field",
            AppError::InvalidValue { .. } => "invalid_value",
            AppError::NotReady(_) => "not_ready",
            AppError::BadRequest(_) => "bad_request",
            AppError::InternalError(_) => "internal_error",
        }
    }

    pub fn field(&self) -> Option<&str> {
        match self {
            AppError::MissingField(field) | AppError::InvalidValue { field, .. } => Some(field),
            _ => None,
        }
    }

    /// Message safe to show to the caller
    pub fn public_message(&self) -> String {
        match self {
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = Json(json!({
            "error": self.kind(),
            "message": self.public_message(),
            "field": self.field(),
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<PredictionError> for AppError {
    fn from(err: PredictionError) -> Self {
        match err {
            PredictionError::MissingField { field } => AppError::MissingField(field),
            PredictionError::InvalidValue { field, reason } => AppError::InvalidValue { field, reason },
            PredictionError::NotReady(reason) => AppError::NotReady(format!("predictor not ready: {}", reason)),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<FormRejection> for AppError {
    fn from(rejection: FormRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<handlebars::RenderError> for AppError {
    fn from(err: handlebars::RenderError) -> Self {
        AppError::InternalError(format!("template render failed: {}", err))
    }
}
