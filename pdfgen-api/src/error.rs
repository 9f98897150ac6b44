//! API errors and the JSON error envelope
//!
//! Handlers return [`AppError`]. Its response carries an [`ErrorDetails`]
//! extension which the envelope middleware turns into the final body once
//! the request's trace id is known.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error category reported to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    Unknown,
    InvalidInput,
    NotFound,
    UnAuthentication,
    UnAuthorization,
    Forbidden,
    Conflict,
    InternalError,
    ServiceUnavailable,
}

/// Body of every error response except generation failures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ErrorCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub trace_id: Option<String>,
}

impl MessageResult {
    pub fn failure(code: ErrorCode, message: impl Into<String>, trace_id: Option<String>) -> Self {
        Self {
            success: false,
            error_code: Some(code),
            message: Some(message.into()),
            trace_id,
        }
    }
}

/// Body returned when PDF generation itself fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationFailureBody {
    pub message: String,
    pub error: String,
}

pub const GENERATION_FAILED: &str = "Failed to generate PDF";
pub const GENERIC_ERROR: &str = "An unexpected error occurred";

/// Code and message of a handler error, attached to its response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDetails {
    pub code: ErrorCode,
    pub message: String,
}

/// Cause of a generation failure, attached to its response so the
/// middleware can decide whether to reveal it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationFailure(pub String);

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    ServerError(String),

    #[error("PDF generation failed: {0}")]
    Generation(#[from] pdfgen::PdfError),

    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) | AppError::Conflict(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::ServerError(_) | AppError::Generation(_) | AppError::Unexpected(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn error_code(&self) -> ErrorCode {
        match self {
            AppError::BadRequest(_) => ErrorCode::InvalidInput,
            AppError::Conflict(_) => ErrorCode::Conflict,
            AppError::NotFound(_) => ErrorCode::NotFound,
            AppError::Unauthorized(_) => ErrorCode::UnAuthentication,
            AppError::Forbidden(_) => ErrorCode::Forbidden,
            AppError::ServerError(_) | AppError::Generation(_) => ErrorCode::InternalError,
            AppError::Unexpected(_) => ErrorCode::Unknown,
        }
    }

    /// Message safe to show to clients.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Unexpected(_) => GENERIC_ERROR.to_string(),
            AppError::Generation(_) => GENERATION_FAILED.to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if let AppError::Generation(e) = &self {
            tracing::error!(error = %e, "PDF generation failed");
            let body = GenerationFailureBody {
                message: GENERATION_FAILED.to_string(),
                error: "Internal server error".to_string(),
            };
            let mut response = (status, Json(body)).into_response();
            response
                .extensions_mut()
                .insert(GenerationFailure(e.to_string()));
            return response;
        }

        if status.is_server_error() {
            tracing::error!(error = ?self, "Request failed");
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }

        let details = ErrorDetails {
            code: self.error_code(),
            message: self.public_message(),
        };
        let body = MessageResult::failure(details.code, details.message.clone(), None);
        let mut response = (status, Json(body)).into_response();
        response.extensions_mut().insert(details);
        response
    }
}
