//! Trace ids and the error envelope
//!
//! Every response gets an `x-trace-id` header. Errors raised by handlers are
//! rendered as [`MessageResult`] with that trace id, and bare error statuses
//! produced by the router itself are mapped onto the same envelope.

use axum::{
    extract::{Request, State},
    http::{HeaderName, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::error::{
    ErrorCode, ErrorDetails, GenerationFailure, GenerationFailureBody, MessageResult,
    GENERATION_FAILED,
};
use crate::AppState;

pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");
pub const TRACE_ID_HEADER: HeaderName = HeaderName::from_static("x-trace-id");

/// Trace id of the current request, available to handlers as an extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceId(pub String);

fn new_trace_id() -> String {
    hex::encode(rand::random::<[u8; 16]>())
}

fn incoming_trace_id(request: &Request) -> Option<String> {
    request
        .headers()
        .get(&REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty() && id.len() <= 128)
        .map(str::to_string)
}

pub async fn error_envelope(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let trace_id = incoming_trace_id(&request).unwrap_or_else(new_trace_id);
    let path = request.uri().path().to_string();
    request.extensions_mut().insert(TraceId(trace_id.clone()));

    let mut response = next.run(request).await;
    let status = response.status();

    if let Some(details) = response.extensions_mut().remove::<ErrorDetails>() {
        tracing::debug!(%trace_id, %status, code = ?details.code, "Handler error");
        response = envelope(status, details.code, details.message, &trace_id);
    } else if let Some(GenerationFailure(cause)) = response.extensions_mut().remove::<GenerationFailure>() {
        tracing::error!(%trace_id, %cause, "PDF generation failed");
        if state.config.expose_error_details {
            let body = GenerationFailureBody {
                message: GENERATION_FAILED.to_string(),
                error: cause,
            };
            response = (status, Json(body)).into_response();
        }
    } else if let Some((status, code, message)) = map_bare_status(status, &path) {
        tracing::debug!(%trace_id, %status, %path, "Mapped bare error status");
        response = envelope(status, code, message, &trace_id);
    }

    if let Ok(value) = HeaderValue::from_str(&trace_id) {
        response.headers_mut().insert(TRACE_ID_HEADER, value);
    }
    response
}

/// Envelope for an error status that no handler described.
fn map_bare_status(status: StatusCode, path: &str) -> Option<(StatusCode, ErrorCode, String)> {
    if status.as_u16() < 400 {
        return None;
    }

    match status {
        StatusCode::BAD_REQUEST | StatusCode::INTERNAL_SERVER_ERROR => None,
        StatusCode::UNAUTHORIZED => Some((
            status,
            ErrorCode::UnAuthentication,
            format!("Unauthorized: {path}"),
        )),
        StatusCode::FORBIDDEN => Some((
            status,
            ErrorCode::UnAuthorization,
            format!("Forbidden: {path}"),
        )),
        StatusCode::NOT_FOUND => Some((status, ErrorCode::NotFound, format!("Not Found: {path}"))),
        StatusCode::METHOD_NOT_ALLOWED => Some((
            StatusCode::BAD_REQUEST,
            ErrorCode::InvalidInput,
            "No Route".to_string(),
        )),
        StatusCode::UNSUPPORTED_MEDIA_TYPE => Some((
            StatusCode::BAD_REQUEST,
            ErrorCode::InvalidInput,
            "Accept application/json".to_string(),
        )),
        other => Some((
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::InternalError,
            other.canonical_reason().unwrap_or("Unknown Error").to_string(),
        )),
    }
}

fn envelope(status: StatusCode, code: ErrorCode, message: String, trace_id: &str) -> Response {
    let body = MessageResult::failure(code, message, Some(trace_id.to_string()));
    (status, Json(body)).into_response()
}
