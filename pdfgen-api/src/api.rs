use axum::{
    extract::{rejection::JsonRejection, Extension, FromRequest, Request, State},
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Local, NaiveDateTime};
use pdfgen::PdfModel;
use serde::{Deserialize, Serialize};

use crate::config::ServerConfig;
use crate::error::AppError;
use crate::middleware::TraceId;
use crate::AppState;

/// Request payload for the generate endpoint
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfRequest {
    /// Document title, "Confidential Document" when omitted
    #[serde(default, alias = "Title")]
    pub title: Option<String>,
    /// Text to lay out, one logical line per newline
    #[serde(default, alias = "Content")]
    pub content: Option<String>,
    /// Password protecting the document
    #[serde(default, alias = "Password")]
    pub password: Option<String>,
}

impl PdfRequest {
    /// Checks the request against the configured password policy.
    pub fn validate(self, config: &ServerConfig) -> Result<PdfModel, AppError> {
        let mut errors = Vec::new();

        let content = self.content.unwrap_or_default();
        if content.trim().is_empty() {
            errors.push("The Content field is required.".to_string());
        }

        let password = self.password.filter(|p| !p.trim().is_empty());
        match &password {
            None if config.require_password => {
                errors.push("The Password field is required.".to_string());
            }
            Some(p) if p.chars().count() < config.min_password_length => {
                errors.push(format!(
                    "The field Password must be a string with a minimum length of {}.",
                    config.min_password_length
                ));
            }
            _ => {}
        }

        if !errors.is_empty() {
            return Err(AppError::BadRequest(errors.join(" ")));
        }
        Ok(PdfModel::new(self.title, content, password))
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

/// JSON body extractor that reports rejections through [`AppError`].
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(JsonRejection::MissingJsonContentType(_)) => {
                Err(AppError::BadRequest("Accept application/json".to_string()))
            }
            Err(rejection) => Err(AppError::BadRequest(rejection.body_text())),
        }
    }
}

/// Download name for a document generated at `generated_at`.
pub fn file_name(prefix: &str, generated_at: NaiveDateTime) -> String {
    format!("{prefix}_{}.pdf", generated_at.format("%Y%m%d%H%M%S"))
}

/// Generate a PDF, encrypted when a password is supplied
#[tracing::instrument(skip_all, fields(trace_id = %trace_id.0))]
pub async fn generate_pdf(
    State(state): State<AppState>,
    Extension(trace_id): Extension<TraceId>,
    JsonBody(payload): JsonBody<PdfRequest>,
) -> Result<Response, AppError> {
    let model = payload.validate(&state.config)?;
    tracing::info!(content_len = model.content.len(), "Starting PDF generation");

    let generated_at = Local::now().naive_local();
    let generator = state.generator.clone();
    let pdf_bytes = tokio::task::spawn_blocking(move || generator.generate(&model, generated_at))
        .await
        .map_err(|e| AppError::Unexpected(e.into()))??;

    let file_name = file_name(&state.config.file_prefix, generated_at);
    tracing::info!(%file_name, size = pdf_bytes.len(), "PDF generated");

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        pdf_bytes,
    )
        .into_response())
}

/// Health check endpoint for monitoring and load balancing
pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: "pdfgen API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("Not Found: {}", uri.path()))
}
