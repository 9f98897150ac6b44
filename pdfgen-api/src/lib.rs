//! # pdfgen-api
//!
//! REST API generating password-protected PDF documents with pdfgen.
//!
//! - `POST /api/pdf/generate` with `{ "title"?, "content", "password"? }`
//!   returns the PDF as an attachment
//! - `GET /api/health` reports service status
//!
//! Errors are returned as `{ success, errorCode, message, traceId }`.

mod api;
pub mod config;
pub mod error;
pub mod middleware;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use pdfgen::{FontTable, GeneratorOptions, PdfGenerator};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use api::{
    file_name, generate_pdf, health_check, not_found, HealthResponse, JsonBody, PdfRequest,
};
pub use config::{EncryptionMode, ServerConfig};
pub use error::{AppError, ErrorCode, MessageResult};

/// Shared, read-only state handed to every request.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub generator: PdfGenerator,
}

impl AppState {
    pub fn new(config: ServerConfig, fonts: Arc<FontTable>) -> Self {
        let generator = PdfGenerator::new(
            fonts,
            GeneratorOptions {
                strength: config.encryption.into(),
                author: config.author.clone(),
                ..Default::default()
            },
        );
        Self {
            config: Arc::new(config),
            generator,
        }
    }
}

/// Build the application router with all routes configured
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/api/pdf/generate", post(generate_pdf))
        .route("/api/health", get(health_check))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(state.config.max_body_bytes))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::error_envelope,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
