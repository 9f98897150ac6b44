//! Integration tests for pdfgen-api

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use clap::Parser;
use http_body_util::BodyExt;
use pdfgen::FontTable;
use pdfgen_api::{app, AppState, ErrorCode, HealthResponse, MessageResult, ServerConfig};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tower::util::ServiceExt;

fn test_app(config: ServerConfig) -> Router {
    app(AppState::new(config, Arc::new(FontTable::empty())))
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method("POST")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_bytes(response: Response) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

async fn envelope(response: Response) -> MessageResult {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

fn header_value(response: &Response, name: &str) -> String {
    response
        .headers()
        .get(name)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_health_check_endpoint() {
    let response = test_app(ServerConfig::default())
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-trace-id"));

    let health: HealthResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(health.status, "ok");
    assert_eq!(health.service, "pdfgen API");
    assert!(!health.version.is_empty());
}

#[tokio::test]
async fn test_generate_encrypted_pdf() {
    let response = test_app(ServerConfig::default())
        .oneshot(post_json(
            "/api/pdf/generate",
            json!({ "content": "Line1\nLine2\n\nLine3", "password": "secret1" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header_value(&response, "content-type"), "application/pdf");

    let disposition = header_value(&response, "content-disposition");
    assert!(disposition.starts_with("attachment; filename=\"encrypted_document_"));
    assert!(disposition.ends_with(".pdf\""));
    let stamp = disposition
        .trim_start_matches("attachment; filename=\"encrypted_document_")
        .trim_end_matches(".pdf\"");
    assert_eq!(stamp.len(), 14);
    assert!(stamp.chars().all(|c| c.is_ascii_digit()));

    let pdf = body_bytes(response).await;
    let raw = String::from_utf8_lossy(&pdf);
    assert!(raw.starts_with("%PDF-1.7"));
    assert!(raw.contains("/Encrypt"));
    assert!(raw.contains("/CFM /AESV2"));
    assert!(!raw.contains("Line1"));
}

#[tokio::test]
async fn test_generate_with_custom_prefix_and_rc4() {
    let config = ServerConfig::try_parse_from([
        "pdfgen-api",
        "--file-prefix",
        "report",
        "--encryption",
        "rc4-128",
    ])
    .unwrap();
    let response = test_app(config)
        .oneshot(post_json(
            "/api/pdf/generate",
            json!({ "title": "Quarterly", "content": "Hello", "password": "secret1" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(header_value(&response, "content-disposition").contains("filename=\"report_"));
    let pdf = body_bytes(response).await;
    let raw = String::from_utf8_lossy(&pdf);
    assert!(raw.contains("/V 2"));
    assert!(!raw.contains("/AESV2"));
}

#[tokio::test]
async fn test_generate_without_password_when_optional() {
    let config = ServerConfig {
        require_password: false,
        ..Default::default()
    };
    let response = test_app(config)
        .oneshot(post_json("/api/pdf/generate", json!({ "content": "Hello" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let pdf = body_bytes(response).await;
    let raw = String::from_utf8_lossy(&pdf);
    assert!(!raw.contains("/Encrypt"));
}

#[tokio::test]
async fn test_missing_content_is_rejected() {
    let response = test_app(ServerConfig::default())
        .oneshot(post_json("/api/pdf/generate", json!({ "password": "secret1" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let trace_header = header_value(&response, "x-trace-id");

    let body = envelope(response).await;
    assert!(!body.success);
    assert_eq!(body.error_code, Some(ErrorCode::InvalidInput));
    assert_eq!(body.message.as_deref(), Some("The Content field is required."));
    assert_eq!(body.trace_id.as_deref(), Some(trace_header.as_str()));
}

#[tokio::test]
async fn test_short_password_is_rejected() {
    let response = test_app(ServerConfig::default())
        .oneshot(post_json(
            "/api/pdf/generate",
            json!({ "content": "Hello", "password": "abc" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = envelope(response).await;
    assert_eq!(
        body.message.as_deref(),
        Some("The field Password must be a string with a minimum length of 6.")
    );
}

#[tokio::test]
async fn test_missing_password_is_rejected_by_default() {
    let response = test_app(ServerConfig::default())
        .oneshot(post_json("/api/pdf/generate", json!({ "content": "Hello" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = envelope(response).await;
    assert_eq!(body.message.as_deref(), Some("The Password field is required."));
}

#[tokio::test]
async fn test_request_id_is_reused_as_trace_id() {
    let mut request = post_json("/api/pdf/generate", json!({}));
    request
        .headers_mut()
        .insert("x-request-id", "req-1234".parse().unwrap());

    let response = test_app(ServerConfig::default())
        .oneshot(request)
        .await
        .unwrap();

    assert_eq!(header_value(&response, "x-trace-id"), "req-1234");
    let body = envelope(response).await;
    assert_eq!(body.trace_id.as_deref(), Some("req-1234"));
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let response = test_app(ServerConfig::default())
        .oneshot(
            Request::builder()
                .uri("/api/pdf/generate")
                .method("POST")
                .header("content-type", "application/json")
                .body(Body::from("{ not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = envelope(response).await;
    assert_eq!(body.error_code, Some(ErrorCode::InvalidInput));
}

#[tokio::test]
async fn test_missing_content_type() {
    let response = test_app(ServerConfig::default())
        .oneshot(
            Request::builder()
                .uri("/api/pdf/generate")
                .method("POST")
                .body(Body::from(json!({ "content": "x" }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = envelope(response).await;
    assert_eq!(body.message.as_deref(), Some("Accept application/json"));
}

#[tokio::test]
async fn test_wrong_method_is_no_route() {
    let response = test_app(ServerConfig::default())
        .oneshot(
            Request::builder()
                .uri("/api/pdf/generate")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = envelope(response).await;
    assert_eq!(body.error_code, Some(ErrorCode::InvalidInput));
    assert_eq!(body.message.as_deref(), Some("No Route"));
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let response = test_app(ServerConfig::default())
        .oneshot(
            Request::builder()
                .uri("/api/unknown")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = envelope(response).await;
    assert_eq!(body.error_code, Some(ErrorCode::NotFound));
    assert_eq!(body.message.as_deref(), Some("Not Found: /api/unknown"));
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let config = ServerConfig {
        max_body_bytes: 64,
        ..Default::default()
    };
    let response = test_app(config)
        .oneshot(post_json(
            "/api/pdf/generate",
            json!({ "content": "x".repeat(500), "password": "secret1" }),
        ))
        .await
        .unwrap();

    assert!(response.status().is_client_error());
    assert!(response.headers().contains_key(header::CONTENT_TYPE));
    let body = envelope(response).await;
    assert!(!body.success);
}
