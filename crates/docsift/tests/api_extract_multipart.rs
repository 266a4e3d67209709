#![cfg(feature = "api")]
//! Integration tests for the `/extract` API handler using multipart uploads.

mod helpers;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use docsift::ExtractionConfig;
use docsift::api::{ApiSizeLimits, UNSUPPORTED_FILE_MESSAGE, create_router_with_backend};
use helpers::{DocxBuilder, MockOcrBackend, invoice_pdf};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

const BOUNDARY: &str = "X-BOUNDARY";

fn router(backend: Arc<MockOcrBackend>) -> Router {
    create_router_with_backend(ExtractionConfig::default(), ApiSizeLimits::from_mb(5, 5), backend)
}

fn multipart_body(field: &str, file_name: &str, content: &[u8]) -> Vec<u8> {
    let mut body = format!(
        "--{BOUNDARY}\r\n\
Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n\
Content-Type: application/octet-stream\r\n\
\r\n"
    )
    .into_bytes();
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn multipart_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/extract")
        .header("content-type", format!("multipart/form-data; boundary={BOUNDARY}"))
        .header("content-length", body.len())
        .body(Body::from(body))
        .expect("Failed to build request")
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.expect("Request failed");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), 10_000_000)
        .await
        .expect("Failed to read body");
    let value = serde_json::from_slice(&bytes).expect("Response JSON parse failed");
    (status, value)
}

#[tokio::test]
async fn test_extract_pdf_returns_full_result() {
    let backend = Arc::new(MockOcrBackend::new("INVOICE"));
    let request = multipart_request(multipart_body("file", "invoice.pdf", &invoice_pdf()));

    let (status, value) = send(router(backend.clone()), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["message"], "Extraction complete");
    assert_eq!(value["file_type"], "PDF");
    assert!(value["extracted_text"].as_str().unwrap().contains("Invoice 2024-001"));
    assert_eq!(value["ocr_text"], "INVOICE\n");
    assert_eq!(value["extracted_images"], 1);

    let tables = value["extracted_tables"].as_array().unwrap();
    assert_eq!(tables.len(), 1);
    assert_eq!(tables[0]["page"], 2);
    assert_eq!(tables[0]["table_index"], 1);
    assert_eq!(tables[0]["data"], serde_json::json!([{"0": "Item", "1": "Qty"}]));
    assert_eq!(backend.calls(), 1);
}

#[tokio::test]
async fn test_extract_docx_tables_have_no_page() {
    let docx = DocxBuilder::new()
        .paragraph("Memo")
        .table(&[&["a", "b"]])
        .build();
    let request = multipart_request(multipart_body("file", "memo.docx", &docx));

    let (status, value) = send(router(Arc::new(MockOcrBackend::new(""))), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["file_type"], "DOCX");
    assert_eq!(value["extracted_text"], "Memo");
    assert_eq!(value["extracted_images"], 0);
    let table = &value["extracted_tables"][0];
    assert!(table.get("page").is_none());
    assert_eq!(table["table_index"], 1);
}

#[tokio::test]
async fn test_missing_file_field_is_bad_request() {
    let request = multipart_request(multipart_body("attachment", "invoice.pdf", &invoice_pdf()));

    let (status, value) = send(router(Arc::new(MockOcrBackend::new(""))), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(value["error"], "No file uploaded");
}

#[tokio::test]
async fn test_file_field_without_filename_is_bad_request() {
    let backend = Arc::new(MockOcrBackend::new(""));
    let mut body = format!(
        "--{BOUNDARY}\r\n\
Content-Disposition: form-data; name=\"file\"\r\n\
\r\n"
    )
    .into_bytes();
    body.extend_from_slice(&invoice_pdf());
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    let (status, value) = send(router(backend.clone()), multipart_request(body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(value["error"], "No file uploaded");
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn test_non_multipart_request_is_bad_request() {
    let request = Request::builder()
        .method("POST")
        .uri("/extract")
        .header("content-type", "application/json")
        .body(Body::from("{}"))
        .expect("Failed to build request");

    let (status, value) = send(router(Arc::new(MockOcrBackend::new(""))), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(value["error"], "No file uploaded");
}

#[tokio::test]
async fn test_unsupported_extension_is_bad_request() {
    let backend = Arc::new(MockOcrBackend::new(""));
    let request = multipart_request(multipart_body("file", "notes.txt", b"hello"));

    let (status, value) = send(router(backend.clone()), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(value["error"], UNSUPPORTED_FILE_MESSAGE);
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn test_corrupt_pdf_is_unprocessable() {
    let request = multipart_request(multipart_body("file", "broken.pdf", b"%PDF-1.4 truncated"));

    let (status, value) = send(router(Arc::new(MockOcrBackend::new(""))), request).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(value["error"].as_str().unwrap().starts_with("Corrupt document"));
}

#[tokio::test]
async fn test_get_is_not_allowed() {
    let request = Request::builder()
        .method("GET")
        .uri("/extract")
        .body(Body::empty())
        .expect("Failed to build request");

    let response = router(Arc::new(MockOcrBackend::new("")))
        .oneshot(request)
        .await
        .expect("Request failed");
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
