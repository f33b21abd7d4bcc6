mod common;

use axum::http::StatusCode;
use common::{file_part, FailingStub, PdfStub, TestApp, DOCX_MIME, DOC_MIME};
use conversion_service::config::DEFAULT_MAX_UPLOAD_BYTES;
use reqwest::multipart;
use std::sync::Arc;

fn is_generated_pdf_name(name: &str) -> bool {
    let Some(stem) = name.strip_suffix(".pdf") else {
        return false;
    };
    let parts: Vec<&str> = stem.split('-').collect();
    parts.len() == 3
        && parts[0] == "file"
        && parts[1].parse::<i64>().is_ok()
        && parts[2].parse::<u32>().is_ok()
}

#[tokio::test]
async fn upload_docx_returns_pdf_links() {
    let app = TestApp::spawn().await;
    let data = vec![7u8; 2 * 1024 * 1024];

    let response = app.upload("report.docx", DOCX_MIME, data).await;

    assert_eq!(StatusCode::OK, response.status());
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");

    assert_eq!(body["metadata"]["name"], "report.docx");
    assert_eq!(body["metadata"]["size"], 2 * 1024 * 1024);
    assert_eq!(body["metadata"]["type"], DOCX_MIME);
    assert!(body["metadata"]["uploadTime"].as_str().unwrap().ends_with('Z'));

    let pdf_url = body["pdfUrl"].as_str().unwrap();
    let file_url = body["fileUrl"].as_str().unwrap();
    let output_name = pdf_url.strip_prefix("/download/").expect("pdfUrl prefix");
    assert!(is_generated_pdf_name(output_name), "unexpected name {output_name}");
    assert_eq!(file_url, format!("/output/{}", output_name));

    // The upload is gone, the PDF stays.
    assert_eq!(app.uploads_count(), 0);
    assert!(app.output_dir.join(output_name).exists());

    let download = app.get(pdf_url).await;
    assert_eq!(StatusCode::OK, download.status());
    let bytes = download.bytes().await.unwrap();
    assert!(bytes.starts_with(b"%PDF-1.4 converted from file-"));
}

#[tokio::test]
async fn upload_legacy_doc_is_accepted() {
    let app = TestApp::spawn().await;

    let response = app.upload("old.doc", DOC_MIME, b"doc bytes".to_vec()).await;

    assert_eq!(StatusCode::OK, response.status());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["metadata"]["type"], DOC_MIME);
    assert_eq!(app.uploads_count(), 0);
}

#[tokio::test]
async fn upload_with_invalid_type_is_rejected() {
    let app = TestApp::spawn().await;

    let response = app.upload("image.png", "image/png", vec![0; 100]).await;

    assert_eq!(StatusCode::BAD_REQUEST, response.status());
    let body: serde_json::Value = response.json().await.unwrap();
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("Invalid file type"), "{message}");
    assert!(message.contains("image/png"), "{message}");

    assert_eq!(app.uploads_count(), 0);
    assert_eq!(std::fs::read_dir(&app.output_dir).unwrap().count(), 0);
}

#[tokio::test]
async fn upload_over_limit_is_rejected_without_writing() {
    let app = TestApp::spawn_with(Arc::new(PdfStub), 1024).await;

    let response = app.upload("big.docx", DOCX_MIME, vec![1; 4096]).await;

    assert_eq!(StatusCode::BAD_REQUEST, response.status());
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["message"]
        .as_str()
        .unwrap()
        .starts_with("File is too large"));
    assert_eq!(app.uploads_count(), 0);
}

#[tokio::test]
async fn upload_one_byte_over_ten_mib_is_rejected() {
    let app = TestApp::spawn().await;

    let response = app
        .upload("big.docx", DOCX_MIME, vec![1; DEFAULT_MAX_UPLOAD_BYTES + 1])
        .await;

    assert_eq!(StatusCode::BAD_REQUEST, response.status());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["message"], "File is too large. Maximum size is 10MB");
    assert_eq!(app.uploads_count(), 0);
}

#[tokio::test]
async fn upload_exactly_ten_mib_is_accepted() {
    let app = TestApp::spawn().await;

    let response = app
        .upload("limit.docx", DOCX_MIME, vec![1; DEFAULT_MAX_UPLOAD_BYTES])
        .await;

    assert_eq!(StatusCode::OK, response.status());
    assert_eq!(app.uploads_count(), 0);
}

#[tokio::test]
async fn upload_without_file_field_is_a_processing_error() {
    let app = TestApp::spawn().await;
    let form = multipart::Form::new().text("note", "no document here");

    let response = app.post_form(form).await;

    assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, response.status());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Error processing file");
    assert_eq!(body["details"], "No file uploaded");
}

#[tokio::test]
async fn file_under_another_field_is_rejected() {
    let app = TestApp::spawn().await;
    let form = multipart::Form::new().part(
        "attachment",
        file_part("report.docx", DOCX_MIME, b"docx bytes".to_vec()),
    );

    let response = app.post_form(form).await;

    assert_eq!(StatusCode::BAD_REQUEST, response.status());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Unexpected field");
    assert_eq!(app.uploads_count(), 0);
    assert_eq!(std::fs::read_dir(&app.output_dir).unwrap().count(), 0);
}

#[tokio::test]
async fn second_file_part_is_rejected_and_first_discarded() {
    let app = TestApp::spawn().await;
    let form = multipart::Form::new()
        .part("file", file_part("a.docx", DOCX_MIME, b"first".to_vec()))
        .part("file", file_part("b.docx", DOCX_MIME, b"second".to_vec()));

    let response = app.post_form(form).await;

    assert_eq!(StatusCode::BAD_REQUEST, response.status());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Unexpected field");
    assert_eq!(app.uploads_count(), 0);
    assert_eq!(std::fs::read_dir(&app.output_dir).unwrap().count(), 0);
}

#[tokio::test]
async fn text_fields_next_to_the_file_are_ignored() {
    let app = TestApp::spawn().await;
    let form = multipart::Form::new()
        .text("note", "quarterly numbers")
        .part("file", file_part("report.docx", DOCX_MIME, b"docx".to_vec()));

    let response = app.post_form(form).await;

    assert_eq!(StatusCode::OK, response.status());
    assert_eq!(app.uploads_count(), 0);
}

#[tokio::test]
async fn conversion_failure_returns_tool_message_and_cleans_up() {
    let app = TestApp::spawn_with(
        Arc::new(FailingStub("Error: source file could not be loaded")),
        DEFAULT_MAX_UPLOAD_BYTES,
    )
    .await;

    let response = app
        .upload("broken.docx", DOCX_MIME, b"not really a docx".to_vec())
        .await;

    assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, response.status());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Error processing file");
    assert_eq!(body["details"], "Error: source file could not be loaded");

    assert_eq!(app.uploads_count(), 0);
    assert_eq!(std::fs::read_dir(&app.output_dir).unwrap().count(), 0);
}

#[tokio::test]
async fn concurrent_uploads_of_same_document_are_independent() {
    let app = TestApp::spawn().await;
    let data = b"same document".to_vec();

    let (a, b) = tokio::join!(
        app.upload("same.docx", DOCX_MIME, data.clone()),
        app.upload("same.docx", DOCX_MIME, data.clone()),
    );

    assert_eq!(StatusCode::OK, a.status());
    assert_eq!(StatusCode::OK, b.status());
    let a: serde_json::Value = a.json().await.unwrap();
    let b: serde_json::Value = b.json().await.unwrap();
    assert_ne!(a["pdfUrl"], b["pdfUrl"]);

    assert_eq!(app.uploads_count(), 0);
    assert_eq!(std::fs::read_dir(&app.output_dir).unwrap().count(), 2);
}
