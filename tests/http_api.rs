//! HTTP surface: upload, single-flight slot and error bodies.

mod common;

use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use adcritic::AppState;
use adcritic::errors::ProviderError;
use adcritic::handlers;
use adcritic::services::{AnalysisClient, AnalysisOptions};
use common::{ScriptedProvider, analysis_json};
use serde_json::Value;
use std::sync::Arc;

const BOUNDARY: &str = "adcritic-boundary";

fn multipart_body(files: &[(&str, &str, Vec<u8>)]) -> Vec<u8> {
    let mut body = Vec::new();
    for (filename, content_type, data) in files {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                BOUNDARY, filename, content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn upload(files: &[(&str, &str, Vec<u8>)]) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/api/v1/analyze")
        .insert_header((
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        ))
        .set_payload(multipart_body(files))
}

fn state_with(provider: Arc<ScriptedProvider>) -> AppState {
    AppState::new(AnalysisClient::new(provider, AnalysisOptions::default()))
}

#[actix_web::test]
async fn test_successful_analysis_is_returned_and_kept() {
    let provider = ScriptedProvider::answering(analysis_json(72).to_string());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state_with(provider.clone())))
            .configure(handlers::configure),
    )
    .await;

    let jpeg = vec![0xAB; 2 * 1024 * 1024];
    let resp = test::call_service(&app, upload(&[("ad.jpg", "image/jpeg", jpeg)]).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let report: Value = test::read_body_json(resp).await;
    assert_eq!(report["result"]["overallScore"], 72);
    assert_eq!(report["result"]["metrics"].as_array().unwrap().len(), 5);
    assert_eq!(report["model"], "gemini-2.5-flash");

    let snapshot: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/api/v1/analysis").to_request(),
    )
    .await;
    assert_eq!(snapshot["phase"], "result");
    assert_eq!(snapshot["report"]["id"], report["id"]);

    let reset: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::delete().uri("/api/v1/analysis").to_request(),
    )
    .await;
    assert_eq!(reset["phase"], "initial");
    assert!(reset["report"].is_null());
    assert_eq!(provider.calls(), 1);
}

#[actix_web::test]
async fn test_oversized_upload_is_rejected_without_a_provider_call() {
    let provider = ScriptedProvider::answering(analysis_json(50).to_string());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state_with(provider.clone())))
            .configure(handlers::configure),
    )
    .await;

    let png = vec![0u8; 15 * 1024 * 1024];
    let resp = test::call_service(&app, upload(&[("big.png", "image/png", png)]).to_request()).await;
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Analysis failed");
    assert_eq!(body["kind"], "oversized");
    assert_eq!(provider.calls(), 0);

    let snapshot: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/api/v1/analysis").to_request(),
    )
    .await;
    assert_eq!(snapshot["phase"], "initial");
}

#[actix_web::test]
async fn test_upload_without_a_file_is_refused() {
    let provider = ScriptedProvider::answering(analysis_json(50).to_string());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state_with(provider.clone())))
            .configure(handlers::configure),
    )
    .await;

    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nplease review\r\n--{b}--\r\n",
        b = BOUNDARY
    );
    let req = test::TestRequest::post()
        .uri("/api/v1/analyze")
        .insert_header((
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        ))
        .set_payload(body)
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["kind"], "upload");
    assert_eq!(body["message"], "Analysis failed: no file was uploaded");
    assert_eq!(provider.calls(), 0);

    let snapshot: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/api/v1/analysis").to_request(),
    )
    .await;
    assert_eq!(snapshot["phase"], "initial");
}

#[actix_web::test]
async fn test_unsupported_type_is_rejected() {
    let provider = ScriptedProvider::answering(analysis_json(50).to_string());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state_with(provider.clone())))
            .configure(handlers::configure),
    )
    .await;

    let resp = test::call_service(&app, upload(&[("ad.gif", "image/gif", b"GIF89a".to_vec())]).to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(provider.calls(), 0);

    let snapshot: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/api/v1/analysis").to_request(),
    )
    .await;
    assert_eq!(snapshot["phase"], "initial");
}

#[actix_web::test]
async fn test_batch_uploads_are_refused() {
    let provider = ScriptedProvider::answering(analysis_json(50).to_string());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state_with(provider.clone())))
            .configure(handlers::configure),
    )
    .await;

    let resp = test::call_service(
        &app,
        upload(&[("a.png", "image/png", b"one".to_vec()), ("b.png", "image/png", b"two".to_vec())]).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["kind"], "upload");
    assert_eq!(provider.calls(), 0);
}

#[actix_web::test]
async fn test_provider_failure_surfaces_one_message_and_resets() {
    let provider = ScriptedProvider::new(vec![Err(ProviderError::Transport(
        "connection reset".into(),
    ))]);
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state_with(provider.clone())))
            .configure(handlers::configure),
    )
    .await;

    let resp = test::call_service(&app, upload(&[("ad.png", "image/png", b"png".to_vec())]).to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["kind"], "provider");
    assert_eq!(
        body["message"],
        "Analysis failed: the analysis could not be processed, please try again"
    );

    let snapshot: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/api/v1/analysis").to_request(),
    )
    .await;
    assert_eq!(snapshot["phase"], "initial");
}

#[actix_web::test]
async fn test_submission_while_loading_is_busy() {
    let provider = ScriptedProvider::answering(analysis_json(50).to_string());
    let state = state_with(provider.clone());
    let _guard = state.slot.begin().unwrap();

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state.clone()))
            .configure(handlers::configure),
    )
    .await;

    let resp = test::call_service(&app, upload(&[("ad.png", "image/png", b"png".to_vec())]).to_request()).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(provider.calls(), 0);
}

#[actix_web::test]
async fn test_busy_service_refuses_before_reading_the_upload() {
    let provider = ScriptedProvider::answering(analysis_json(50).to_string());
    let state = state_with(provider.clone());
    let guard = state.slot.begin().unwrap();

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state.clone()))
            .configure(handlers::configure),
    )
    .await;

    // Busy wins over the size check, so the body was never buffered.
    let png = vec![0u8; 15 * 1024 * 1024];
    let resp = test::call_service(&app, upload(&[("big.png", "image/png", png)]).to_request()).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["kind"], "busy");

    // The refused request must not release the running analysis.
    let snapshot: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/api/v1/analysis").to_request(),
    )
    .await;
    assert_eq!(snapshot["phase"], "loading");

    guard.fail();
    assert_eq!(provider.calls(), 0);
}

#[actix_web::test]
async fn test_dimensions_and_health() {
    let provider = ScriptedProvider::answering(String::new());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state_with(provider)))
            .configure(handlers::configure),
    )
    .await;

    let dimensions: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/api/v1/dimensions").to_request(),
    )
    .await;
    let list = dimensions["dimensions"].as_array().unwrap();
    assert_eq!(list.len(), 5);
    assert_eq!(list[0]["id"], "message_clarity");

    let health: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/health").to_request(),
    )
    .await;
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["service"], "adcritic");
}
