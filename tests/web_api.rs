#![cfg(feature = "web")]

//! HTTP 接口集成测试

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use pagelingo::translation::MockReply;
use pagelingo::web::{create_router, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

mod common {
    include!("common/mod.rs");
}

use common::TestEnvironment;

fn app_for(env: &TestEnvironment) -> Router {
    create_router(Arc::new(AppState::new(env.dispatcher.clone())))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

#[tokio::test(flavor = "multi_thread")]
async fn test_translate_markup() {
    let env = TestEnvironment::reply(MockReply::Fixed(vec![json!("Soumettre"), json!("Cliquez-moi")]));

    let (status, body) = post_json(
        app_for(&env),
        "/api/translate",
        json!({ "html": "<button title=\"Submit\">Click me</button>", "targetLang": "fr" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["html"], "<button title=\"Soumettre\">Cliquez-moi</button>");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_translate_markup_junk_path_unchanged() {
    let env = TestEnvironment::identity();
    let html = "<p>Hello there</p>";

    let (status, body) = post_json(
        app_for(&env),
        "/api/translate",
        json!({ "html": html, "targetLang": "fr", "filename": "__MACOSX/._index.html" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["html"], html);
    assert_eq!(env.gateway.call_count(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_translate_script() {
    let env = TestEnvironment::dictionary(&[("Logo image", "Image du logo")]);

    let (status, body) = post_json(
        app_for(&env),
        "/api/translate-js",
        json!({ "code": "obj.setAttribute(\"alt\", \"Logo image\");", "targetLang": "fr" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], "obj.setAttribute(\"alt\", \"Image du logo\");");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_translate_document_with_rules_and_rtl() {
    let env = TestEnvironment::identity();

    let (status, body) = post_json(
        app_for(&env),
        "/api/translate-document",
        json!({
            "documentText": "<html><body><p>Pay in USD</p></body></html>",
            "documentKind": "markup",
            "targetLanguage": "he",
            "rtlRequested": true,
            "substitutionRules": { "currency": { "enabled": true, "from": "USD", "to": "ILS" } }
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let text = body["documentText"].as_str().unwrap();
    assert!(text.contains("<html dir=\"rtl\">"));
    assert!(text.contains("<p>Pay in ILS</p>"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_translate_document_infers_kind_from_path() {
    let env = TestEnvironment::dictionary(&[("Saved", "Gespeichert")]);

    let (status, body) = post_json(
        app_for(&env),
        "/api/translate-document",
        json!({
            "documentText": "status.textContent = 'Saved';",
            "targetLanguage": "de",
            "path": "src/status.ts"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["documentText"], "status.textContent = 'Gespeichert';");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_missing_fields_are_bad_requests() {
    let env = TestEnvironment::identity();

    let (status, body) =
        post_json(app_for(&env), "/api/translate", json!({ "html": "<p>Hi</p>" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = post_json(app_for(&env), "/api/translate-js", json!({ "targetLang": "fr" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post_json(
        app_for(&env),
        "/api/translate-document",
        json!({ "documentText": "x", "documentKind": "stylesheet", "targetLanguage": "fr" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let request = Request::builder()
        .method("POST")
        .uri("/api/translate")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, _) = send(app_for(&env), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(env.gateway.call_count(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_missing_credentials_is_server_error() {
    let app = create_router(Arc::new(AppState::unconfigured()));

    let (status, body) = post_json(
        app,
        "/api/translate",
        json!({ "html": "<p>Hello</p>", "targetLang": "fr" }),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "OPENAI_API_KEY not set");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_gateway_failure_is_server_error() {
    let env = TestEnvironment::reply(MockReply::Fail("upstream unavailable".to_string()));

    let (status, body) = post_json(
        app_for(&env),
        "/api/translate",
        json!({ "html": "<p>Hello there</p>", "targetLang": "fr" }),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("upstream unavailable"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_script_syntax_error_is_server_error() {
    let env = TestEnvironment::identity();

    let (status, body) = post_json(
        app_for(&env),
        "/api/translate-js",
        json!({ "code": "function (", "targetLang": "fr", "filename": "bad.js" }),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("bad.js"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_non_post_is_method_not_allowed() {
    let env = TestEnvironment::identity();
    let request = Request::builder()
        .method("GET")
        .uri("/api/translate")
        .body(Body::empty())
        .unwrap();

    let (status, _) = send(app_for(&env), request).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_health_reports_translator() {
    let env = TestEnvironment::identity();
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

    let (status, body) = send(app_for(&env), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["translator"], "mock");

    let (_, body) = send(
        create_router(Arc::new(AppState::unconfigured())),
        Request::builder().uri("/health").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(body["translator"], Value::Null);
}
