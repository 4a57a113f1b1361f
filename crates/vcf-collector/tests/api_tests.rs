//! Integration tests for the collector API.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use contact_store::ContactStore;
use std::io::Write;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use tracing_subscriber::fmt::MakeWriter;
use vcf_collector::{
    api::{create_router, create_router_with_rate_limit, with_static_files, AppState, RateLimitState},
    ExportPassword,
};

const PASSWORD: &str = "letmein";

/// Create a test app backed by memory-only storage.
fn create_test_app() -> Router {
    let state = AppState::new(ContactStore::memory(), ExportPassword::new(PASSWORD));
    create_router_with_rate_limit(state, RateLimitState::permissive())
}

fn post_contact(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/contacts")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app();

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["backend"], "memory");
    assert_eq!(json["contacts"], 0);
}

#[tokio::test]
async fn test_add_contact() {
    let app = create_test_app();

    let response = app
        .oneshot(post_contact(r#"{"name": "Ada Lovelace", "phone": "+1 202 555 0170"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["contact"]["name"], "Ada Lovelace");
    assert_eq!(json["contact"]["phone"], "+12025550170");
    assert!(json["contact"]["id"].is_string());
    assert!(json["contact"]["created_at"].is_string());
}

#[tokio::test]
async fn test_add_duplicate_contact() {
    let app = create_test_app();

    let response = app
        .clone()
        .oneshot(post_contact(r#"{"name": "Ada Lovelace", "phone": "+1 202 555 0170"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(post_contact(r#"{"name": "A. Lovelace", "phone": "12025550170"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let json = body_json(response).await;
    assert_eq!(json["code"], "DUPLICATE_PHONE");
}

#[tokio::test]
async fn test_add_contact_validation() {
    let app = create_test_app();

    for body in [
        r#"{"name": "", "phone": "+1234567"}"#,
        r#"{"name": "Ada"}"#,
        r#"{"phone": "+1234567"}"#,
        r#"{"name": "   ", "phone": "  "}"#,
        "not json",
    ] {
        let response = app.clone().oneshot(post_contact(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {}", body);

        let json = body_json(response).await;
        assert_eq!(json["code"], "VALIDATION_ERROR");
    }

    // Nothing reached the store
    let response = app.oneshot(get("/api/contacts/stats")).await.unwrap();
    let json = body_json(response).await;
    assert_eq!(json["total"], 0);
}

#[tokio::test]
async fn test_stats_empty() {
    let app = create_test_app();

    let response = app.oneshot(get("/api/contacts/stats")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json, serde_json::json!({"total": 0, "today": 0}));
}

#[tokio::test]
async fn test_stats_after_adds() {
    let app = create_test_app();

    for body in [
        r#"{"name": "Ada", "phone": "+111"}"#,
        r#"{"name": "Grace", "phone": "+222"}"#,
        r#"{"name": "Ada again", "phone": "111"}"#,
    ] {
        app.clone().oneshot(post_contact(body)).await.unwrap();
    }

    let response = app.oneshot(get("/api/contacts/stats")).await.unwrap();
    let json = body_json(response).await;
    assert_eq!(json, serde_json::json!({"total": 2, "today": 2}));
}

#[tokio::test]
async fn test_export_requires_password() {
    let app = create_test_app();

    for uri in [
        "/api/contacts/export",
        "/api/contacts/export?password=wrong",
        "/api/contacts/export?password=",
    ] {
        let response = app.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "uri: {}", uri);

        let json = body_json(response).await;
        assert_eq!(json["code"], "UNAUTHORIZED");
    }
}

#[tokio::test]
async fn test_export_malformed_query_is_unauthorized() {
    let app = create_test_app();

    let uri = format!("/api/contacts/export?password={}&password={}", PASSWORD, PASSWORD);
    let response = app.oneshot(get(&uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/json"
    );

    let json = body_json(response).await;
    assert_eq!(json["code"], "UNAUTHORIZED");
}

/// Log sink shared between the subscriber and the test.
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[tokio::test]
async fn test_export_password_not_logged() {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_ansi(false)
        .with_writer(logs.clone())
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let app = create_test_app();
    let ok_uri = format!("/api/contacts/export?password={}", PASSWORD);
    let response = app.clone().oneshot(get(&ok_uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bad_uri = "/api/contacts/export?password=not-the-password&password=x";
    let response = app.oneshot(get(bad_uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let output = logs.contents();
    assert!(output.contains("Contacts exported"), "logs: {}", output);
    assert!(output.contains("path=/api/contacts/export"), "logs: {}", output);
    assert!(!output.contains(PASSWORD), "logs: {}", output);
    assert!(!output.contains("not-the-password"), "logs: {}", output);
}

#[tokio::test]
async fn test_export_contacts() {
    let app = create_test_app();

    app.clone()
        .oneshot(post_contact(r#"{"name": "Grace Hopper", "phone": "+19195550123"}"#))
        .await
        .unwrap();

    let response = app
        .oneshot(get(&format!("/api/contacts/export?password={}", PASSWORD)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/vcard; charset=utf-8"
    );
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=contacts.vcf"
    );

    let body = body_string(response).await;
    assert_eq!(
        body,
        "BEGIN:VCARD\nVERSION:3.0\nFN:Grace Hopper\nTEL;TYPE=CELL:+19195550123\nEND:VCARD"
    );
}

#[tokio::test]
async fn test_export_preserves_submission_order() {
    let app = create_test_app();

    for body in [
        r#"{"name": "First", "phone": "+111"}"#,
        r#"{"name": "Second", "phone": "+222"}"#,
        r#"{"name": "Third", "phone": "+333"}"#,
    ] {
        app.clone().oneshot(post_contact(body)).await.unwrap();
    }

    let response = app
        .oneshot(get(&format!("/api/contacts/export?password={}", PASSWORD)))
        .await
        .unwrap();
    let body = body_string(response).await;

    let names: Vec<&str> = body.lines().filter_map(|l| l.strip_prefix("FN:")).collect();
    assert_eq!(names, vec!["First", "Second", "Third"]);
}

#[tokio::test]
async fn test_export_empty_store() {
    let app = create_test_app();

    let response = app
        .oneshot(get(&format!("/api/contacts/export?password={}", PASSWORD)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "");
}

#[tokio::test]
async fn test_rate_limiting() {
    let state = AppState::new(ContactStore::memory(), ExportPassword::new(PASSWORD));
    let app = create_router_with_rate_limit(state, RateLimitState::new(1));

    let response = app.clone().oneshot(get("/api/contacts/stats")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.clone().oneshot(get("/api/contacts/stats")).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    // Health checks are not rate limited
    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_static_fallback_serves_index() {
    let dir = tempfile::TempDir::new().unwrap();
    std::fs::write(dir.path().join("index.html"), "<h1>Collector</h1>").unwrap();
    std::fs::write(dir.path().join("app.js"), "console.log(1);").unwrap();

    let state = AppState::new(ContactStore::memory(), ExportPassword::new(PASSWORD));
    let app = with_static_files(create_router(state), dir.path());

    let response = app.clone().oneshot(get("/app.js")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "console.log(1);");

    let response = app.clone().oneshot(get("/some/page")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "<h1>Collector</h1>");

    // API routes still win over the fallback
    let response = app.oneshot(get("/api/contacts/stats")).await.unwrap();
    let json = body_json(response).await;
    assert_eq!(json["total"], 0);
}

#[tokio::test]
async fn test_file_backed_submissions_persist() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("contacts.json");

    let store = ContactStore::file(&path).await.unwrap();
    let app = create_router_with_rate_limit(
        AppState::new(store, ExportPassword::new(PASSWORD)),
        RateLimitState::permissive(),
    );

    let response = app
        .oneshot(post_contact(r#"{"name": "Grace Hopper", "phone": "+1 919 555 0123"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let reopened = ContactStore::file(&path).await.unwrap();
    let contacts = reopened.list_all().await;
    assert_eq!(contacts.len(), 1);
    assert_eq!(contacts[0].phone, "+19195550123");
}
