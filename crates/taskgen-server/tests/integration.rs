use axum::http::StatusCode;
use http_body_util::BodyExt;
use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;
use taskgen_core::config::Config;
use taskgen_core::history::{HistoryStorage, MemoryStorage};
use taskgen_core::types::HistoryRecord;
use taskgen_server::state::AppState;
use tempfile::TempDir;
use tower::ServiceExt;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn file_router(dir: &TempDir) -> axum::Router {
    taskgen_server::build_router(dir.path(), &Config::default())
}

/// Send a GET request via `oneshot` and return (status, parsed JSON body).
async fn get(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let req = axum::http::Request::builder()
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

/// Send a POST request with a JSON body via `oneshot` and return (status, parsed JSON body).
async fn post_json(
    app: axum::Router,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let req = axum::http::Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(axum::body::Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

/// Send a POST with a raw body and optional content type.
async fn post_raw(
    app: axum::Router,
    uri: &str,
    content_type: Option<&str>,
    body: &'static str,
) -> (StatusCode, serde_json::Value) {
    let mut req = axum::http::Request::builder().method("POST").uri(uri);
    if let Some(ct) = content_type {
        req = req.header("content-type", ct);
    }
    let req = req.body(axum::body::Body::from(body)).unwrap();
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

/// Storage whose `save` blocks until the test releases it.
struct GatedStorage {
    inner: MemoryStorage,
    entered: Mutex<mpsc::Sender<()>>,
    release: Mutex<mpsc::Receiver<()>>,
}

impl HistoryStorage for GatedStorage {
    fn load(&self) -> taskgen_core::Result<Option<Vec<HistoryRecord>>> {
        self.inner.load()
    }

    fn save(&self, records: &[HistoryRecord]) -> taskgen_core::Result<()> {
        let _ = self.entered.lock().unwrap().send(());
        let _ = self.release.lock().unwrap().recv();
        self.inner.save(records)
    }
}

fn login(risks: &str) -> serde_json::Value {
    serde_json::json!({
        "goal": "login",
        "users": "customers",
        "template": "web",
        "constraints": "",
        "risks": risks,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_reports_ok() {
    let dir = TempDir::new().unwrap();
    let (status, json) = get(file_router(&dir), "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn history_is_empty_before_any_generation() {
    let dir = TempDir::new().unwrap();
    let (status, json) = get(file_router(&dir), "/api/specs/history").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, serde_json::json!([]));
}

#[tokio::test]
async fn generate_returns_record_for_web_login() {
    let dir = TempDir::new().unwrap();
    let (status, json) = post_json(file_router(&dir), "/api/specs/generate", login("")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["id"].is_u64());
    assert!(json["createdAt"].is_string());
    assert_eq!(json["goal"], "login");
    assert_eq!(json["users"], "customers");
    assert_eq!(json["template"], "web");
    let stories = json["stories"].as_array().unwrap();
    assert_eq!(stories.len(), 4);
    assert!(stories[3]
        .as_str()
        .unwrap()
        .contains("work seamlessly across different browsers"));
    assert_eq!(json["tasks"].as_array().unwrap().len(), 26);
}

#[tokio::test]
async fn generate_with_risks_adds_risk_tasks() {
    let dir = TempDir::new().unwrap();
    let (status, json) =
        post_json(file_router(&dir), "/api/specs/generate", login("data loss")).await;

    assert_eq!(status, StatusCode::OK);
    let tasks = json["tasks"].as_array().unwrap();
    assert_eq!(tasks.len(), 29);
    assert!(tasks
        .iter()
        .any(|t| t.as_str().unwrap().contains("data loss")));
}

#[tokio::test]
async fn generate_persists_to_history_file() {
    let dir = TempDir::new().unwrap();
    let (status, created) = post_json(file_router(&dir), "/api/specs/generate", login("")).await;
    assert_eq!(status, StatusCode::OK);

    let path = dir.path().join("data/specs.json");
    assert!(path.exists());

    let (status, history) = get(file_router(&dir), "/api/specs/history").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history.as_array().unwrap().len(), 1);
    assert_eq!(history[0], created);
}

#[tokio::test]
async fn missing_users_is_rejected_and_history_unchanged() {
    let dir = TempDir::new().unwrap();
    post_json(file_router(&dir), "/api/specs/generate", login("")).await;

    let (status, json) = post_json(
        file_router(&dir),
        "/api/specs/generate",
        serde_json::json!({ "goal": "reports", "template": "web" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Goal and users are required");

    let (_, history) = get(file_router(&dir), "/api/specs/history").await;
    let history = history.as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["goal"], "login");
}

#[tokio::test]
async fn blank_goal_is_rejected() {
    let dir = TempDir::new().unwrap();
    let (status, _) = post_json(
        file_router(&dir),
        "/api/specs/generate",
        serde_json::json!({ "goal": "   ", "users": "admins" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(!dir.path().join("data/specs.json").exists());
}

#[tokio::test]
async fn request_without_json_content_type_is_400_json() {
    let dir = TempDir::new().unwrap();
    let (status, json) = post_raw(file_router(&dir), "/api/specs/generate", None, "").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Goal and users are required");

    let (status, json) = post_raw(
        file_router(&dir),
        "/api/specs/generate",
        Some("application/x-www-form-urlencoded"),
        "goal=login&users=customers",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Goal and users are required");
    assert!(!dir.path().join("data/specs.json").exists());
}

#[tokio::test]
async fn mistyped_or_malformed_body_is_400_json() {
    let dir = TempDir::new().unwrap();
    let (status, json) = post_raw(
        file_router(&dir),
        "/api/specs/generate",
        Some("application/json"),
        r#"{"goal": 1, "users": "customers"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());

    let (status, json) = post_raw(
        file_router(&dir),
        "/api/specs/generate",
        Some("application/json"),
        "{",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());
    assert!(!dir.path().join("data/specs.json").exists());
}

#[tokio::test]
async fn write_lock_held_until_generate_finishes_after_client_drop() {
    let (entered_tx, entered_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let state = AppState::with_storage(GatedStorage {
        inner: MemoryStorage::new(),
        entered: Mutex::new(entered_tx),
        release: Mutex::new(release_rx),
    });
    let app = taskgen_server::router(state.clone(), &[]);

    let request = tokio::spawn(post_json(app, "/api/specs/generate", login("")));
    tokio::task::spawn_blocking(move || entered_rx.recv())
        .await
        .unwrap()
        .unwrap();
    request.abort();
    let _ = request.await;

    assert!(state.write_lock.try_lock().is_err());

    release_tx.send(()).unwrap();
    let _guard = tokio::time::timeout(Duration::from_secs(5), state.write_lock.lock())
        .await
        .expect("lock released once generate completes");
    assert_eq!(state.service.history().len(), 1);
}

#[tokio::test]
async fn six_generations_keep_newest_five() {
    let dir = TempDir::new().unwrap();
    for goal in ["one", "two", "three", "four", "five", "six"] {
        let (status, _) = post_json(
            file_router(&dir),
            "/api/specs/generate",
            serde_json::json!({ "goal": goal, "users": "ops" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, history) = get(file_router(&dir), "/api/specs/history").await;
    let goals: Vec<&str> = history
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["goal"].as_str().unwrap())
        .collect();
    assert_eq!(goals, vec!["six", "five", "four", "three", "two"]);
}

#[tokio::test]
async fn missing_template_defaults_to_web() {
    let dir = TempDir::new().unwrap();
    let (status, json) = post_json(
        file_router(&dir),
        "/api/specs/generate",
        serde_json::json!({ "goal": "search", "users": "analysts" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["template"], "web");
    assert!(json["constraints"].is_null());
    assert_eq!(json["stories"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn unrecognized_template_omits_extra_story() {
    let dir = TempDir::new().unwrap();
    let (status, json) = post_json(
        file_router(&dir),
        "/api/specs/generate",
        serde_json::json!({ "goal": "search", "users": "analysts", "template": "desktop" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["template"], "desktop");
    assert_eq!(json["stories"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn corrupt_history_file_reads_as_empty() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("data")).unwrap();
    std::fs::write(dir.path().join("data/specs.json"), "not json at all").unwrap();

    let (status, json) = get(file_router(&dir), "/api/specs/history").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, serde_json::json!([]));
}

#[tokio::test]
async fn write_failure_returns_500() {
    let storage = Arc::new(MemoryStorage::new());
    storage.set_fail_writes(true);
    let app = taskgen_server::router(AppState::with_storage(storage.clone()), &[]);

    let (status, json) = post_json(app, "/api/specs/generate", login("")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json["error"].is_string());

    storage.set_fail_writes(false);
    let app = taskgen_server::router(AppState::with_storage(storage), &[]);
    let (_, history) = get(app, "/api/specs/history").await;
    assert_eq!(history, serde_json::json!([]));
}

#[tokio::test]
async fn cors_preflight_allows_configured_origin() {
    let dir = TempDir::new().unwrap();
    let req = axum::http::Request::builder()
        .method("OPTIONS")
        .uri("/api/specs/generate")
        .header("origin", "http://localhost:5173")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "content-type")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = file_router(&dir).oneshot(req).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .unwrap(),
        "http://localhost:5173"
    );
}

#[tokio::test]
async fn cors_does_not_echo_unknown_origin() {
    let dir = TempDir::new().unwrap();
    let req = axum::http::Request::builder()
        .uri("/api/specs/history")
        .header("origin", "https://evil.example")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = file_router(&dir).oneshot(req).await.unwrap();
    assert!(response
        .headers()
        .get("access-control-allow-origin")
        .is_none());
}

#[tokio::test]
async fn serve_reports_address_in_use() {
    let dir = TempDir::new().unwrap();
    let taken = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let mut config = Config::default();
    config.server.bind = "127.0.0.1".to_string();
    config.server.port = taken.local_addr().unwrap().port();

    let err = taskgen_server::serve(dir.path(), &config)
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("failed to bind 127.0.0.1:"));
}
