//! HTTP tests against the router over an in-memory store.

use std::sync::Arc;

use app::{AppState, build_router};
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Duration;
use serde_json::{Value, json};
use services::{AppServices, Clock};
use study_core::time::fixed_now;
use tower::util::ServiceExt;

fn setup_app() -> Router {
    let services = AppServices::in_memory(Clock::fixed(fixed_now()));
    build_router(Arc::new(AppState::new(services)))
}

fn request(method: &str, uri: &str, user: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header("x-user-id", user);
    }
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, body)
}

fn goal_body(target: u8) -> Value {
    let target_date = (fixed_now() + Duration::days(60)).date_naive();
    json!({
        "title": "Pass SAA",
        "provider": "aws",
        "exam": "saa",
        "targetScore": target,
        "targetDate": target_date.to_string(),
    })
}

async fn create_goal(app: &Router, user: &str, target: u8) -> String {
    let (status, body) = send(app, request("POST", "/goals", Some(user), Some(goal_body(target)))).await;
    assert_eq!(status, StatusCode::CREATED);
    body["goalId"].as_str().unwrap().to_owned()
}

async fn run_session(app: &Router, user: &str, correct: u32, total: u32) -> Value {
    let (status, session) = send(
        app,
        request(
            "POST",
            "/sessions",
            Some(user),
            Some(json!({ "provider": "aws", "exam": "saa", "totalQuestions": total })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = session["sessionId"].as_str().unwrap().to_owned();

    for i in 0..total {
        let (status, _) = send(
            app,
            request(
                "POST",
                &format!("/sessions/{id}/answers"),
                Some(user),
                Some(json!({ "correct": i < correct })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, completed) = send(
        app,
        request("POST", &format!("/sessions/{id}/complete"), Some(user), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    completed
}

#[tokio::test]
async fn health_needs_no_user() {
    let app = setup_app();
    let (status, body) = send(&app, request("GET", "/health", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn missing_user_header_is_unauthorized() {
    let app = setup_app();
    let (status, body) = send(&app, request("GET", "/goals", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    let (status, _) = send(&app, request("GET", "/goals", Some("   "), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn goal_crud_round_trip() {
    let app = setup_app();
    let id = create_goal(&app, "alice", 80).await;

    let (status, goal) = send(&app, request("GET", &format!("/goals/{id}"), Some("alice"), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(goal["title"], "Pass SAA");
    assert_eq!(goal["currentScore"], 0);
    assert_eq!(goal["isCompleted"], false);

    let (status, updated) = send(
        &app,
        request(
            "PUT",
            &format!("/goals/{id}"),
            Some("alice"),
            Some(json!({ "title": "Pass SAA-C03", "currentScore": 85 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "Pass SAA-C03");
    assert_eq!(updated["isCompleted"], true);

    let (status, list) = send(&app, request("GET", "/goals?limit=5", Some("alice"), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["total"], 1);
    assert_eq!(list["completed"], 1);

    let (status, _) = send(&app, request("DELETE", &format!("/goals/{id}"), Some("alice"), None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, request("GET", &format!("/goals/{id}"), Some("alice"), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_goal_is_bad_request() {
    let app = setup_app();
    let mut body = goal_body(80);
    body["targetScore"] = json!(150);
    let (status, body) = send(&app, request("POST", "/goals", Some("alice"), Some(body))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("150"));

    let (status, _) = send(
        &app,
        request("POST", "/goals", Some("alice"), Some(json!({ "title": "no fields" }))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, request("GET", "/goals?limit=0", Some("alice"), None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn foreign_goal_is_not_found_and_untouched() {
    let app = setup_app();
    let id = create_goal(&app, "alice", 70).await;

    let (status, _) = send(
        &app,
        request(
            "PUT",
            &format!("/goals/{id}"),
            Some("mallory"),
            Some(json!({ "currentScore": 99 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        request("DELETE", &format!("/goals/{id}"), Some("mallory"), None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, goal) = send(&app, request("GET", &format!("/goals/{id}"), Some("alice"), None)).await;
    assert_eq!(goal["currentScore"], 0);

    let (status, _) = send(&app, request("GET", "/goals/not-a-uuid", Some("alice"), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn completing_sessions_drives_goal_progress() {
    let app = setup_app();
    let id = create_goal(&app, "alice", 80).await;

    let completed = run_session(&app, "alice", 7, 10).await;
    assert_eq!(completed["session"]["completed"], true);
    assert_eq!(completed["progress"]["currentScore"], 70);
    assert_eq!(completed["progress"]["outcomes"][0]["status"], "updated");
    assert_eq!(completed["progress"]["outcomes"][0]["completed"], false);

    let (status, report) = send(
        &app,
        request("GET", &format!("/goals/{id}/progress"), Some("alice"), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["currentScore"], 70);
    assert_eq!(report["targetScore"], 80);
    assert_eq!(report["percentage"], 88);
    assert_eq!(report["timeRemaining"], 60);
    assert_eq!(report["onTrack"], true);
    assert_eq!(report["isCompleted"], false);
    assert!(!report["recommendations"].as_array().unwrap().is_empty());

    let (status, analytics) = send(&app, request("GET", "/analytics", Some("alice"), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(analytics["completedSessions"], 1);
    assert_eq!(analytics["accuracy"], 70);
    assert_eq!(analytics["exams"][0]["provider"], "aws");
}

#[tokio::test]
async fn manual_refresh_completes_goal_at_target() {
    let app = setup_app();
    let id = create_goal(&app, "alice", 70).await;
    run_session(&app, "alice", 7, 10).await;

    let (status, refresh) = send(
        &app,
        request(
            "POST",
            "/goals/refresh",
            Some("alice"),
            Some(json!({ "provider": "aws", "exam": "saa" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    // Already completed by the session trigger, so nothing is left to refresh.
    assert_eq!(refresh["outcomes"], json!([]));

    let (_, goal) = send(&app, request("GET", &format!("/goals/{id}"), Some("alice"), None)).await;
    assert_eq!(goal["currentScore"], 70);
    assert_eq!(goal["isCompleted"], true);

    let (status, _) = send(
        &app,
        request(
            "POST",
            "/goals/refresh",
            Some("alice"),
            Some(json!({ "provider": " ", "exam": "saa" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn session_errors_map_to_statuses() {
    let app = setup_app();
    let (status, _) = send(
        &app,
        request(
            "POST",
            "/sessions",
            Some("alice"),
            Some(json!({ "provider": "aws", "exam": "saa", "totalQuestions": 0 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let completed = run_session(&app, "alice", 1, 1).await;
    let id = completed["session"]["sessionId"].as_str().unwrap().to_owned();

    let (status, body) = send(
        &app,
        request("POST", &format!("/sessions/{id}/complete"), Some("alice"), None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "session already completed");

    let (status, _) = send(&app, request("GET", &format!("/sessions/{id}"), Some("bob"), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, list) = send(&app, request("GET", "/sessions", Some("alice"), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
}
