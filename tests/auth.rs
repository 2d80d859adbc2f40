mod common;

use axum::http::StatusCode;
use common::{TestApp, PASSWORD};
use serde_json::json;

#[tokio::test]
async fn health_reports_ok() {
    let app = TestApp::new().await;
    let (status, body) = app.get("/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");
    assert!(body["timestamp"].is_i64());
}

#[tokio::test]
async fn register_then_login_returns_tokens() {
    let app = TestApp::new().await;
    let (token, user_id) = app.register("Alice@Example.com").await;
    assert!(!token.is_empty());

    let (status, body) = app
        .post(
            "/auth/login",
            None,
            json!({"email": "alice@example.com", "password": PASSWORD}),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["user"]["email"], "alice@example.com");
    assert_eq!(body["user"]["id"], user_id.to_string());
    assert!(body["user"].get("password_hash").is_none());
    assert!(body["expires_at"].is_string());
}

#[tokio::test]
async fn me_requires_a_valid_token() {
    let app = TestApp::new().await;
    let (token, _) = app.register("bob@example.com").await;

    let (status, body) = app.get("/api/me", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "bob@example.com");
    assert_eq!(body["phone"], "+1234567890");

    let (status, body) = app.get("/api/me", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    let (status, _) = app.get("/api/me", Some("not.a.jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let app = TestApp::new().await;
    app.register("carol@example.com").await;
    let (status, body) = app
        .post(
            "/auth/register",
            None,
            json!({"email": "CAROL@example.com", "password": PASSWORD}),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Email already registered");
}

#[tokio::test]
async fn registration_validates_input() {
    let app = TestApp::new().await;
    let (status, _) = app
        .post(
            "/auth/register",
            None,
            json!({"email": "not-an-email", "password": PASSWORD}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/auth/register",
            None,
            json!({"email": "dave@example.com", "password": "short"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn wrong_password_and_unknown_user_look_alike() {
    let app = TestApp::new().await;
    app.register("erin@example.com").await;

    let (wrong_status, wrong_body) = app
        .post(
            "/auth/login",
            None,
            json!({"email": "erin@example.com", "password": "wrong-password"}),
        )
        .await;
    let (unknown_status, unknown_body) = app
        .post(
            "/auth/login",
            None,
            json!({"email": "nobody@example.com", "password": PASSWORD}),
        )
        .await;
    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_body, unknown_body);
}
