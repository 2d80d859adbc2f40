//! Shared harness for the HTTP integration tests. Every test gets its own
//! in-memory database and router.
#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use letsorder_api::{
    db,
    routes::create_app,
    settings::{DatabaseSettings, Settings},
    state::AppState,
};
use serde_json::{json, Value};
use tower::ServiceExt as _;
use uuid::Uuid;

pub const PASSWORD: &str = "password123";
pub const MENU_BASE_URL: &str = "http://menu.test";

pub struct TestApp {
    pub router: Router,
    pub pool: db::ConnectionPool,
}

impl TestApp {
    pub async fn new() -> Self {
        let mut settings = Settings::default();
        settings.database = DatabaseSettings {
            url: "sqlite::memory:".to_owned(),
            max_connections: 1,
            seed_demo_data: false,
        };
        settings.jwt.secret = Some("test-secret-key-for-testing-only".to_owned());
        settings.menu.base_url = MENU_BASE_URL.to_owned();

        let pool = db::connect(&settings.database)
            .await
            .expect("in-memory database");
        db::migrate(&pool).await.expect("migrations apply");
        let router = create_app(AppState::new(pool.clone(), &settings), &settings.cors);
        Self { router, pool }
    }

    /// Send a request and decode the JSON response body. Empty bodies decode
    /// to `Value::Null`.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("valid request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("infallible router");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("JSON response body")
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, token, None).await
    }

    /// Register a user and return their token and ID.
    pub async fn register(&self, email: &str) -> (String, Uuid) {
        let (status, body) = self
            .post(
                "/auth/register",
                None,
                json!({"email": email, "password": PASSWORD, "phone": "+1234567890"}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        (
            body["token"].as_str().expect("token").to_owned(),
            uuid_at(&body["user"]["id"]),
        )
    }

    pub async fn create_restaurant(&self, token: &str, name: &str) -> Uuid {
        let (status, body) = self
            .post(
                "/api/restaurants",
                Some(token),
                json!({"name": name, "address": "123 Test Street"}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        uuid_at(&body["id"])
    }

    pub async fn create_section(&self, token: &str, restaurant_id: Uuid, name: &str) -> Uuid {
        let (status, body) = self
            .post(
                &format!("/api/restaurants/{restaurant_id}/menu/sections"),
                Some(token),
                json!({"name": name}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        uuid_at(&body["id"])
    }

    pub async fn create_item(&self, token: &str, section_id: Uuid, name: &str, price: i64) -> Uuid {
        let (status, body) = self
            .post(
                &format!("/api/sections/{section_id}/items"),
                Some(token),
                json!({"name": name, "price": price}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        uuid_at(&body["id"])
    }

    /// Create a table and return its ID and unique code.
    pub async fn create_table(&self, token: &str, restaurant_id: Uuid, name: &str) -> (Uuid, String) {
        let (status, body) = self
            .post(
                &format!("/api/restaurants/{restaurant_id}/tables"),
                Some(token),
                json!({"name": name}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        (
            uuid_at(&body["id"]),
            body["unique_code"].as_str().expect("code").to_owned(),
        )
    }

    /// Invite `email` and redeem the invite as a new user. Returns their token
    /// and ID.
    pub async fn add_manager(
        &self,
        owner_token: &str,
        restaurant_id: Uuid,
        email: &str,
        can_manage_menu: bool,
    ) -> (String, Uuid) {
        let (status, invite) = self
            .post(
                &format!("/api/restaurants/{restaurant_id}/managers/invite"),
                Some(owner_token),
                json!({"email": email, "can_manage_menu": can_manage_menu}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{invite}");
        let token = invite["invite_token"].as_str().expect("invite token");
        let (status, body) = self
            .post(
                &format!("/restaurants/{restaurant_id}/managers/join/{token}"),
                None,
                json!({"email": email, "password": PASSWORD}),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        (
            body["token"].as_str().expect("token").to_owned(),
            uuid_at(&body["user"]["id"]),
        )
    }
}

pub fn uuid_at(value: &Value) -> Uuid {
    value
        .as_str()
        .and_then(|raw| Uuid::parse_str(raw).ok())
        .unwrap_or_else(|| panic!("expected a UUID, got {value}"))
}
