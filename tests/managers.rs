mod common;

use axum::http::StatusCode;
use common::{TestApp, PASSWORD};
use letsorder_api::db;
use serde_json::json;
use time::Duration;

#[tokio::test]
async fn invited_user_joins_with_invited_permissions() {
    let app = TestApp::new().await;
    let (owner, _) = app.register("owner@example.com").await;
    let restaurant_id = app.create_restaurant(&owner, "Diner").await;
    let (manager, manager_id) = app
        .add_manager(&owner, restaurant_id, "new@example.com", false)
        .await;

    let (status, body) = app
        .get(&format!("/api/restaurants/{restaurant_id}/managers"), Some(&owner))
        .await;
    assert_eq!(status, StatusCode::OK);
    let managers = body.as_array().expect("array");
    assert_eq!(managers.len(), 2);
    let joined = managers
        .iter()
        .find(|m| m["user_id"] == manager_id.to_string())
        .expect("joined manager listed");
    assert_eq!(joined["role"], "manager");
    assert_eq!(joined["can_manage_menu"], false);

    // Viewing is allowed but menu edits are not.
    let (status, _) = app
        .get(&format!("/api/restaurants/{restaurant_id}/menu"), Some(&manager))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app
        .post(
            &format!("/api/restaurants/{restaurant_id}/menu/sections"),
            Some(&manager),
            json!({"name": "Drinks"}),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn invites_are_single_use() {
    let app = TestApp::new().await;
    let (owner, _) = app.register("owner@example.com").await;
    let restaurant_id = app.create_restaurant(&owner, "Diner").await;
    let (_, invite) = app
        .post(
            &format!("/api/restaurants/{restaurant_id}/managers/invite"),
            Some(&owner),
            json!({"email": "once@example.com"}),
        )
        .await;
    let token = invite["invite_token"].as_str().expect("token");
    assert_eq!(token.len(), 64);
    let join_uri = format!("/restaurants/{restaurant_id}/managers/join/{token}");
    let details = json!({"email": "once@example.com", "password": PASSWORD});

    let (status, _) = app.post(&join_uri, None, details.clone()).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = app.post(&join_uri, None, details).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid or expired invite");
}

#[tokio::test]
async fn expired_invites_cannot_be_redeemed() {
    let app = TestApp::new().await;
    let (owner, _) = app.register("owner@example.com").await;
    let restaurant_id = app.create_restaurant(&owner, "Diner").await;
    let invite_uri = format!("/api/restaurants/{restaurant_id}/managers/invite");
    let (_, invite) = app
        .post(&invite_uri, Some(&owner), json!({"email": "late@example.com"}))
        .await;
    let token = invite["invite_token"].as_str().expect("token");
    sqlx::query("UPDATE manager_invites SET expires_at = ? WHERE restaurant_id = ?")
        .bind(db::now() - Duration::minutes(1))
        .bind(restaurant_id)
        .execute(&app.pool)
        .await
        .unwrap();

    let (status, body) = app
        .post(
            &format!("/restaurants/{restaurant_id}/managers/join/{token}"),
            None,
            json!({"email": "late@example.com", "password": PASSWORD}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid or expired invite");
    let (status, _) = app
        .post("/auth/login", None, json!({"email": "late@example.com", "password": PASSWORD}))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // An expired invite does not block issuing a fresh one.
    let (status, _) = app
        .post(&invite_uri, Some(&owner), json!({"email": "late@example.com"}))
        .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn join_rejects_mismatched_email_and_bad_tokens() {
    let app = TestApp::new().await;
    let (owner, _) = app.register("owner@example.com").await;
    let restaurant_id = app.create_restaurant(&owner, "Diner").await;
    let (_, invite) = app
        .post(
            &format!("/api/restaurants/{restaurant_id}/managers/invite"),
            Some(&owner),
            json!({"email": "invited@example.com"}),
        )
        .await;
    let token = invite["invite_token"].as_str().expect("token");

    let (status, _) = app
        .post(
            &format!("/restaurants/{restaurant_id}/managers/join/{token}"),
            None,
            json!({"email": "someone-else@example.com", "password": PASSWORD}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            &format!("/restaurants/{restaurant_id}/managers/join/deadbeef"),
            None,
            json!({"email": "invited@example.com", "password": PASSWORD}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn existing_user_must_prove_their_password() {
    let app = TestApp::new().await;
    let (owner, _) = app.register("owner@example.com").await;
    app.register("existing@example.com").await;
    let restaurant_id = app.create_restaurant(&owner, "Diner").await;
    let (_, invite) = app
        .post(
            &format!("/api/restaurants/{restaurant_id}/managers/invite"),
            Some(&owner),
            json!({"email": "existing@example.com", "can_manage_menu": true}),
        )
        .await;
    let join_uri = format!(
        "/restaurants/{restaurant_id}/managers/join/{}",
        invite["invite_token"].as_str().expect("token")
    );

    let (status, _) = app
        .post(
            &join_uri,
            None,
            json!({"email": "existing@example.com", "password": "not-the-password"}),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app
        .post(
            &join_uri,
            None,
            json!({"email": "existing@example.com", "password": PASSWORD}),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["user"]["email"], "existing@example.com");
}

#[tokio::test]
async fn duplicate_invites_conflict() {
    let app = TestApp::new().await;
    let (owner, _) = app.register("owner@example.com").await;
    let restaurant_id = app.create_restaurant(&owner, "Diner").await;
    let uri = format!("/api/restaurants/{restaurant_id}/managers/invite");

    let (status, _) = app
        .post(&uri, Some(&owner), json!({"email": "pending@example.com"}))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = app
        .post(&uri, Some(&owner), json!({"email": "pending@example.com"}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = app
        .post(&uri, Some(&owner), json!({"email": "owner@example.com"}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn super_admin_manages_other_managers() {
    let app = TestApp::new().await;
    let (owner, owner_id) = app.register("owner@example.com").await;
    let restaurant_id = app.create_restaurant(&owner, "Diner").await;
    let (manager, manager_id) = app
        .add_manager(&owner, restaurant_id, "staff@example.com", false)
        .await;
    let manager_uri = format!("/api/restaurants/{restaurant_id}/managers/{manager_id}");

    let (status, _) = app
        .put(&manager_uri, Some(&owner), json!({"can_manage_menu": true}))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app
        .post(
            &format!("/api/restaurants/{restaurant_id}/menu/sections"),
            Some(&manager),
            json!({"name": "Drinks"}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    // Managers cannot administer, and nobody can remove themselves or demote
    // the super admin.
    let (status, _) = app
        .delete(
            &format!("/api/restaurants/{restaurant_id}/managers/{owner_id}"),
            Some(&manager),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app
        .delete(
            &format!("/api/restaurants/{restaurant_id}/managers/{owner_id}"),
            Some(&owner),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = app
        .put(
            &format!("/api/restaurants/{restaurant_id}/managers/{owner_id}"),
            Some(&owner),
            json!({"can_manage_menu": false}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.delete(&manager_uri, Some(&owner)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.delete(&manager_uri, Some(&owner)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app
        .get(&format!("/api/restaurants/{restaurant_id}"), Some(&manager))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
