mod common;

use axum::http::StatusCode;
use common::{TestApp, MENU_BASE_URL};
use serde_json::json;

#[tokio::test]
async fn tables_get_unique_codes_and_urls() {
    let app = TestApp::new().await;
    let (token, _) = app.register("owner@example.com").await;
    let restaurant_id = app.create_restaurant(&token, "Cafe").await;

    let (status, table) = app
        .post(
            &format!("/api/restaurants/{restaurant_id}/tables"),
            Some(&token),
            json!({"name": "Window"}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{table}");
    let code = table["unique_code"].as_str().expect("code");
    assert_eq!(code.len(), 8);
    assert!(code
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    assert_eq!(
        table["qr_url"],
        format!("{MENU_BASE_URL}/m/{restaurant_id}/{code}")
    );

    app.create_table(&token, restaurant_id, "Bar").await;
    let (status, list) = app
        .get(&format!("/api/restaurants/{restaurant_id}/tables"), Some(&token))
        .await;
    assert_eq!(status, StatusCode::OK);
    let list = list.as_array().expect("array");
    assert_eq!(list.len(), 2);
    assert_ne!(list[0]["unique_code"], list[1]["unique_code"]);
}

#[tokio::test]
async fn refreshing_a_code_invalidates_the_old_one() {
    let app = TestApp::new().await;
    let (token, _) = app.register("owner@example.com").await;
    let restaurant_id = app.create_restaurant(&token, "Cafe").await;
    let (table_id, old_code) = app.create_table(&token, restaurant_id, "T1").await;

    let (status, body) = app
        .post(
            &format!("/api/restaurants/{restaurant_id}/tables/{table_id}/refresh-code"),
            Some(&token),
            json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let new_code = body["unique_code"].as_str().expect("code");
    assert_ne!(new_code, old_code);
    assert_eq!(body["table_id"], table_id.to_string());

    let (status, _) = app
        .get(&format!("/menu/{restaurant_id}/{old_code}"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app
        .get(&format!("/menu/{restaurant_id}/{new_code}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, qr) = app
        .get(
            &format!("/api/restaurants/{restaurant_id}/tables/{table_id}/qr-url"),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(qr["table_name"], "T1");
    assert_eq!(qr["unique_code"], new_code);
}

#[tokio::test]
async fn rename_and_delete_tables() {
    let app = TestApp::new().await;
    let (token, _) = app.register("owner@example.com").await;
    let restaurant_id = app.create_restaurant(&token, "Cafe").await;
    let (table_id, code) = app.create_table(&token, restaurant_id, "T1").await;
    let uri = format!("/api/restaurants/{restaurant_id}/tables/{table_id}");

    let (status, body) = app.put(&uri, Some(&token), json!({"name": "Terrace"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Terrace");
    assert_eq!(body["unique_code"], code);
    let (status, _) = app.put(&uri, Some(&token), json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = app.put(&uri, Some(&token), json!({"name": " "})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.delete(&uri, Some(&token)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.delete(&uri, Some(&token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn tables_are_scoped_to_their_restaurant() {
    let app = TestApp::new().await;
    let (token, _) = app.register("owner@example.com").await;
    let first = app.create_restaurant(&token, "First").await;
    let second = app.create_restaurant(&token, "Second").await;
    let (table_id, _) = app.create_table(&token, first, "T1").await;

    let (status, _) = app
        .delete(
            &format!("/api/restaurants/{second}/tables/{table_id}"),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn view_only_managers_cannot_edit_tables() {
    let app = TestApp::new().await;
    let (owner, _) = app.register("owner@example.com").await;
    let restaurant_id = app.create_restaurant(&owner, "Cafe").await;
    app.create_table(&owner, restaurant_id, "T1").await;
    let (viewer, _) = app
        .add_manager(&owner, restaurant_id, "viewer@example.com", false)
        .await;

    let (status, list) = app
        .get(&format!("/api/restaurants/{restaurant_id}/tables"), Some(&viewer))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().map(Vec::len), Some(1));
    let (status, _) = app
        .post(
            &format!("/api/restaurants/{restaurant_id}/tables"),
            Some(&viewer),
            json!({"name": "T2"}),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
