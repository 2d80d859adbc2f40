mod common;

use axum::http::StatusCode;
use common::{uuid_at, TestApp};
use serde_json::{json, Value};
use uuid::Uuid;

fn names(list: &Value) -> Vec<&str> {
    list.as_array()
        .expect("array")
        .iter()
        .map(|entry| entry["name"].as_str().expect("name"))
        .collect()
}

async fn restaurant_with_owner(app: &TestApp) -> (String, Uuid) {
    let (token, _) = app.register("owner@example.com").await;
    let restaurant_id = app.create_restaurant(&token, "Cafe").await;
    (token, restaurant_id)
}

#[tokio::test]
async fn sections_append_in_creation_order() {
    let app = TestApp::new().await;
    let (token, restaurant_id) = restaurant_with_owner(&app).await;
    for name in ["Starters", "Mains", "Desserts"] {
        app.create_section(&token, restaurant_id, name).await;
    }

    let (status, body) = app
        .get(&format!("/api/restaurants/{restaurant_id}/menu/sections"), Some(&token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&body), ["Starters", "Mains", "Desserts"]);
    assert_eq!(body[0]["display_order"], 1);
    assert_eq!(body[2]["display_order"], 3);
}

#[tokio::test]
async fn move_section_renumbers_contiguously() {
    let app = TestApp::new().await;
    let (token, restaurant_id) = restaurant_with_owner(&app).await;
    let _a = app.create_section(&token, restaurant_id, "A").await;
    let _b = app.create_section(&token, restaurant_id, "B").await;
    let c = app.create_section(&token, restaurant_id, "C").await;

    let (status, body) = app
        .post(
            &format!("/api/restaurants/{restaurant_id}/menu/sections/{c}/move"),
            Some(&token),
            json!({"position": 0}),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(names(&body), ["C", "A", "B"]);
    let orders: Vec<i64> = body
        .as_array()
        .expect("array")
        .iter()
        .map(|s| s["display_order"].as_i64().expect("order"))
        .collect();
    assert_eq!(orders, [1, 2, 3]);

    // Positions past the end clamp to last.
    let (status, body) = app
        .post(
            &format!("/api/restaurants/{restaurant_id}/menu/sections/{c}/move"),
            Some(&token),
            json!({"position": 42}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&body), ["A", "B", "C"]);
}

#[tokio::test]
async fn explicit_section_reorder() {
    let app = TestApp::new().await;
    let (token, restaurant_id) = restaurant_with_owner(&app).await;
    let first = app.create_section(&token, restaurant_id, "First").await;
    let second = app.create_section(&token, restaurant_id, "Second").await;
    let uri = format!("/api/restaurants/{restaurant_id}/menu/sections/reorder");

    let (status, body) = app
        .post(
            &uri,
            Some(&token),
            json!({"section_orders": [
                {"section_id": first, "display_order": 20},
                {"section_id": second, "display_order": 10},
            ]}),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(names(&body), ["Second", "First"]);

    let (status, _) = app
        .post(&uri, Some(&token), json!({"section_orders": []}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            &uri,
            Some(&token),
            json!({"section_orders": [{"section_id": Uuid::new_v4(), "display_order": 1}]}),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn section_update_and_delete() {
    let app = TestApp::new().await;
    let (token, restaurant_id) = restaurant_with_owner(&app).await;
    let section_id = app.create_section(&token, restaurant_id, "Drinks").await;
    app.create_item(&token, section_id, "Lemonade", 350).await;
    let uri = format!("/api/restaurants/{restaurant_id}/menu/sections/{section_id}");

    let (status, body) = app
        .put(&uri, Some(&token), json!({"name": "Beverages"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Beverages");
    let (status, _) = app.put(&uri, Some(&token), json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.delete(&uri, Some(&token)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, menu) = app
        .get(&format!("/api/restaurants/{restaurant_id}/menu"), Some(&token))
        .await;
    assert_eq!(menu, json!([]));
    let (status, _) = app.delete(&uri, Some(&token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn item_lifecycle() {
    let app = TestApp::new().await;
    let (token, restaurant_id) = restaurant_with_owner(&app).await;
    let section_id = app.create_section(&token, restaurant_id, "Mains").await;

    let (status, item) = app
        .post(
            &format!("/api/sections/{section_id}/items"),
            Some(&token),
            json!({"name": "Burger", "description": "Beef patty", "price": 1250}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{item}");
    assert_eq!(item["available"], true);
    assert_eq!(item["display_order"], 1);
    let item_id = uuid_at(&item["id"]);
    let uri = format!("/api/items/{item_id}");

    let (status, body) = app.put(&uri, Some(&token), json!({"price": 1400})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["price"], 1400);
    assert_eq!(body["description"], "Beef patty");

    let (status, _) = app.put(&uri, Some(&token), json!({"price": -1})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = app
        .post(
            &format!("/api/sections/{section_id}/items"),
            Some(&token),
            json!({"name": "", "price": 100}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.delete(&uri, Some(&token)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.put(&uri, Some(&token), json!({"price": 1})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn hidden_items_stay_off_the_public_menu() {
    let app = TestApp::new().await;
    let (token, restaurant_id) = restaurant_with_owner(&app).await;
    let section_id = app.create_section(&token, restaurant_id, "Mains").await;
    app.create_item(&token, section_id, "Pasta", 1100).await;
    let hidden = app.create_item(&token, section_id, "Risotto", 1300).await;
    let (_, code) = app.create_table(&token, restaurant_id, "Patio 1").await;

    let (status, body) = app
        .put(
            &format!("/api/items/{hidden}/availability"),
            Some(&token),
            json!({"available": false}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["available"], false);

    let (status, menu) = app
        .get(&format!("/menu/{restaurant_id}/{code}"), None)
        .await;
    assert_eq!(status, StatusCode::OK, "{menu}");
    assert_eq!(menu["restaurant"]["name"], "Cafe");
    assert_eq!(menu["table"]["name"], "Patio 1");
    assert_eq!(names(&menu["sections"][0]["items"]), ["Pasta"]);

    let (_, admin) = app
        .get(&format!("/api/restaurants/{restaurant_id}/menu"), Some(&token))
        .await;
    assert_eq!(names(&admin[0]["items"]), ["Pasta", "Risotto"]);
}

#[tokio::test]
async fn public_menu_requires_matching_table() {
    let app = TestApp::new().await;
    let (token, restaurant_id) = restaurant_with_owner(&app).await;
    let other_restaurant = app.create_restaurant(&token, "Elsewhere").await;
    let (_, code) = app.create_table(&token, other_restaurant, "T1").await;

    let (status, _) = app
        .get(&format!("/menu/{restaurant_id}/{code}"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app
        .get(&format!("/menu/{restaurant_id}/NOPE0000"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn items_move_within_their_section() {
    let app = TestApp::new().await;
    let (token, restaurant_id) = restaurant_with_owner(&app).await;
    let section_id = app.create_section(&token, restaurant_id, "Mains").await;
    let first = app.create_item(&token, section_id, "One", 100).await;
    app.create_item(&token, section_id, "Two", 200).await;
    app.create_item(&token, section_id, "Three", 300).await;

    let (status, body) = app
        .post(
            &format!("/api/items/{first}/move"),
            Some(&token),
            json!({"position": 2}),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(names(&body), ["Two", "Three", "One"]);
    assert_eq!(body[2]["display_order"], 3);
}

#[tokio::test]
async fn bulk_item_reorder_reports_count() {
    let app = TestApp::new().await;
    let (token, restaurant_id) = restaurant_with_owner(&app).await;
    let section_id = app.create_section(&token, restaurant_id, "Mains").await;
    let a = app.create_item(&token, section_id, "A", 100).await;
    let b = app.create_item(&token, section_id, "B", 100).await;

    let (status, body) = app
        .post(
            "/api/items/reorder",
            Some(&token),
            json!({"item_orders": [
                {"item_id": a, "display_order": 2},
                {"item_id": b, "display_order": 1},
            ]}),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["updated_count"], 2);

    let (_, menu) = app
        .get(&format!("/api/restaurants/{restaurant_id}/menu"), Some(&token))
        .await;
    assert_eq!(names(&menu[0]["items"]), ["B", "A"]);
}

#[tokio::test]
async fn bulk_item_reorder_is_all_or_nothing() {
    let app = TestApp::new().await;
    let (owner, restaurant_id) = restaurant_with_owner(&app).await;
    let (stranger, _) = app.register("stranger@example.com").await;
    let foreign = app.create_restaurant(&stranger, "Foreign").await;
    let own_section = app.create_section(&owner, restaurant_id, "Mine").await;
    let foreign_section = app.create_section(&stranger, foreign, "Theirs").await;
    let mine = app.create_item(&owner, own_section, "Mine", 100).await;
    let theirs = app.create_item(&stranger, foreign_section, "Theirs", 100).await;

    let (status, _) = app
        .post(
            "/api/items/reorder",
            Some(&owner),
            json!({"item_orders": [
                {"item_id": mine, "display_order": 9},
                {"item_id": theirs, "display_order": 9},
            ]}),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, menu) = app
        .get(&format!("/api/restaurants/{restaurant_id}/menu"), Some(&owner))
        .await;
    assert_eq!(menu[0]["items"][0]["display_order"], 1);
}

#[tokio::test]
async fn malformed_requests_get_json_errors() {
    let app = TestApp::new().await;
    let (token, _) = app.register("owner@example.com").await;
    let restaurant_id = app.create_restaurant(&token, "Diner").await;
    let section = app.create_section(&token, restaurant_id, "Mains").await;

    let (status, body) = app
        .post(
            &format!("/api/restaurants/{restaurant_id}/menu/sections/{section}/move"),
            Some(&token),
            json!({"position": -1}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string(), "{body}");

    let (status, body) = app
        .get("/api/restaurants/not-a-uuid/menu", Some(&token))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string(), "{body}");

    let (status, body) = app
        .post(&format!("/api/sections/{section}/items"), Some(&token), json!({"name": "Soup"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string(), "{body}");
}
