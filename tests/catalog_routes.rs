//! Recipe, entitlement and speech routes.

use axum::http::StatusCode;
use chefito::config::ChefitoConfig;
use serde_json::{json, Value};

mod common;

#[tokio::test]
async fn test_list_and_free_recipe_detail() {
    let server = common::start_server(ChefitoConfig::default(), true).await;
    let client = common::client();

    let list: Value = client.get(server.url("/api/recipes")).send().await.unwrap().json().await.unwrap();
    let ids: Vec<&str> = list.as_array().unwrap().iter().map(|r| r["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["gazpacho", "paella"]);
    assert!(list[0].get("ingredients").is_none());

    let detail: Value = client
        .get(server.url("/api/recipes/gazpacho"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(detail["title"], "Gazpacho");
    assert_eq!(detail["ingredients"][0]["name"], "tomatoes");
    assert!(detail.get("free_recipes_remaining").is_none());

    let missing = client.get(server.url("/api/recipes/tortilla")).send().await.unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_premium_recipe_uses_free_views_then_requires_subscription() {
    let mut config = ChefitoConfig::default();
    config.entitlements.free_recipes = 1;
    let server = common::start_server(config, true).await;
    let client = common::client();

    let anonymous = client.get(server.url("/api/recipes/paella")).send().await.unwrap();
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

    let first: Value = client
        .get(server.url("/api/recipes/paella"))
        .header("x-user-id", "pablo")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(first["free_recipes_remaining"], 0);

    let denied = client
        .get(server.url("/api/recipes/paella"))
        .header("x-user-id", "pablo")
        .send()
        .await
        .unwrap();
    assert_eq!(denied.status(), StatusCode::PAYMENT_REQUIRED);

    let updated: Value = client
        .put(server.admin_url("/admin/entitlements/pablo"))
        .bearer_auth(common::ADMIN_KEY)
        .json(&json!({ "premium": true }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(updated["premium"], true);

    let granted = client
        .get(server.url("/api/recipes/paella"))
        .header("x-user-id", "pablo")
        .send()
        .await
        .unwrap();
    assert_eq!(granted.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_speech_failure_points_to_browser_fallback() {
    let server = common::start_server(ChefitoConfig::default(), false).await;
    let client = common::client();

    let res = client
        .post(server.url("/api/speech"))
        .json(&json!({ "text": "Preheat the oven" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["fallback"], "browser");
}

#[tokio::test]
async fn test_speech_validates_text() {
    let mut config = ChefitoConfig::default();
    config.speech.max_text_chars = 10;
    let server = common::start_server(config, true).await;
    let client = common::client();

    let empty = client
        .post(server.url("/api/speech"))
        .json(&json!({ "text": "   " }))
        .send()
        .await
        .unwrap();
    assert_eq!(empty.status(), StatusCode::BAD_REQUEST);

    let long = client
        .post(server.url("/api/speech"))
        .json(&json!({ "text": "a very long instruction" }))
        .send()
        .await
        .unwrap();
    assert_eq!(long.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_status() {
    let server = common::start_server(ChefitoConfig::default(), true).await;
    let client = common::client();

    let status: Value = client
        .get(server.admin_url("/admin/status"))
        .bearer_auth(common::ADMIN_KEY)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status["status"], "operational");
    assert_eq!(status["recipes"], 2);
}
