mod common;

use axum::http::StatusCode;
use common::{body_json, body_string, TestApp};
use serde_json::json;

#[tokio::test]
async fn favorite_returns_short_recipe_form() {
    let app = TestApp::new().await;
    let (_, token) = app.register_and_login("nina@example.com", "nina").await;
    let tag = app.seed_tag("Breakfast", "breakfast").await;
    let flour = app.seed_ingredient("flour", "g").await;
    let recipe_id = app
        .create_recipe(&token, "Pancakes", &[tag], &[(flour, 100)])
        .await;

    let resp = app
        .post_json(
            &format!("/api/recipes/{recipe_id}/favorite"),
            &json!({}),
            Some(&token),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = body_json(resp).await;
    assert_eq!(body["id"], recipe_id);
    assert_eq!(body["name"], "Pancakes");
    assert_eq!(body["cooking_time"], 10);
    assert!(body.get("text").is_none());
}

#[tokio::test]
async fn favoriting_twice_is_rejected() {
    let app = TestApp::new().await;
    let (_, token) = app.register_and_login("nina@example.com", "nina").await;
    let tag = app.seed_tag("Breakfast", "breakfast").await;
    let flour = app.seed_ingredient("flour", "g").await;
    let recipe_id = app
        .create_recipe(&token, "Pancakes", &[tag], &[(flour, 100)])
        .await;

    let uri = format!("/api/recipes/{recipe_id}/favorite");
    let resp = app.post_json(&uri, &json!({}), Some(&token)).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = app.post_json(&uri, &json!({}), Some(&token)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn unfavoriting_a_non_favorite_is_rejected() {
    let app = TestApp::new().await;
    let (_, token) = app.register_and_login("nina@example.com", "nina").await;
    let tag = app.seed_tag("Breakfast", "breakfast").await;
    let flour = app.seed_ingredient("flour", "g").await;
    let recipe_id = app
        .create_recipe(&token, "Pancakes", &[tag], &[(flour, 100)])
        .await;

    let resp = app
        .delete(&format!("/api/recipes/{recipe_id}/favorite"), Some(&token))
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn favorite_unknown_recipe_is_404() {
    let app = TestApp::new().await;
    let (_, token) = app.register_and_login("nina@example.com", "nina").await;

    let resp = app
        .post_json("/api/recipes/999/favorite", &json!({}), Some(&token))
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn cart_add_and_remove_follow_the_same_guards() {
    let app = TestApp::new().await;
    let (_, token) = app.register_and_login("nina@example.com", "nina").await;
    let tag = app.seed_tag("Breakfast", "breakfast").await;
    let flour = app.seed_ingredient("flour", "g").await;
    let recipe_id = app
        .create_recipe(&token, "Pancakes", &[tag], &[(flour, 100)])
        .await;

    let uri = format!("/api/recipes/{recipe_id}/shopping_cart");
    let resp = app.post_json(&uri, &json!({}), Some(&token)).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = app.post_json(&uri, &json!({}), Some(&token)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = app.delete(&uri, Some(&token)).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = app.delete(&uri, Some(&token)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn download_aggregates_amounts_by_ingredient_name() {
    let app = TestApp::new().await;
    let (_, token) = app.register_and_login("nina@example.com", "nina").await;
    let tag = app.seed_tag("Breakfast", "breakfast").await;
    let flour = app.seed_ingredient("flour", "g").await;
    let egg = app.seed_ingredient("egg", "pcs").await;

    let pancakes = app
        .create_recipe(&token, "Pancakes", &[tag], &[(flour, 100)])
        .await;
    let omelette = app
        .create_recipe(&token, "Omelette", &[tag], &[(flour, 50), (egg, 2)])
        .await;

    for recipe_id in [pancakes, omelette] {
        let resp = app
            .post_json(
                &format!("/api/recipes/{recipe_id}/shopping_cart"),
                &json!({}),
                Some(&token),
            )
            .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let resp = app
        .get("/api/recipes/download_shopping_cart", Some(&token))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let disposition = resp
        .headers()
        .get("content-disposition")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment"));

    let body = body_string(resp).await;
    assert!(body.starts_with("Shopping list:\n\n"));
    assert!(body.contains("flour: 150\n"));
    assert!(body.contains("egg: 2\n"));
}

#[tokio::test]
async fn download_requires_authentication() {
    let app = TestApp::new().await;
    let resp = app.get("/api/recipes/download_shopping_cart", None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn download_with_empty_cart_has_header_only() {
    let app = TestApp::new().await;
    let (_, token) = app.register_and_login("nina@example.com", "nina").await;

    let resp = app
        .get("/api/recipes/download_shopping_cart", Some(&token))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_string(resp).await, "Shopping list:\n\n");
}
