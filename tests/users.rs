mod common;

use axum::http::StatusCode;
use common::{body_json, TestApp, TEST_PASSWORD};
use serde_json::json;

#[tokio::test]
async fn register_returns_public_profile() {
    let app = TestApp::new().await;
    let resp = app
        .post_json(
            "/api/users",
            &json!({
                "email": "nina@example.com",
                "username": "nina",
                "first_name": "Nina",
                "last_name": "Ivanova",
                "password": TEST_PASSWORD,
            }),
            None,
        )
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let user = body_json(resp).await;
    assert_eq!(user["email"], "nina@example.com");
    assert_eq!(user["username"], "nina");
    assert_eq!(user["is_subscribed"], false);
    assert!(user.get("password").is_none());
}

#[tokio::test]
async fn register_rejects_duplicate_email() {
    let app = TestApp::new().await;
    app.register_and_login("nina@example.com", "nina").await;

    let resp = app
        .post_json(
            "/api/users",
            &json!({
                "email": "nina@example.com",
                "username": "other",
                "first_name": "Other",
                "last_name": "User",
                "password": TEST_PASSWORD,
            }),
            None,
        )
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert!(body["email"].is_array());
}

#[tokio::test]
async fn login_with_wrong_password_fails() {
    let app = TestApp::new().await;
    app.register_and_login("nina@example.com", "nina").await;

    let resp = app
        .post_json(
            "/api/auth/token/login",
            &json!({ "email": "nina@example.com", "password": "wrong" }),
            None,
        )
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn me_requires_token() {
    let app = TestApp::new().await;
    let resp = app.get("/api/users/me", None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn me_returns_current_user() {
    let app = TestApp::new().await;
    let (id, token) = app.register_and_login("nina@example.com", "nina").await;

    let resp = app.get("/api/users/me", Some(&token)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let user = body_json(resp).await;
    assert_eq!(user["id"], id);
    assert_eq!(user["username"], "nina");
}

#[tokio::test]
async fn patch_me_updates_only_submitted_fields() {
    let app = TestApp::new().await;
    let (_, token) = app.register_and_login("nina@example.com", "nina").await;

    let resp = app
        .patch_json(
            "/api/users/me",
            &json!({ "first_name": "Antonina" }),
            Some(&token),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let user = body_json(resp).await;
    assert_eq!(user["first_name"], "Antonina");
    assert_eq!(user["username"], "nina");
}

#[tokio::test]
async fn profile_404_for_unknown_user() {
    let app = TestApp::new().await;
    let resp = app.get("/api/users/999", None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn set_password_verifies_current_password() {
    let app = TestApp::new().await;
    let (_, token) = app.register_and_login("nina@example.com", "nina").await;

    let resp = app
        .post_json(
            "/api/users/set_password",
            &json!({ "new_password": "another-pass", "current_password": "wrong" }),
            Some(&token),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert!(body["current_password"].is_array());

    let resp = app
        .post_json(
            "/api/users/set_password",
            &json!({ "new_password": "another-pass", "current_password": TEST_PASSWORD }),
            Some(&token),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    // The new password works for login
    let resp = app
        .post_json(
            "/api/auth/token/login",
            &json!({ "email": "nina@example.com", "password": "another-pass" }),
            None,
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn avatar_can_be_set_and_cleared() {
    let app = TestApp::new().await;
    let (id, token) = app.register_and_login("nina@example.com", "nina").await;

    let resp = app
        .put_json(
            "/api/users/me/avatar",
            &json!({ "avatar": "data:image/png;base64,aGVsbG8=" }),
            Some(&token),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["avatar"], "data:image/png;base64,aGVsbG8=");

    let resp = app.get(&format!("/api/users/{id}"), None).await;
    let user = body_json(resp).await;
    assert_eq!(user["avatar"], "data:image/png;base64,aGVsbG8=");

    let resp = app.delete("/api/users/me/avatar", Some(&token)).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = app.get(&format!("/api/users/{id}"), None).await;
    let user = body_json(resp).await;
    assert!(user["avatar"].is_null());
}

#[tokio::test]
async fn avatar_field_is_required() {
    let app = TestApp::new().await;
    let (_, token) = app.register_and_login("nina@example.com", "nina").await;

    let resp = app
        .put_json("/api/users/me/avatar", &json!({}), Some(&token))
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert!(body["avatar"].is_array());
}
