use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::{Extension, Router};
use serde_json::{json, Value};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::sync::Arc;
use tower::ServiceExt;

pub const TEST_PASSWORD: &str = "correct-horse-battery";

pub struct TestApp {
    pub router: Router,
    pub db: SqlitePool,
}

impl TestApp {
    pub async fn new() -> Self {
        std::env::set_var("JWT_SECRET", "test-secret");

        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .unwrap()
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .expect("Failed to create in-memory SQLite pool");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        let router = recipebox::make_router().layer(Extension(Arc::new(pool.clone())));

        Self { router, db: pool }
    }

    pub async fn request(&self, req: Request<Body>) -> Response {
        self.router.clone().oneshot(req).await.unwrap()
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Response {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Token {token}"));
        }
        self.request(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> Response {
        let mut builder = Request::builder().uri(uri).method("DELETE");
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Token {token}"));
        }
        self.request(builder.body(Body::empty()).unwrap()).await
    }

    async fn send_json(
        &self,
        method: &str,
        uri: &str,
        body: &Value,
        token: Option<&str>,
    ) -> Response {
        let mut builder = Request::builder()
            .uri(uri)
            .method(method)
            .header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Token {token}"));
        }
        let req = builder.body(Body::from(body.to_string())).unwrap();
        self.request(req).await
    }

    pub async fn post_json(&self, uri: &str, body: &Value, token: Option<&str>) -> Response {
        self.send_json("POST", uri, body, token).await
    }

    pub async fn patch_json(&self, uri: &str, body: &Value, token: Option<&str>) -> Response {
        self.send_json("PATCH", uri, body, token).await
    }

    pub async fn put_json(&self, uri: &str, body: &Value, token: Option<&str>) -> Response {
        self.send_json("PUT", uri, body, token).await
    }

    /// Registers a user through the API and logs them in.
    /// Returns (user id, auth token).
    pub async fn register_and_login(&self, email: &str, username: &str) -> (i64, String) {
        let resp = self
            .post_json(
                "/api/users",
                &json!({
                    "email": email,
                    "username": username,
                    "first_name": "Test",
                    "last_name": "User",
                    "password": TEST_PASSWORD,
                }),
                None,
            )
            .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let user = body_json(resp).await;
        let id = user["id"].as_i64().unwrap();

        let resp = self
            .post_json(
                "/api/auth/token/login",
                &json!({ "email": email, "password": TEST_PASSWORD }),
                None,
            )
            .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let token = body_json(resp).await["auth_token"]
            .as_str()
            .unwrap()
            .to_string();

        (id, token)
    }

    pub async fn seed_tag(&self, name: &str, slug: &str) -> i64 {
        sqlx::query("INSERT INTO tags (name, slug) VALUES (?, ?)")
            .bind(name)
            .bind(slug)
            .execute(&self.db)
            .await
            .expect("Failed to seed tag")
            .last_insert_rowid()
    }

    pub async fn seed_ingredient(&self, name: &str, measurement_unit: &str) -> i64 {
        sqlx::query("INSERT INTO ingredients (name, measurement_unit) VALUES (?, ?)")
            .bind(name)
            .bind(measurement_unit)
            .execute(&self.db)
            .await
            .expect("Failed to seed ingredient")
            .last_insert_rowid()
    }

    /// Creates a recipe through the API and returns its id.
    pub async fn create_recipe(
        &self,
        token: &str,
        name: &str,
        tags: &[i64],
        ingredients: &[(i64, i64)],
    ) -> i64 {
        let ingredients: Vec<Value> = ingredients
            .iter()
            .map(|(id, amount)| json!({ "id": id, "amount": amount }))
            .collect();
        let resp = self
            .post_json(
                "/api/recipes",
                &json!({
                    "ingredients": ingredients,
                    "tags": tags,
                    "name": name,
                    "text": "Combine everything.",
                    "cooking_time": 10,
                }),
                Some(token),
            )
            .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        body_json(resp).await["id"].as_i64().unwrap()
    }
}

pub async fn body_json(resp: Response) -> Value {
    let bytes = hyper::body::to_bytes(resp.into_body()).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_string(resp: Response) -> String {
    let bytes = hyper::body::to_bytes(resp.into_body()).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
