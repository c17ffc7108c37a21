mod authentication;
mod data_formats;
mod db_helpers;
mod errors;
mod handlers;
mod models;
mod shopping_list;

use anyhow::Context;
pub use anyhow::Result;
use axum::http::StatusCode;
use axum::{routing::*, Extension, Json, Router};
pub use data_formats::*;
use handlers::*;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::{net::SocketAddr, str::FromStr, sync::Arc};

pub type JsonResponse<T> = (StatusCode, Json<T>);

pub async fn run_app(app: Router, address: SocketAddr) -> Result<()> {
    let db = init_db().await?;
    let app = app.layer(Extension(Arc::new(db)));
    tracing::info!("listening on {}", address);
    axum::Server::bind(&address)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}

pub async fn init_db() -> Result<SqlitePool> {
    let db_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    connect_pool(&db_url).await
}

/// Connects to SQLite (creating the file if needed) and runs migrations.
pub async fn connect_pool(db_url: &str) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(db_url)
        .context("Invalid DATABASE_URL")?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .context("Failed to connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    Ok(pool)
}

pub fn make_router() -> Router {
    Router::new()
        .route("/check_health", get(alive))
        // users & auth
        .route("/api/users", get(list_users).post(register_user))
        .route("/api/auth/token/login", post(login_user))
        .route(
            "/api/users/me",
            get(get_current_user).patch(update_current_user),
        )
        .route("/api/users/me/avatar", put(set_avatar).delete(delete_avatar))
        .route("/api/users/set_password", post(set_password))
        .route("/api/users/subscriptions", get(list_subscriptions))
        .route("/api/users/:id", get(get_user_profile))
        .route(
            "/api/users/:id/subscribe",
            post(subscribe_user).delete(unsubscribe_user),
        )
        // tags & ingredients
        .route("/api/tags", get(list_tags))
        .route("/api/tags/:id", get(get_tag))
        .route("/api/ingredients", get(list_ingredients))
        .route("/api/ingredients/:id", get(get_ingredient))
        // recipes
        .route("/api/recipes", get(list_recipes).post(create_recipe))
        .route(
            "/api/recipes/download_shopping_cart",
            get(download_shopping_cart),
        )
        .route(
            "/api/recipes/:id",
            get(get_recipe).patch(update_recipe).delete(delete_recipe),
        )
        .route(
            "/api/recipes/:id/favorite",
            post(add_favorite).delete(remove_favorite),
        )
        .route(
            "/api/recipes/:id/shopping_cart",
            post(add_to_cart).delete(remove_from_cart),
        )
        .fallback(not_found)
}
