use sqlx::SqlitePool;

use crate::{
    data_formats::{RegisterRequest, UpdateProfileRequest},
    errors::RequestError,
    models::User,
};

use super::{get_user_by_id, UpdateBuilder, USER_COLUMNS};

/// Inserts a new user. `user.password` must already be hashed.
pub async fn insert_user(pool: &SqlitePool, user: &RegisterRequest) -> Result<User, RequestError> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query(
        r#"
        INSERT INTO users (email, username, first_name, last_name, password)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&user.email)
    .bind(&user.username)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(&user.password)
    .execute(&mut tx)
    .await?;
    let id = result.last_insert_rowid();
    tx.commit().await?;

    match get_user_by_id(pool, id).await? {
        Some(user) => Ok(user),
        None => Err(RequestError::ServerError),
    }
}

pub async fn list_users_in_db(pool: &SqlitePool) -> Result<Vec<User>, RequestError> {
    let query = format!("SELECT {USER_COLUMNS} FROM users ORDER BY id");
    let users = sqlx::query_as::<_, User>(&query).fetch_all(pool).await?;
    Ok(users)
}

pub async fn update_user_in_db(
    pool: &SqlitePool,
    id: i64,
    UpdateProfileRequest {
        email,
        username,
        first_name,
        last_name,
    }: UpdateProfileRequest,
) -> Result<User, RequestError> {
    let built = UpdateBuilder::new()
        .set("email", email)
        .set("username", username)
        .set("first_name", first_name)
        .set("last_name", last_name)
        .build("users");

    if let Some((query, params)) = built {
        let mut query = sqlx::query(&query);
        for param in params {
            query = query.bind(param);
        }
        query.bind(id).execute(pool).await?;
    }

    match get_user_by_id(pool, id).await? {
        Some(user) => Ok(user),
        None => Err(RequestError::NotFound),
    }
}

pub async fn set_password_in_db(
    pool: &SqlitePool,
    id: i64,
    password_hash: &str,
) -> Result<(), RequestError> {
    sqlx::query("UPDATE users SET password = ? WHERE id = ?")
        .bind(password_hash)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn set_avatar_in_db(
    pool: &SqlitePool,
    id: i64,
    avatar: &str,
) -> Result<(), RequestError> {
    sqlx::query("UPDATE users SET avatar = ? WHERE id = ?")
        .bind(avatar)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn clear_avatar_in_db(pool: &SqlitePool, id: i64) -> Result<(), RequestError> {
    sqlx::query("UPDATE users SET avatar = NULL WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
