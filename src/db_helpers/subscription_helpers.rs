use sqlx::SqlitePool;

use crate::{errors::RequestError, models::User};

use super::{get_user_by_id, USER_COLUMNS};

pub async fn is_subscribed_in_db(
    pool: &SqlitePool,
    follower_id: i64,
    following_id: i64,
) -> Result<bool, RequestError> {
    let (count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM followers WHERE follower_id = ? AND following_id = ?",
    )
    .bind(follower_id)
    .bind(following_id)
    .fetch_one(pool)
    .await?;
    Ok(count > 0)
}

/// Creates the (follower, following) link. Self-subscription is rejected
/// before any lookup; the duplicate check races benignly with concurrent
/// inserts and the unique index backs it up.
pub async fn subscribe_in_db(
    pool: &SqlitePool,
    follower_id: i64,
    following_id: i64,
) -> Result<User, RequestError> {
    if follower_id == following_id {
        return Err(RequestError::BadRequest("You cannot subscribe to yourself"));
    }
    let following = match get_user_by_id(pool, following_id).await? {
        Some(user) => user,
        None => return Err(RequestError::NotFound),
    };
    if is_subscribed_in_db(pool, follower_id, following_id).await? {
        return Err(RequestError::BadRequest(
            "You are already subscribed to this user",
        ));
    }

    sqlx::query("INSERT INTO followers (follower_id, following_id) VALUES (?, ?)")
        .bind(follower_id)
        .bind(following_id)
        .execute(pool)
        .await?;

    Ok(following)
}

pub async fn unsubscribe_in_db(
    pool: &SqlitePool,
    follower_id: i64,
    following_id: i64,
) -> Result<(), RequestError> {
    if follower_id == following_id {
        return Err(RequestError::BadRequest("You cannot subscribe to yourself"));
    }
    if get_user_by_id(pool, following_id).await?.is_none() {
        return Err(RequestError::NotFound);
    }
    if !is_subscribed_in_db(pool, follower_id, following_id).await? {
        return Err(RequestError::BadRequest(
            "You are not subscribed to this user",
        ));
    }

    sqlx::query("DELETE FROM followers WHERE follower_id = ? AND following_id = ?")
        .bind(follower_id)
        .bind(following_id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn list_followed_users_in_db(
    pool: &SqlitePool,
    follower_id: i64,
) -> Result<Vec<User>, RequestError> {
    let query = format!(
        r#"
        SELECT {USER_COLUMNS} FROM users
        WHERE id IN (SELECT following_id FROM followers WHERE follower_id = ?)
        ORDER BY id
        "#
    );
    let users = sqlx::query_as::<_, User>(&query)
        .bind(follower_id)
        .fetch_all(pool)
        .await?;
    Ok(users)
}
