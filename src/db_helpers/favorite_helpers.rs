use sqlx::SqlitePool;

use crate::{errors::RequestError, models::RecipeSummary, shopping_list::CartLine};

async fn get_recipe_summary(
    pool: &SqlitePool,
    recipe_id: i64,
) -> Result<RecipeSummary, RequestError> {
    let summary = sqlx::query_as::<_, RecipeSummary>(
        "SELECT id, name, image, cooking_time FROM recipes WHERE id = ?",
    )
    .bind(recipe_id)
    .fetch_optional(pool)
    .await?;
    summary.ok_or(RequestError::NotFound)
}

async fn relation_exists(
    pool: &SqlitePool,
    table: &'static str,
    user_id: i64,
    recipe_id: i64,
) -> Result<bool, RequestError> {
    let query = format!("SELECT COUNT(*) FROM {table} WHERE user_id = ? AND recipe_id = ?");
    let (count,): (i64,) = sqlx::query_as(&query)
        .bind(user_id)
        .bind(recipe_id)
        .fetch_one(pool)
        .await?;
    Ok(count > 0)
}

pub async fn is_favorited_in_db(
    pool: &SqlitePool,
    user_id: i64,
    recipe_id: i64,
) -> Result<bool, RequestError> {
    relation_exists(pool, "favorites", user_id, recipe_id).await
}

pub async fn is_in_cart_in_db(
    pool: &SqlitePool,
    user_id: i64,
    recipe_id: i64,
) -> Result<bool, RequestError> {
    relation_exists(pool, "shopping_cart", user_id, recipe_id).await
}

pub async fn add_favorite_in_db(
    pool: &SqlitePool,
    user_id: i64,
    recipe_id: i64,
) -> Result<RecipeSummary, RequestError> {
    let summary = get_recipe_summary(pool, recipe_id).await?;
    if is_favorited_in_db(pool, user_id, recipe_id).await? {
        return Err(RequestError::BadRequest("Recipe is already in favorites"));
    }
    sqlx::query("INSERT INTO favorites (user_id, recipe_id) VALUES (?, ?)")
        .bind(user_id)
        .bind(recipe_id)
        .execute(pool)
        .await?;
    Ok(summary)
}

pub async fn remove_favorite_in_db(
    pool: &SqlitePool,
    user_id: i64,
    recipe_id: i64,
) -> Result<(), RequestError> {
    get_recipe_summary(pool, recipe_id).await?;
    if !is_favorited_in_db(pool, user_id, recipe_id).await? {
        return Err(RequestError::BadRequest("Recipe is not in favorites"));
    }
    sqlx::query("DELETE FROM favorites WHERE user_id = ? AND recipe_id = ?")
        .bind(user_id)
        .bind(recipe_id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn add_to_cart_in_db(
    pool: &SqlitePool,
    user_id: i64,
    recipe_id: i64,
) -> Result<RecipeSummary, RequestError> {
    let summary = get_recipe_summary(pool, recipe_id).await?;
    if is_in_cart_in_db(pool, user_id, recipe_id).await? {
        return Err(RequestError::BadRequest(
            "Recipe is already in the shopping cart",
        ));
    }
    sqlx::query("INSERT INTO shopping_cart (user_id, recipe_id) VALUES (?, ?)")
        .bind(user_id)
        .bind(recipe_id)
        .execute(pool)
        .await?;
    Ok(summary)
}

pub async fn remove_from_cart_in_db(
    pool: &SqlitePool,
    user_id: i64,
    recipe_id: i64,
) -> Result<(), RequestError> {
    get_recipe_summary(pool, recipe_id).await?;
    if !is_in_cart_in_db(pool, user_id, recipe_id).await? {
        return Err(RequestError::BadRequest(
            "Recipe is not in the shopping cart",
        ));
    }
    sqlx::query("DELETE FROM shopping_cart WHERE user_id = ? AND recipe_id = ?")
        .bind(user_id)
        .bind(recipe_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Every ingredient link from every recipe in the user's cart, in cart
/// insertion order. Aggregation happens in `shopping_list`.
pub async fn get_cart_lines_in_db(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<Vec<CartLine>, RequestError> {
    let lines = sqlx::query_as::<_, CartLine>(
        r#"
        SELECT i.name, ri.amount
        FROM shopping_cart sc
        JOIN recipe_ingredients ri ON ri.recipe_id = sc.recipe_id
        JOIN ingredients i ON i.id = ri.ingredient_id
        WHERE sc.user_id = ?
        ORDER BY sc.id, ri.id
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(lines)
}
