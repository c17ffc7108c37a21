use sqlx::SqlitePool;

use crate::{
    data_formats::{RecipeQueryParams, RecipeRequest},
    errors::RequestError,
    models::{Recipe, RecipeSummary},
};

use super::id_list;

const RECIPE_COLUMNS: &str = "id, author_id, name, image, text, cooking_time, created_at";

pub async fn get_recipe_in_db(pool: &SqlitePool, id: i64) -> Result<Recipe, RequestError> {
    let query = format!("SELECT {RECIPE_COLUMNS} FROM recipes WHERE id = ?");
    let recipe = sqlx::query_as::<_, Recipe>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    recipe.ok_or(RequestError::NotFound)
}

/// Lists recipes newest-first, applying the optional filters. The
/// `is_favorited` / `is_in_shopping_cart` filters are viewer-relative and
/// yield nothing for anonymous viewers.
pub async fn list_recipes_in_db(
    pool: &SqlitePool,
    params: &RecipeQueryParams,
    viewer_id: Option<i64>,
) -> Result<Vec<Recipe>, RequestError> {
    let mut query = format!("SELECT {RECIPE_COLUMNS} FROM recipes WHERE 1 = 1");
    let mut binds: Vec<String> = Vec::new();

    if let Some(author) = params.author {
        query.push_str(" AND author_id = ?");
        binds.push(author.to_string());
    }
    if !params.tags.is_empty() {
        let placeholders = vec!["?"; params.tags.len()].join(", ");
        query.push_str(&format!(
            " AND id IN (SELECT rt.recipe_id FROM recipe_tags rt \
             JOIN tags t ON t.id = rt.tag_id WHERE t.slug IN ({placeholders}))"
        ));
        binds.extend(params.tags.iter().cloned());
    }
    if params.is_favorited {
        match viewer_id {
            Some(viewer) => {
                query.push_str(" AND id IN (SELECT recipe_id FROM favorites WHERE user_id = ?)");
                binds.push(viewer.to_string());
            }
            None => return Ok(Vec::new()),
        }
    }
    if params.is_in_shopping_cart {
        match viewer_id {
            Some(viewer) => {
                query.push_str(
                    " AND id IN (SELECT recipe_id FROM shopping_cart WHERE user_id = ?)",
                );
                binds.push(viewer.to_string());
            }
            None => return Ok(Vec::new()),
        }
    }

    query.push_str(" ORDER BY id DESC");
    if let Some(limit) = params.limit {
        // limit/offset were parsed from the query string as integers
        query.push_str(&format!(" LIMIT {limit}"));
        if let Some(offset) = params.offset {
            query.push_str(&format!(" OFFSET {offset}"));
        }
    }

    let mut fetch = sqlx::query_as::<_, Recipe>(&query);
    for bind in binds {
        fetch = fetch.bind(bind);
    }
    let recipes = fetch.fetch_all(pool).await?;
    Ok(recipes)
}

pub async fn get_recipes_by_author_in_db(
    pool: &SqlitePool,
    author_id: i64,
    limit: Option<i64>,
) -> Result<Vec<RecipeSummary>, RequestError> {
    let mut query =
        String::from("SELECT id, name, image, cooking_time FROM recipes WHERE author_id = ? ORDER BY id DESC");
    if let Some(limit) = limit {
        query.push_str(&format!(" LIMIT {limit}"));
    }
    let recipes = sqlx::query_as::<_, RecipeSummary>(&query)
        .bind(author_id)
        .fetch_all(pool)
        .await?;
    Ok(recipes)
}

pub async fn count_recipes_by_author_in_db(
    pool: &SqlitePool,
    author_id: i64,
) -> Result<i64, RequestError> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM recipes WHERE author_id = ?")
        .bind(author_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Persists a recipe and its tag/ingredient links in one transaction.
/// The payload must already have passed `RecipeRequest::validate`.
pub async fn insert_recipe_in_db(
    pool: &SqlitePool,
    author_id: i64,
    request: &RecipeRequest,
) -> Result<i64, RequestError> {
    let mut tx = pool.begin().await?;

    let ingredient_ids: Vec<i64> = request.ingredients.iter().map(|i| i.id).collect();
    let (found,): (i64,) = sqlx::query_as(&format!(
        "SELECT COUNT(*) FROM ingredients WHERE id IN {}",
        id_list(&ingredient_ids)
    ))
    .fetch_one(&mut tx)
    .await?;
    if found != ingredient_ids.len() as i64 {
        return Err(RequestError::Validation(
            "ingredients",
            "Unknown ingredient id",
        ));
    }
    let (found,): (i64,) = sqlx::query_as(&format!(
        "SELECT COUNT(*) FROM tags WHERE id IN {}",
        id_list(&request.tags)
    ))
    .fetch_one(&mut tx)
    .await?;
    if found != request.tags.len() as i64 {
        return Err(RequestError::Validation("tags", "Unknown tag id"));
    }

    let result = sqlx::query(
        "INSERT INTO recipes (author_id, name, image, text, cooking_time) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(author_id)
    .bind(&request.name)
    .bind(&request.image)
    .bind(&request.text)
    .bind(request.cooking_time)
    .execute(&mut tx)
    .await?;
    let recipe_id = result.last_insert_rowid();

    for tag_id in &request.tags {
        sqlx::query("INSERT INTO recipe_tags (recipe_id, tag_id) VALUES (?, ?)")
            .bind(recipe_id)
            .bind(tag_id)
            .execute(&mut tx)
            .await?;
    }
    for ingredient in &request.ingredients {
        sqlx::query(
            "INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount) VALUES (?, ?, ?)",
        )
        .bind(recipe_id)
        .bind(ingredient.id)
        .bind(ingredient.amount)
        .execute(&mut tx)
        .await?;
    }

    tx.commit().await?;
    Ok(recipe_id)
}

/// Overwrites the scalar fields (image only when provided) and replaces the
/// tag and ingredient link sets wholesale: delete-then-reinsert rather than
/// diffing, all inside one transaction.
pub async fn update_recipe_in_db(
    pool: &SqlitePool,
    recipe_id: i64,
    request: &RecipeRequest,
) -> Result<(), RequestError> {
    let mut tx = pool.begin().await?;

    let ingredient_ids: Vec<i64> = request.ingredients.iter().map(|i| i.id).collect();
    let (found,): (i64,) = sqlx::query_as(&format!(
        "SELECT COUNT(*) FROM ingredients WHERE id IN {}",
        id_list(&ingredient_ids)
    ))
    .fetch_one(&mut tx)
    .await?;
    if found != ingredient_ids.len() as i64 {
        return Err(RequestError::Validation(
            "ingredients",
            "Unknown ingredient id",
        ));
    }
    let (found,): (i64,) = sqlx::query_as(&format!(
        "SELECT COUNT(*) FROM tags WHERE id IN {}",
        id_list(&request.tags)
    ))
    .fetch_one(&mut tx)
    .await?;
    if found != request.tags.len() as i64 {
        return Err(RequestError::Validation("tags", "Unknown tag id"));
    }

    sqlx::query("UPDATE recipes SET name = ?, text = ?, cooking_time = ? WHERE id = ?")
        .bind(&request.name)
        .bind(&request.text)
        .bind(request.cooking_time)
        .bind(recipe_id)
        .execute(&mut tx)
        .await?;
    if let Some(image) = &request.image {
        sqlx::query("UPDATE recipes SET image = ? WHERE id = ?")
            .bind(image)
            .bind(recipe_id)
            .execute(&mut tx)
            .await?;
    }

    sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = ?")
        .bind(recipe_id)
        .execute(&mut tx)
        .await?;
    sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = ?")
        .bind(recipe_id)
        .execute(&mut tx)
        .await?;

    for tag_id in &request.tags {
        sqlx::query("INSERT INTO recipe_tags (recipe_id, tag_id) VALUES (?, ?)")
            .bind(recipe_id)
            .bind(tag_id)
            .execute(&mut tx)
            .await?;
    }
    for ingredient in &request.ingredients {
        sqlx::query(
            "INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount) VALUES (?, ?, ?)",
        )
        .bind(recipe_id)
        .bind(ingredient.id)
        .bind(ingredient.amount)
        .execute(&mut tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

pub async fn delete_recipe_in_db(pool: &SqlitePool, recipe_id: i64) -> Result<(), RequestError> {
    sqlx::query("DELETE FROM recipes WHERE id = ?")
        .bind(recipe_id)
        .execute(pool)
        .await?;
    Ok(())
}
