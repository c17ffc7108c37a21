use sqlx::SqlitePool;

use crate::{
    errors::RequestError,
    models::{Ingredient, RecipeIngredient},
};

pub async fn list_ingredients_in_db(
    pool: &SqlitePool,
    name_prefix: Option<&str>,
) -> Result<Vec<Ingredient>, RequestError> {
    let ingredients = match name_prefix {
        Some(prefix) => {
            // LIKE is case-insensitive for ASCII, matching the original
            // istartswith lookup closely enough for reference data.
            let pattern = format!("{}%", prefix.replace('%', "").replace('_', ""));
            sqlx::query_as::<_, Ingredient>(
                "SELECT id, name, measurement_unit FROM ingredients WHERE name LIKE ? ORDER BY name",
            )
            .bind(pattern)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, Ingredient>(
                "SELECT id, name, measurement_unit FROM ingredients ORDER BY name",
            )
            .fetch_all(pool)
            .await?
        }
    };
    Ok(ingredients)
}

pub async fn get_ingredient_in_db(
    pool: &SqlitePool,
    id: i64,
) -> Result<Ingredient, RequestError> {
    let ingredient = sqlx::query_as::<_, Ingredient>(
        "SELECT id, name, measurement_unit FROM ingredients WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    ingredient.ok_or(RequestError::NotFound)
}

pub async fn get_ingredients_for_recipe_in_db(
    pool: &SqlitePool,
    recipe_id: i64,
) -> Result<Vec<RecipeIngredient>, RequestError> {
    let ingredients = sqlx::query_as::<_, RecipeIngredient>(
        r#"
        SELECT i.id, i.name, i.measurement_unit, ri.amount
        FROM recipe_ingredients ri
        JOIN ingredients i ON i.id = ri.ingredient_id
        WHERE ri.recipe_id = ?
        ORDER BY ri.id
        "#,
    )
    .bind(recipe_id)
    .fetch_all(pool)
    .await?;
    Ok(ingredients)
}
