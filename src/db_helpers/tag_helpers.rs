use sqlx::SqlitePool;

use crate::{errors::RequestError, models::Tag};

pub async fn list_tags_in_db(pool: &SqlitePool) -> Result<Vec<Tag>, RequestError> {
    let tags = sqlx::query_as::<_, Tag>("SELECT id, name, slug FROM tags ORDER BY id")
        .fetch_all(pool)
        .await?;
    Ok(tags)
}

pub async fn get_tag_in_db(pool: &SqlitePool, id: i64) -> Result<Tag, RequestError> {
    let tag = sqlx::query_as::<_, Tag>("SELECT id, name, slug FROM tags WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    tag.ok_or(RequestError::NotFound)
}

pub async fn get_tags_for_recipe_in_db(
    pool: &SqlitePool,
    recipe_id: i64,
) -> Result<Vec<Tag>, RequestError> {
    let tags = sqlx::query_as::<_, Tag>(
        r#"
        SELECT t.id, t.name, t.slug
        FROM tags t
        JOIN recipe_tags rt ON rt.tag_id = t.id
        WHERE rt.recipe_id = ?
        ORDER BY rt.id
        "#,
    )
    .bind(recipe_id)
    .fetch_all(pool)
    .await?;
    Ok(tags)
}
