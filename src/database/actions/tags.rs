use sqlx::{Pool, Postgres};

use crate::error::{Error, QueryError};
use crate::schema::{Tag, Uuid};

pub async fn create_tag(name: &str, slug: &str, pool: &Pool<Postgres>) -> Result<Uuid, Error> {
    let id: (Uuid,) = sqlx::query_as(
        "INSERT INTO tags (name, slug) VALUES ($1, $2) ON CONFLICT (slug) DO UPDATE SET name = $1 RETURNING id",
    )
    .bind(name)
    .bind(slug)
    .fetch_one(pool)
    .await
    .map_err(QueryError::from)?;

    Ok(id.0)
}

pub async fn get_tag(id: Uuid, pool: &Pool<Postgres>) -> Result<Option<Tag>, Error> {
    let row: Option<Tag> = sqlx::query_as("SELECT * FROM tags WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(QueryError::from)?;

    Ok(row)
}

/// Slug is the external identifier tags are filtered by.
pub async fn find_tag(slug: &str, pool: &Pool<Postgres>) -> Result<Option<Uuid>, Error> {
    let row: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM tags WHERE slug = $1")
        .bind(slug)
        .fetch_optional(pool)
        .await
        .map_err(QueryError::from)?;

    Ok(row.map(|tag| tag.0))
}

pub async fn list_tags(pool: &Pool<Postgres>) -> Result<Vec<Tag>, Error> {
    let rows: Vec<Tag> = sqlx::query_as("SELECT * FROM tags ORDER BY id")
        .fetch_all(pool)
        .await
        .map_err(QueryError::from)?;

    Ok(rows)
}

pub async fn list_recipe_tags(pool: &Pool<Postgres>, recipe_id: Uuid) -> Result<Vec<Tag>, Error> {
    let rows: Vec<Tag> = sqlx::query_as(
        "
        SELECT t.id AS id, t.name AS name, t.slug AS slug
        FROM recipe_tags_map m
        INNER JOIN tags t ON t.id = m.tag_id
        WHERE m.recipe_id = $1
        ORDER BY t.id
    ",
    )
    .bind(recipe_id)
    .fetch_all(pool)
    .await
    .map_err(QueryError::from)?;

    Ok(rows)
}

pub async fn add_tag_to_recipe(
    recipe_id: Uuid,
    tag_id: Uuid,
    pool: &Pool<Postgres>,
) -> Result<(), Error> {
    let tag = get_tag(tag_id, pool).await?;
    if tag.is_none() {
        return Err(Error::NotFound("tag"));
    }

    sqlx::query(
        "INSERT INTO recipe_tags_map (recipe_id, tag_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
    )
    .bind(recipe_id)
    .bind(tag_id)
    .execute(pool)
    .await
    .map_err(QueryError::from)?;

    Ok(())
}

pub async fn remove_tag_from_recipe(
    recipe_id: Uuid,
    tag_id: Uuid,
    pool: &Pool<Postgres>,
) -> Result<(), Error> {
    sqlx::query("DELETE FROM recipe_tags_map WHERE recipe_id = $1 AND tag_id = $2")
        .bind(recipe_id)
        .bind(tag_id)
        .execute(pool)
        .await
        .map_err(QueryError::from)?;

    Ok(())
}
