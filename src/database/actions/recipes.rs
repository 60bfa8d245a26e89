use log::debug;
use sqlx::{Pool, Postgres};

use crate::constants::RECIPE_COUNT_PER_PAGE;
use crate::error::{Error, QueryError};
use crate::pagination::PageContext;
use crate::schema::{Recipe, RecipeIngredient, RecipeRow, Uuid};

use super::get_product;

pub async fn create_recipe(
    author_id: Uuid,
    name: &str,
    description: &str,
    image: &str,
    cook_time: i32,
    pool: &Pool<Postgres>,
) -> Result<Uuid, Error> {
    let id: (Uuid,) = sqlx::query_as(
        "
        INSERT INTO recipes (author_id, name, description, image, cook_time)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
    ",
    )
    .bind(author_id)
    .bind(name)
    .bind(description)
    .bind(image)
    .bind(cook_time)
    .fetch_one(pool)
    .await
    .map_err(QueryError::from)?;

    debug!("user {author_id} created recipe {}", id.0);
    Ok(id.0)
}

pub async fn get_recipe(id: Uuid, pool: &Pool<Postgres>) -> Result<Option<Recipe>, Error> {
    let row: Option<Recipe> = sqlx::query_as("SELECT * FROM recipes WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(QueryError::from)?;

    Ok(row)
}

pub async fn get_recipe_author(id: Uuid, pool: &Pool<Postgres>) -> Result<Option<String>, Error> {
    let row: Option<(String,)> = sqlx::query_as(
        "
        SELECT u.username
        FROM recipes r
        INNER JOIN users u ON u.id = r.author_id
        WHERE r.id = $1
    ",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(QueryError::from)?;

    Ok(row.map(|r| r.0))
}

pub async fn find_recipe(name: &str, pool: &Pool<Postgres>) -> Result<Option<Uuid>, Error> {
    let row: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM recipes WHERE LOWER(name) = LOWER($1)")
            .bind(name)
            .fetch_optional(pool)
            .await
            .map_err(QueryError::from)?;

    Ok(row.map(|r| r.0))
}

/// An exact duplicate (recipe, product, amount) triple is ignored.
pub async fn add_ingredient_to_recipe(
    recipe_id: Uuid,
    product_id: Uuid,
    amount: f64,
    pool: &Pool<Postgres>,
) -> Result<(), Error> {
    let product = get_product(product_id, pool).await?;
    if product.is_none() {
        return Err(Error::NotFound("product"));
    }

    sqlx::query(
        "
        INSERT INTO recipe_ingredients (recipe_id, product_id, amount)
        VALUES ($1, $2, $3)
        ON CONFLICT DO NOTHING
    ",
    )
    .bind(recipe_id)
    .bind(product_id)
    .bind(amount)
    .execute(pool)
    .await
    .map_err(QueryError::from)?;

    Ok(())
}

pub async fn list_recipe_ingredients(
    pool: &Pool<Postgres>,
    recipe_id: Uuid,
) -> Result<Vec<RecipeIngredient>, Error> {
    let rows: Vec<RecipeIngredient> = sqlx::query_as(
        "
        SELECT ri.recipe_id AS recipe_id, p.id AS product_id, p.title AS title, p.unit AS unit, ri.amount AS amount
        FROM recipe_ingredients ri
        INNER JOIN products p ON p.id = ri.product_id
        WHERE ri.recipe_id = $1
        ORDER BY ri.id
    ",
    )
    .bind(recipe_id)
    .fetch_all(pool)
    .await
    .map_err(QueryError::from)?;

    Ok(rows)
}

/// Paginated listing, newest first. An empty slug list means no tag
/// filtering; unknown slugs match nothing.
pub async fn fetch_recipes(
    tag_slugs: &[String],
    author: Option<Uuid>,
    offset: i64,
    pool: &Pool<Postgres>,
) -> Result<PageContext<RecipeRow>, Error> {
    let slugs: Vec<String> = tag_slugs.to_vec();

    let rows: Vec<RecipeRow> = match (slugs.is_empty(), author) {
        (true, None) => {
            sqlx::query_as(
                "
                SELECT r.*, COUNT(*) OVER() AS count
                FROM recipes r
                ORDER BY r.pub_date DESC, r.id DESC
                LIMIT $1 OFFSET $2
            ",
            )
            .bind(RECIPE_COUNT_PER_PAGE)
            .bind(offset)
            .fetch_all(pool)
            .await
            .map_err(QueryError::from)?
        }
        (true, Some(author)) => {
            sqlx::query_as(
                "
                SELECT r.*, COUNT(*) OVER() AS count
                FROM recipes r
                WHERE r.author_id = $1
                ORDER BY r.pub_date DESC, r.id DESC
                LIMIT $2 OFFSET $3
            ",
            )
            .bind(author)
            .bind(RECIPE_COUNT_PER_PAGE)
            .bind(offset)
            .fetch_all(pool)
            .await
            .map_err(QueryError::from)?
        }
        (false, None) => {
            sqlx::query_as(
                "
                SELECT r.*, COUNT(*) OVER() AS count
                FROM recipes r
                WHERE EXISTS (
                    SELECT 1 FROM recipe_tags_map m
                    INNER JOIN tags t ON t.id = m.tag_id
                    WHERE m.recipe_id = r.id AND t.slug = ANY($1)
                )
                ORDER BY r.pub_date DESC, r.id DESC
                LIMIT $2 OFFSET $3
            ",
            )
            .bind(slugs)
            .bind(RECIPE_COUNT_PER_PAGE)
            .bind(offset)
            .fetch_all(pool)
            .await
            .map_err(QueryError::from)?
        }
        (false, Some(author)) => {
            sqlx::query_as(
                "
                SELECT r.*, COUNT(*) OVER() AS count
                FROM recipes r
                WHERE r.author_id = $1 AND EXISTS (
                    SELECT 1 FROM recipe_tags_map m
                    INNER JOIN tags t ON t.id = m.tag_id
                    WHERE m.recipe_id = r.id AND t.slug = ANY($2)
                )
                ORDER BY r.pub_date DESC, r.id DESC
                LIMIT $3 OFFSET $4
            ",
            )
            .bind(author)
            .bind(slugs)
            .bind(RECIPE_COUNT_PER_PAGE)
            .bind(offset)
            .fetch_all(pool)
            .await
            .map_err(QueryError::from)?
        }
    };

    let total_count = rows.first().map(|p| p.count).unwrap_or(0);
    let page = PageContext::from_rows(rows, total_count, RECIPE_COUNT_PER_PAGE, offset);
    Ok(page)
}

/// Updates the editable recipe fields. `pub_date` is set at creation
/// and never changes.
pub async fn update_recipe(
    id: Uuid,
    name: &str,
    description: &str,
    image: &str,
    cook_time: i32,
    pool: &Pool<Postgres>,
) -> Result<(), Error> {
    let result = sqlx::query(
        "UPDATE recipes SET name = $1, description = $2, image = $3, cook_time = $4 WHERE id = $5",
    )
    .bind(name)
    .bind(description)
    .bind(image)
    .bind(cook_time)
    .bind(id)
    .execute(pool)
    .await
    .map_err(QueryError::from)?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound("recipe"));
    }

    Ok(())
}

/// Replaces the recipe's whole ingredient set with the submitted
/// (product, amount) pairs, the way the edit form resubmits it.
pub async fn set_recipe_ingredients(
    recipe_id: Uuid,
    ingredients: &[(Uuid, f64)],
    pool: &Pool<Postgres>,
) -> Result<(), Error> {
    let recipe = get_recipe(recipe_id, pool).await?;
    if recipe.is_none() {
        return Err(Error::NotFound("recipe"));
    }

    for &(product_id, _) in ingredients {
        if get_product(product_id, pool).await?.is_none() {
            return Err(Error::NotFound("product"));
        }
    }

    let mut tr = pool
        .begin()
        .await
        .map_err(|_| QueryError::new("Could not start transaction".to_owned()))?;

    sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
        .bind(recipe_id)
        .execute(&mut *tr)
        .await
        .map_err(QueryError::from)?;

    for &(product_id, amount) in ingredients {
        sqlx::query(
            "
            INSERT INTO recipe_ingredients (recipe_id, product_id, amount)
            VALUES ($1, $2, $3)
            ON CONFLICT DO NOTHING
        ",
        )
        .bind(recipe_id)
        .bind(product_id)
        .bind(amount)
        .execute(&mut *tr)
        .await
        .map_err(QueryError::from)?;
    }

    tr.commit()
        .await
        .map_err(|_| QueryError::new("Could not commit transaction".to_owned()))?;
    Ok(())
}

/// Deletes a recipe and everything hanging off it: ingredient rows, tag
/// links and all collection memberships, in one transaction.
pub async fn delete_recipe(id: Uuid, pool: &Pool<Postgres>) -> Result<(), Error> {
    let mut tr = pool
        .begin()
        .await
        .map_err(|_| QueryError::new("Could not start transaction".to_owned()))?;

    sqlx::query("DELETE FROM collection_recipes WHERE recipe_id = $1")
        .bind(id)
        .execute(&mut *tr)
        .await
        .map_err(QueryError::from)?;

    sqlx::query("DELETE FROM recipe_tags_map WHERE recipe_id = $1")
        .bind(id)
        .execute(&mut *tr)
        .await
        .map_err(QueryError::from)?;

    sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
        .bind(id)
        .execute(&mut *tr)
        .await
        .map_err(QueryError::from)?;

    sqlx::query("DELETE FROM recipes WHERE id = $1")
        .bind(id)
        .execute(&mut *tr)
        .await
        .map_err(QueryError::from)?;

    tr.commit()
        .await
        .map_err(|_| QueryError::new("Could not commit transaction".to_owned()))?;
    Ok(())
}
