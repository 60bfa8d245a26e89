use sqlx::{Pool, Postgres};

use crate::constants::PRODUCT_COUNT_PER_PAGE;
use crate::error::{Error, QueryError};
use crate::schema::{Product, Uuid};

pub async fn create_product(
    title: &str,
    unit: &str,
    pool: &Pool<Postgres>,
) -> Result<Uuid, Error> {
    let id: (Uuid,) =
        sqlx::query_as("INSERT INTO products (title, unit) VALUES ($1, $2) RETURNING id")
            .bind(title)
            .bind(unit)
            .fetch_one(pool)
            .await
            .map_err(QueryError::from)?;

    Ok(id.0)
}

pub async fn get_product(id: Uuid, pool: &Pool<Postgres>) -> Result<Option<Product>, Error> {
    let product: Option<Product> = sqlx::query_as("SELECT * FROM products WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(QueryError::from)?;

    Ok(product)
}

/// No uniqueness is enforced on (title, unit); the first match wins.
pub async fn find_product(
    title: &str,
    unit: &str,
    pool: &Pool<Postgres>,
) -> Result<Option<Uuid>, Error> {
    let row: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM products WHERE title = $1 AND unit = $2 ORDER BY id LIMIT 1")
            .bind(title)
            .bind(unit)
            .fetch_optional(pool)
            .await
            .map_err(QueryError::from)?;

    Ok(row.map(|r| r.0))
}

/// Prefix search backing the ingredient autocomplete field.
pub async fn search_products(
    query: &str,
    pool: &Pool<Postgres>,
) -> Result<Vec<Product>, Error> {
    let rows: Vec<Product> =
        sqlx::query_as("SELECT * FROM products WHERE title ILIKE $1 || '%' ORDER BY title LIMIT $2")
            .bind(query)
            .bind(PRODUCT_COUNT_PER_PAGE)
            .fetch_all(pool)
            .await
            .map_err(QueryError::from)?;

    Ok(rows)
}

pub async fn list_products(pool: &Pool<Postgres>) -> Result<Vec<Product>, Error> {
    let rows: Vec<Product> = sqlx::query_as("SELECT * FROM products")
        .fetch_all(pool)
        .await
        .map_err(QueryError::from)?;

    Ok(rows)
}
