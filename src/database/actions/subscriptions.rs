use sqlx::{Pool, Postgres};

use crate::error::{Error, QueryError};
use crate::schema::{AddOutcome, RemoveOutcome, User, Uuid};
use crate::session::Session;

use super::get_user_by_id;

/// Follows an author. Following someone twice reports `AlreadyPresent`.
pub async fn subscribe(
    session: &Session,
    author_id: Uuid,
    pool: &Pool<Postgres>,
) -> Result<AddOutcome, Error> {
    let user = session.require_user()?;

    let author = get_user_by_id(pool, author_id).await?;
    if author.is_none() {
        return Err(Error::NotFound("user"));
    }

    let result = sqlx::query(
        "INSERT INTO subscriptions (user_id, author_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
    )
    .bind(user.user_id)
    .bind(author_id)
    .execute(pool)
    .await
    .map_err(QueryError::from)?;

    if result.rows_affected() == 0 {
        return Ok(AddOutcome::AlreadyPresent);
    }

    Ok(AddOutcome::Added)
}

pub async fn unsubscribe(
    session: &Session,
    author_id: Uuid,
    pool: &Pool<Postgres>,
) -> Result<RemoveOutcome, Error> {
    let user = session.require_user()?;

    let author = get_user_by_id(pool, author_id).await?;
    if author.is_none() {
        return Err(Error::NotFound("user"));
    }

    let result = sqlx::query("DELETE FROM subscriptions WHERE user_id = $1 AND author_id = $2")
        .bind(user.user_id)
        .bind(author_id)
        .execute(pool)
        .await
        .map_err(QueryError::from)?;

    if result.rows_affected() == 0 {
        return Ok(RemoveOutcome::NotAMember);
    }

    Ok(RemoveOutcome::Removed)
}

pub async fn is_subscribed(
    user_id: Uuid,
    author_id: Uuid,
    pool: &Pool<Postgres>,
) -> Result<bool, Error> {
    let result: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM subscriptions WHERE user_id = $1 AND author_id = $2")
            .bind(user_id)
            .bind(author_id)
            .fetch_optional(pool)
            .await
            .map_err(QueryError::from)?;

    Ok(result.is_some())
}

pub async fn list_subscriptions(user_id: Uuid, pool: &Pool<Postgres>) -> Result<Vec<User>, Error> {
    let rows: Vec<User> = sqlx::query_as(
        "
        SELECT u.id AS id, u.username AS username, u.role AS role
        FROM subscriptions s
        INNER JOIN users u ON u.id = s.author_id
        WHERE s.user_id = $1
        ORDER BY s.id
    ",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .map_err(QueryError::from)?;

    Ok(rows)
}
