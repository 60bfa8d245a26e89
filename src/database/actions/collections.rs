use log::debug;
use sqlx::{Pool, Postgres};

use crate::error::{Error, QueryError};
use crate::permissions::ActionType;
use crate::schema::{AddOutcome, Collection, CollectionKind, Recipe, RemoveOutcome, Uuid};
use crate::session::Session;

use super::{get_recipe, get_user_by_id};

/// Fetches the user's singleton collection row for `kind`, creating an
/// empty one on first use. The unique constraint on (user_id, kind) is
/// the source of truth: a caller losing the creation race re-fetches
/// and adopts the winner's row.
pub async fn get_or_create_collection(
    user_id: Uuid,
    kind: CollectionKind,
    pool: &Pool<Postgres>,
) -> Result<Collection, Error> {
    let user = get_user_by_id(pool, user_id).await?;
    if user.is_none() {
        return Err(Error::NotFound("user"));
    }

    let existing: Option<Collection> =
        sqlx::query_as("SELECT * FROM user_collections WHERE user_id = $1 AND kind = $2")
            .bind(user_id)
            .bind(kind)
            .fetch_optional(pool)
            .await
            .map_err(QueryError::from)?;

    if let Some(collection) = existing {
        return Ok(collection);
    }

    sqlx::query(
        "INSERT INTO user_collections (user_id, kind) VALUES ($1, $2) ON CONFLICT (user_id, kind) DO NOTHING",
    )
    .bind(user_id)
    .bind(kind)
    .execute(pool)
    .await
    .map_err(QueryError::from)?;

    debug!("created {kind:?} collection for user {user_id}");

    let row: Option<Collection> =
        sqlx::query_as("SELECT * FROM user_collections WHERE user_id = $1 AND kind = $2")
            .bind(user_id)
            .bind(kind)
            .fetch_optional(pool)
            .await
            .map_err(QueryError::from)?;

    // Present whether our insert or a concurrent one won.
    row.ok_or_else(|| QueryError::new("Singleton collection vanished after insert".to_owned()).into())
}

/// Idempotent membership insert, as a single insert-if-absent
/// statement so concurrent toggles cannot lose updates.
pub async fn add_to_collection(
    session: &Session,
    recipe_id: Uuid,
    kind: CollectionKind,
    pool: &Pool<Postgres>,
) -> Result<AddOutcome, Error> {
    let user = session.authenticate(ActionType::ManageOwnCollections)?;

    let recipe = get_recipe(recipe_id, pool).await?;
    if recipe.is_none() {
        return Err(Error::NotFound("recipe"));
    }

    let collection = get_or_create_collection(user.user_id, kind, pool).await?;

    let result = sqlx::query(
        "INSERT INTO collection_recipes (collection_id, recipe_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
    )
    .bind(collection.id)
    .bind(recipe_id)
    .execute(pool)
    .await
    .map_err(QueryError::from)?;

    if result.rows_affected() == 0 {
        return Ok(AddOutcome::AlreadyPresent);
    }

    Ok(AddOutcome::Added)
}

/// Membership removal as a single delete-if-present statement.
/// `NotAMember` covers both a missing collection row and a recipe that
/// was never added.
pub async fn remove_from_collection(
    session: &Session,
    recipe_id: Uuid,
    kind: CollectionKind,
    pool: &Pool<Postgres>,
) -> Result<RemoveOutcome, Error> {
    let user = session.authenticate(ActionType::ManageOwnCollections)?;

    if get_user_by_id(pool, user.user_id).await?.is_none() {
        return Err(Error::NotFound("user"));
    }

    let recipe = get_recipe(recipe_id, pool).await?;
    if recipe.is_none() {
        return Err(Error::NotFound("recipe"));
    }

    let result = sqlx::query(
        "
        DELETE FROM collection_recipes
        WHERE recipe_id = $1 AND collection_id = (
            SELECT id FROM user_collections WHERE user_id = $2 AND kind = $3
        )
    ",
    )
    .bind(recipe_id)
    .bind(user.user_id)
    .bind(kind)
    .execute(pool)
    .await
    .map_err(QueryError::from)?;

    if result.rows_affected() == 0 {
        return Ok(RemoveOutcome::NotAMember);
    }

    Ok(RemoveOutcome::Removed)
}

/// Member recipes, newest first. Empty when no collection row exists.
pub async fn list_collection(
    session: &Session,
    kind: CollectionKind,
    pool: &Pool<Postgres>,
) -> Result<Vec<Recipe>, Error> {
    let user = session.require_user()?;

    let rows: Vec<Recipe> = sqlx::query_as(
        "
        SELECT r.*
        FROM user_collections c
        INNER JOIN collection_recipes cr ON cr.collection_id = c.id
        INNER JOIN recipes r ON r.id = cr.recipe_id
        WHERE c.user_id = $1 AND c.kind = $2
        ORDER BY r.pub_date DESC, r.id DESC
    ",
    )
    .bind(user.user_id)
    .bind(kind)
    .fetch_all(pool)
    .await
    .map_err(QueryError::from)?;

    Ok(rows)
}

pub async fn count_collection(
    session: &Session,
    kind: CollectionKind,
    pool: &Pool<Postgres>,
) -> Result<i64, Error> {
    let user = session.require_user()?;

    let row: (i64,) = sqlx::query_as(
        "
        SELECT COUNT(cr.recipe_id)
        FROM user_collections c
        INNER JOIN collection_recipes cr ON cr.collection_id = c.id
        WHERE c.user_id = $1 AND c.kind = $2
    ",
    )
    .bind(user.user_id)
    .bind(kind)
    .fetch_one(pool)
    .await
    .map_err(QueryError::from)?;

    Ok(row.0)
}

pub async fn is_in_collection(
    session: &Session,
    recipe_id: Uuid,
    kind: CollectionKind,
    pool: &Pool<Postgres>,
) -> Result<bool, Error> {
    let user = session.require_user()?;

    let result: Option<(Uuid,)> = sqlx::query_as(
        "
        SELECT cr.recipe_id
        FROM user_collections c
        INNER JOIN collection_recipes cr ON cr.collection_id = c.id
        WHERE c.user_id = $1 AND c.kind = $2 AND cr.recipe_id = $3
    ",
    )
    .bind(user.user_id)
    .bind(kind)
    .bind(recipe_id)
    .fetch_optional(pool)
    .await
    .map_err(QueryError::from)?;

    Ok(result.is_some())
}
