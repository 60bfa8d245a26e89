use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::TypeError;

pub type Uuid = i32;

#[derive(
    Clone, Debug, PartialEq, PartialOrd, sqlx::Type, Serialize, Eq, Ord, Hash, Deserialize,
)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    User,
    Admin,
}

/// The two per-user singleton collections; the unique constraint on
/// `user_collections (user_id, kind)` is the authoritative guard.
#[derive(
    Clone, Copy, Debug, PartialEq, PartialOrd, sqlx::Type, Serialize, Eq, Ord, Hash, Deserialize,
)]
#[sqlx(type_name = "collection_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CollectionKind {
    Favorites,
    Purchases,
}

impl TryFrom<Value> for CollectionKind {
    type Error = TypeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value.as_str() {
            Some(value) => match value {
                "favorites" => Ok(Self::Favorites),
                "purchases" => Ok(Self::Purchases),
                _ => Err(TypeError::new("Invalid variant")),
            },
            None => Err(TypeError::new("Failed to parse value as string")),
        }
    }
}

#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub role: UserRole,
}

#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct Product {
    pub id: Uuid,
    pub title: String,
    pub unit: String,
}

#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct Recipe {
    pub id: Uuid,
    pub author_id: Uuid,
    pub name: String,
    pub description: String,
    pub image: String,
    pub cook_time: i32,
    pub pub_date: DateTime<Utc>,
}

/// Recipe row joined with its window total, used for paginated listings.
#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct RecipeRow {
    pub id: Uuid,
    pub author_id: Uuid,
    pub name: String,
    pub description: String,
    pub image: String,
    pub cook_time: i32,
    pub pub_date: DateTime<Utc>,

    pub count: i64,
}

impl From<RecipeRow> for Recipe {
    fn from(row: RecipeRow) -> Self {
        Recipe {
            id: row.id,
            author_id: row.author_id,
            name: row.name,
            description: row.description,
            image: row.image,
            cook_time: row.cook_time,
            pub_date: row.pub_date,
        }
    }
}

/// A recipe with its tag slugs, as consumed by the in-memory tag filter.
#[derive(Debug, Clone, Serialize)]
pub struct RecipeWithTags {
    pub recipe: Recipe,
    pub tag_slugs: Vec<String>,
}

/// The (recipe, product, amount) triple is unique; the same product may
/// appear twice only with a different amount.
#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct RecipeIngredient {
    pub recipe_id: Uuid,
    pub product_id: Uuid,
    pub title: String,
    pub unit: String,
    pub amount: f64,
}

/// Singleton collection row for one (user, kind) pair.
#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct Collection {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: CollectionKind,
}

#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct Subscription {
    pub id: Uuid,
    pub user_id: Uuid,
    pub author_id: Uuid,
}

/// Ingredient row pulled for the shopping list, joined with its product.
#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct PurchasedIngredient {
    pub title: String,
    pub unit: String,
    pub amount: f64,
}

/// Aggregated shopping list line, keyed by the (title, unit) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShoppingListItem {
    pub title: String,
    pub unit: String,
    pub total_amount: f64,
}

/// `AlreadyPresent` is ordinary data, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AddOutcome {
    Added,
    AlreadyPresent,
}

/// `NotAMember` covers a missing collection row and a missing member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoveOutcome {
    Removed,
    NotAMember,
}
