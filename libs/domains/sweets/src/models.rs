use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Sweet entity as stored in the `sweets` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Sweet {
    /// Unique identifier (stored as _id in MongoDB)
    #[serde(
        rename = "_id",
        alias = "id",
        with = "database::mongodb::uuid_string"
    )]
    pub id: Uuid,
    /// Unique across all sweets
    pub name: String,
    pub category: String,
    /// Never negative
    pub price: f64,
    /// Units in stock, never negative
    pub quantity: i64,
    /// Durable image URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Users administering this sweet. Weak references.
    #[serde(default, with = "database::mongodb::uuid_string::vec")]
    pub admins: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Sweet {
    pub fn new(
        name: String,
        category: String,
        price: f64,
        quantity: i64,
        image: Option<String>,
        admins: Vec<Uuid>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            category,
            price,
            quantity,
            image,
            admins,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a resolved change set in place
    pub fn apply(&mut self, changes: SweetChanges) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(category) = changes.category {
            self.category = category;
        }
        if let Some(price) = changes.price {
            self.price = price;
        }
        if let Some(quantity) = changes.quantity {
            self.quantity = quantity;
        }
        if let Some(image) = changes.image {
            self.image = Some(image);
        }
        if let Some(admins) = changes.admins {
            self.admins = admins;
        }
        self.updated_at = Utc::now();
    }
}

/// A single value or a list of values
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values,
        }
    }
}

/// DTO for adding a sweet.
///
/// Required fields are optional here so that a missing field is reported as
/// "All fields are required" instead of a decoding error.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct NewSweet {
    #[validate(length(max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 100))]
    pub category: Option<String>,
    #[validate(range(min = 0.0, message = "price must not be negative"))]
    pub price: Option<f64>,
    #[validate(range(min = 0, message = "quantity must not be negative"))]
    pub quantity: Option<i64>,
    /// Already durable image URL (JSON bodies only)
    pub image: Option<String>,
    /// One admin id or a list of them
    #[schema(value_type = Option<Vec<String>>)]
    pub admins: Option<OneOrMany<Uuid>>,
}

/// DTO for updating a sweet. Only provided fields change.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct SweetUpdate {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub category: Option<String>,
    #[validate(range(min = 0.0, message = "price must not be negative"))]
    pub price: Option<f64>,
    #[validate(range(min = 0, message = "quantity must not be negative"))]
    pub quantity: Option<i64>,
    pub image: Option<String>,
    #[schema(value_type = Option<Vec<String>>)]
    pub admins: Option<OneOrMany<Uuid>>,
}

/// Fully resolved update handed to the repository: image is a durable URL
/// and admins are normalized.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SweetChanges {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price: Option<f64>,
    pub quantity: Option<i64>,
    pub image: Option<String>,
    pub admins: Option<Vec<Uuid>>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct RestockRequest {
    pub amount: Option<i64>,
}

/// Price ordering for search results
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SortOrder {
    PriceAsc,
    PriceDesc,
}

/// Query string of `GET /sweets/search`
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Case-insensitive substring of the name
    #[serde(default, deserialize_with = "blank_as_none")]
    pub name: Option<String>,
    /// Case-insensitive substring of the category
    #[serde(default, deserialize_with = "blank_as_none")]
    pub category: Option<String>,
    /// Inclusive lower price bound
    #[serde(default, deserialize_with = "number_or_blank")]
    pub min_price: Option<f64>,
    /// Inclusive upper price bound
    #[serde(default, deserialize_with = "number_or_blank")]
    pub max_price: Option<f64>,
    /// `price_asc` or `price_desc`
    #[serde(default, deserialize_with = "sort_or_blank")]
    pub sort: Option<SortOrder>,
    /// Only sweets administered by this user id
    #[serde(default, deserialize_with = "blank_as_none")]
    pub admin: Option<String>,
}

/// Parsed search criteria
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SweetFilter {
    pub name: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub sort: Option<SortOrder>,
    pub admin: Option<Uuid>,
}

impl SweetFilter {
    /// In-memory equivalent of the MongoDB filter document
    pub fn matches(&self, sweet: &Sweet) -> bool {
        fn contains_ci(haystack: &str, needle: &str) -> bool {
            haystack.to_lowercase().contains(&needle.to_lowercase())
        }

        self.name.as_deref().is_none_or(|n| contains_ci(&sweet.name, n))
            && self
                .category
                .as_deref()
                .is_none_or(|c| contains_ci(&sweet.category, c))
            && self.min_price.is_none_or(|min| sweet.price >= min)
            && self.max_price.is_none_or(|max| sweet.price <= max)
            && self.admin.is_none_or(|admin| sweet.admins.contains(&admin))
    }
}

fn blank_as_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|v| !v.trim().is_empty()))
}

fn number_or_blank<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    use serde::de::Error;

    match blank_as_none(deserializer)? {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("'{}' is not a number", raw))),
    }
}

fn sort_or_blank<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<SortOrder>, D::Error> {
    use serde::de::Error;
    use std::str::FromStr;

    match blank_as_none(deserializer)? {
        None => Ok(None),
        Some(raw) => SortOrder::from_str(raw.trim()).map(Some).map_err(|_| {
            D::Error::custom(format!("'{}' is not one of price_asc, price_desc", raw))
        }),
    }
}
