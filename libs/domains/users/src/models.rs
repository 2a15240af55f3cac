use chrono::{DateTime, Utc};
use mongodb::bson::{self, oid::ObjectId};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationErrors};

/// Page used when `page` is missing or not a positive integer.
pub const DEFAULT_PAGE: u64 = 1;

/// Page size used when `limit` is missing or not a positive integer.
pub const DEFAULT_LIMIT: u64 = 5;

/// User document as stored in the `users` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<f64>,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub created_at: bson::DateTime,
    pub updated_at: bson::DateTime,
}

impl User {
    /// Build a new document from validated fields, stamping both timestamps.
    pub fn new(fields: UserFields) -> Self {
        let now = bson::DateTime::now();
        Self {
            id: ObjectId::new(),
            name: fields.name,
            age: fields.age,
            email: fields.email,
            address: fields.address,
            created_at: now,
            updated_at: now,
        }
    }
}

/// User as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    /// 24-character hex ObjectId
    #[serde(rename = "_id")]
    #[schema(example = "65f1c2a9e4b0a1b2c3d4e5f6")]
    pub id: String,
    #[schema(example = "Nguyen Van A")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<f64>,
    #[schema(example = "a@example.com")]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_hex(),
            name: user.name,
            age: user.age,
            email: user.email,
            address: user.address,
            created_at: to_chrono(user.created_at),
            updated_at: to_chrono(user.updated_at),
        }
    }
}

/// Dates outside chrono's range are rendered as the Unix epoch.
fn to_chrono(value: bson::DateTime) -> DateTime<Utc> {
    let millis = value.timestamp_millis();
    DateTime::<Utc>::from_timestamp_millis(millis).unwrap_or_else(|| {
        tracing::warn!(millis, "Stored date is out of range; using the Unix epoch");
        DateTime::<Utc>::default()
    })
}

/// Request body for create and update.
///
/// Every field is optional at the JSON level so that a missing `name` or
/// `email` is reported by validation rather than by deserialization.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UserPayload {
    #[schema(example = "Nguyen Van A")]
    pub name: Option<String>,
    #[schema(example = 21)]
    pub age: Option<f64>,
    #[schema(example = "A@Example.com")]
    pub email: Option<String>,
    #[schema(example = "Hanoi")]
    pub address: Option<String>,
}

impl UserPayload {
    /// Normalize then validate.
    ///
    /// Strings are trimmed and the email is lower-cased before the rules
    /// run, so `"  "` counts as a missing name.
    pub fn into_fields(self) -> Result<UserFields, ValidationErrors> {
        let fields = UserFields {
            name: self.name.as_deref().map(str::trim).unwrap_or_default().to_string(),
            age: self.age,
            email: self
                .email
                .as_deref()
                .map(|email| email.trim().to_lowercase())
                .unwrap_or_default(),
            address: self.address.map(|address| address.trim().to_string()),
        };

        fields.validate()?;
        Ok(fields)
    }
}

/// Normalized, validated user fields ready to be persisted.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct UserFields {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    pub age: Option<f64>,
    #[validate(length(min = 1, message = "email is required"))]
    pub email: String,
    pub address: Option<String>,
}

/// Query string of `GET /users`.
///
/// Values are kept as raw strings; unparseable ones fall back to the
/// defaults instead of rejecting the request.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListUsersQuery {
    /// Page number, starting at 1 (default 1)
    pub page: Option<String>,
    /// Page size (default 5)
    pub limit: Option<String>,
    /// Case-insensitive substring matched against name, email and address
    pub search: Option<String>,
}

/// Resolved page and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
}

impl Pagination {
    /// Resolve pagination from the raw query, clamping `limit` to `max_limit`
    /// when one is configured.
    pub fn from_query(query: &ListUsersQuery, max_limit: Option<u64>) -> Self {
        let page = positive_int(query.page.as_deref()).unwrap_or(DEFAULT_PAGE);
        let limit = positive_int(query.limit.as_deref()).unwrap_or(DEFAULT_LIMIT);
        let limit = match max_limit {
            Some(max) if max > 0 => limit.min(max),
            _ => limit,
        };
        Self { page, limit }
    }

    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.limit)
    }
}

/// Leading decimal digits of `raw` as a positive integer.
///
/// `"2abc"` reads as 2 and `"1.5"` as 1. Zero, negatives, overflow and
/// inputs without leading digits yield `None`.
fn positive_int(raw: Option<&str>) -> Option<u64> {
    let raw = raw?.trim_start();
    let raw = raw.strip_prefix('+').unwrap_or(raw);
    let end = raw
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(raw.len());
    raw[..end].parse::<u64>().ok().filter(|n| *n > 0)
}

/// Repository-level list filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    /// Non-empty search text, `None` matches everything
    pub search: Option<String>,
    pub skip: u64,
    pub limit: i64,
}

impl UserFilter {
    pub fn new(search: Option<String>, pagination: Pagination) -> Self {
        Self {
            search,
            skip: pagination.skip(),
            limit: i64::try_from(pagination.limit).unwrap_or(i64::MAX),
        }
    }
}

/// Normalize the raw `search` parameter: empty means no filter.
pub fn search_text(raw: Option<&str>) -> Option<String> {
    raw.filter(|text| !text.is_empty()).map(str::to_string)
}

/// One page of users.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserPage {
    #[schema(example = 1)]
    pub page: u64,
    #[schema(example = 5)]
    pub limit: u64,
    /// Matching users, ignoring pagination
    #[schema(example = 12)]
    pub total: u64,
    #[schema(example = 3)]
    pub total_pages: u64,
    pub data: Vec<UserResponse>,
}

/// `{ message, data }` envelope returned by create and update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserEnvelope {
    #[schema(example = "User created successfully")]
    pub message: String,
    pub data: UserResponse,
}

/// `{ message }` body returned by delete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "User deleted successfully")]
    pub message: String,
}
