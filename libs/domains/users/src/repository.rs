use async_trait::async_trait;
use mongodb::bson::{self, oid::ObjectId};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{UserError, UserResult};
use crate::models::{User, UserFields, UserFilter};

/// Repository trait for User persistence
///
/// Implementations must reject a second user with the same (normalized)
/// email with [`UserError::DuplicateEmail`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user
    async fn create(&self, fields: UserFields) -> UserResult<User>;

    /// Get a user by id
    async fn find_by_id(&self, id: ObjectId) -> UserResult<Option<User>>;

    /// List users matching the filter, in natural order
    async fn list(&self, filter: UserFilter) -> UserResult<Vec<User>>;

    /// Count users matching the search text, ignoring pagination
    async fn count(&self, search: Option<String>) -> UserResult<u64>;

    /// Replace every mutable field of a user and return the updated record.
    /// `None` when no user has this id.
    async fn replace(&self, id: ObjectId, fields: UserFields) -> UserResult<Option<User>>;

    /// Delete a user; `false` when no user has this id
    async fn delete(&self, id: ObjectId) -> UserResult<bool>;
}

/// In-memory implementation, kept in insertion order.
///
/// Emulates the unique email index and the case-insensitive search of the
/// MongoDB repository.
#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<Vec<User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }

    fn matches(user: &User, search: Option<&str>) -> bool {
        let Some(search) = search else {
            return true;
        };
        let needle = search.to_lowercase();
        [Some(&user.name), Some(&user.email), user.address.as_ref()]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, fields: UserFields) -> UserResult<User> {
        let mut users = self.users.write().await;

        if users.iter().any(|u| u.email == fields.email) {
            return Err(UserError::DuplicateEmail(fields.email));
        }

        let user = User::new(fields);
        users.push(user.clone());

        tracing::info!(user_id = %user.id, email = %user.email, "Created user");
        Ok(user)
    }

    async fn find_by_id(&self, id: ObjectId) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn list(&self, filter: UserFilter) -> UserResult<Vec<User>> {
        let users = self.users.read().await;
        let skip = usize::try_from(filter.skip).unwrap_or(usize::MAX);
        let limit = usize::try_from(filter.limit).unwrap_or(usize::MAX);

        Ok(users
            .iter()
            .filter(|u| Self::matches(u, filter.search.as_deref()))
            .skip(skip)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn count(&self, search: Option<String>) -> UserResult<u64> {
        let users = self.users.read().await;
        let count = users
            .iter()
            .filter(|u| Self::matches(u, search.as_deref()))
            .count();
        Ok(count as u64)
    }

    async fn replace(&self, id: ObjectId, fields: UserFields) -> UserResult<Option<User>> {
        let mut users = self.users.write().await;

        let Some(index) = users.iter().position(|u| u.id == id) else {
            return Ok(None);
        };
        if users.iter().any(|u| u.id != id && u.email == fields.email) {
            return Err(UserError::DuplicateEmail(fields.email));
        }

        let user = &mut users[index];

        user.name = fields.name;
        user.age = fields.age;
        user.email = fields.email;
        user.address = fields.address;
        user.updated_at = bson::DateTime::now();

        Ok(Some(user.clone()))
    }

    async fn delete(&self, id: ObjectId) -> UserResult<bool> {
        let mut users = self.users.write().await;
        let before = users.len();
        users.retain(|u| u.id != id);
        Ok(users.len() < before)
    }
}
