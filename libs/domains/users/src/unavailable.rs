use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;

use crate::error::{UserError, UserResult};
use crate::models::{User, UserFields, UserFilter};
use crate::repository::UserRepository;

/// Repository used when the store could not be configured at startup.
///
/// Every call fails with [`UserError::Database`] carrying the startup
/// reason, so list requests answer 500 and mutations answer 400.
#[derive(Debug, Clone)]
pub struct UnavailableUserRepository {
    reason: String,
}

impl UnavailableUserRepository {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn fail<T>(&self) -> UserResult<T> {
        Err(UserError::Database(self.reason.clone()))
    }
}

#[async_trait]
impl UserRepository for UnavailableUserRepository {
    async fn create(&self, _fields: UserFields) -> UserResult<User> {
        self.fail()
    }

    async fn find_by_id(&self, _id: ObjectId) -> UserResult<Option<User>> {
        self.fail()
    }

    async fn list(&self, _filter: UserFilter) -> UserResult<Vec<User>> {
        self.fail()
    }

    async fn count(&self, _search: Option<String>) -> UserResult<u64> {
        self.fail()
    }

    async fn replace(&self, _id: ObjectId, _fields: UserFields) -> UserResult<Option<User>> {
        self.fail()
    }

    async fn delete(&self, _id: ObjectId) -> UserResult<bool> {
        self.fail()
    }
}
