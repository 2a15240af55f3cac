//! User Service - Business logic layer

use mongodb::bson::oid::ObjectId;
use std::sync::Arc;
use tracing::instrument;

use crate::error::{UserError, UserResult};
use crate::models::{
    ListUsersQuery, Pagination, UserFilter, UserPage, UserPayload, UserResponse, search_text,
};
use crate::repository::UserRepository;

/// User service: normalization, validation and pagination on top of a
/// [`UserRepository`].
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
    max_page_limit: Option<u64>,
}

impl<R: UserRepository> UserService<R> {
    /// Create a new UserService with the given repository
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
            max_page_limit: None,
        }
    }

    /// Cap the page size. `None` leaves `limit` unbounded.
    pub fn with_max_page_limit(mut self, max_page_limit: Option<u64>) -> Self {
        self.max_page_limit = max_page_limit;
        self
    }

    /// List one page of users matching the optional search text
    #[instrument(skip(self))]
    pub async fn list_users(&self, query: ListUsersQuery) -> UserResult<UserPage> {
        let pagination = Pagination::from_query(&query, self.max_page_limit);
        let search = search_text(query.search.as_deref());
        let filter = UserFilter::new(search.clone(), pagination);

        let (users, total) =
            tokio::try_join!(self.repository.list(filter), self.repository.count(search))?;

        Ok(UserPage {
            page: pagination.page,
            limit: pagination.limit,
            total,
            total_pages: pagination.total_pages(total),
            data: users.into_iter().map(UserResponse::from).collect(),
        })
    }

    /// Get a user by id
    #[instrument(skip(self))]
    pub async fn get_user(&self, id: ObjectId) -> UserResult<UserResponse> {
        self.repository
            .find_by_id(id)
            .await?
            .map(UserResponse::from)
            .ok_or(UserError::NotFound(id))
    }

    /// Create a new user
    #[instrument(skip(self, payload))]
    pub async fn create_user(&self, payload: UserPayload) -> UserResult<UserResponse> {
        let fields = payload.into_fields()?;
        let user = self.repository.create(fields).await?;
        Ok(user.into())
    }

    /// Replace every mutable field of an existing user
    #[instrument(skip(self, payload))]
    pub async fn update_user(&self, id: ObjectId, payload: UserPayload) -> UserResult<UserResponse> {
        let fields = payload.into_fields()?;
        self.repository
            .replace(id, fields)
            .await?
            .map(UserResponse::from)
            .ok_or(UserError::NotFound(id))
    }

    /// Delete a user
    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: ObjectId) -> UserResult<()> {
        if self.repository.delete(id).await? {
            Ok(())
        } else {
            Err(UserError::NotFound(id))
        }
    }
}

impl<R: UserRepository> Clone for UserService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            max_page_limit: self.max_page_limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{User, UserFields};
    use crate::repository::MockUserRepository;
    use mockall::predicate::*;

    fn stored(fields: UserFields) -> User {
        User::new(fields)
    }

    fn query(page: &str, limit: &str, search: &str) -> ListUsersQuery {
        ListUsersQuery {
            page: Some(page.to_string()),
            limit: Some(limit.to_string()),
            search: Some(search.to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_user_normalizes_before_insert() {
        let mut repo = MockUserRepository::new();
        repo.expect_create()
            .withf(|f| f.email == "a@x.com" && f.name == "A" && f.address.as_deref() == Some("Hanoi"))
            .times(1)
            .returning(|f| Ok(stored(f)));

        let service = UserService::new(repo);
        let user = service
            .create_user(UserPayload {
                name: Some(" A ".into()),
                email: Some(" A@X.com".into()),
                address: Some("Hanoi ".into()),
                age: None,
            })
            .await
            .unwrap();

        assert_eq!(user.email, "a@x.com");
    }

    #[tokio::test]
    async fn test_create_user_validation_skips_repository() {
        let mut repo = MockUserRepository::new();
        repo.expect_create().never();

        let service = UserService::new(repo);
        let err = service
            .create_user(UserPayload {
                email: Some("a@x.com".into()),
                ..Default::default()
            })
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "User validation failed: name: name is required"
        );
    }

    #[tokio::test]
    async fn test_list_users_builds_filter_and_page() {
        let mut repo = MockUserRepository::new();
        repo.expect_list()
            .with(eq(UserFilter {
                search: Some("hanoi".into()),
                skip: 4,
                limit: 2,
            }))
            .times(1)
            .returning(|_| Ok(vec![]));
        repo.expect_count()
            .with(eq(Some("hanoi".to_string())))
            .times(1)
            .returning(|_| Ok(5));

        let service = UserService::new(repo);
        let page = service.list_users(query("3", "2", "hanoi")).await.unwrap();

        assert_eq!(page.page, 3);
        assert_eq!(page.limit, 2);
        assert_eq!(page.total, 5);
        assert_eq!(page.total_pages, 3);
        assert!(page.data.is_empty());
    }

    #[tokio::test]
    async fn test_list_users_empty_search_matches_all() {
        let mut repo = MockUserRepository::new();
        repo.expect_list()
            .withf(|f| f.search.is_none() && f.skip == 0 && f.limit == 5)
            .returning(|_| Ok(vec![]));
        repo.expect_count().with(eq(None)).returning(|_| Ok(0));

        let service = UserService::new(repo);
        let page = service.list_users(ListUsersQuery::default()).await.unwrap();

        assert_eq!(page.total_pages, 0);
    }

    #[tokio::test]
    async fn test_list_users_respects_max_page_limit() {
        let mut repo = MockUserRepository::new();
        repo.expect_list()
            .withf(|f| f.limit == 50)
            .returning(|_| Ok(vec![]));
        repo.expect_count().returning(|_| Ok(120));

        let service = UserService::new(repo).with_max_page_limit(Some(50));
        let page = service.list_users(query("1", "1000", "")).await.unwrap();

        assert_eq!(page.limit, 50);
        assert_eq!(page.total_pages, 3);
    }

    #[tokio::test]
    async fn test_list_users_propagates_store_error() {
        let mut repo = MockUserRepository::new();
        repo.expect_list()
            .returning(|_| Err(UserError::Database("timeout".into())));
        repo.expect_count().returning(|_| Ok(0));

        let service = UserService::new(repo);
        let err = service.list_users(ListUsersQuery::default()).await.unwrap_err();
        assert!(matches!(err, UserError::Database(_)));
    }

    #[tokio::test]
    async fn test_update_user_not_found() {
        let id = ObjectId::new();
        let mut repo = MockUserRepository::new();
        repo.expect_replace()
            .with(eq(id), always())
            .returning(|_, _| Ok(None));

        let service = UserService::new(repo);
        let err = service
            .update_user(
                id,
                UserPayload {
                    name: Some("B".into()),
                    email: Some("b@x.com".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, UserError::NotFound(missing) if missing == id));
    }

    #[tokio::test]
    async fn test_update_user_lowercases_email() {
        let mut repo = MockUserRepository::new();
        repo.expect_replace()
            .withf(|_, f| f.email == "b@x.com" && f.age.is_none())
            .returning(|_, f| Ok(Some(stored(f))));

        let service = UserService::new(repo);
        let user = service
            .update_user(
                ObjectId::new(),
                UserPayload {
                    name: Some("B".into()),
                    email: Some("B@X.COM".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(user.email, "b@x.com");
        assert_eq!(user.age, None);
    }

    #[tokio::test]
    async fn test_get_user_not_found() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));

        let service = UserService::new(repo);
        assert!(matches!(
            service.get_user(ObjectId::new()).await,
            Err(UserError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_user() {
        let mut repo = MockUserRepository::new();
        let mut seq = mockall::Sequence::new();
        repo.expect_delete()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(true));
        repo.expect_delete()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(false));

        let service = UserService::new(repo);
        let id = ObjectId::new();
        assert!(service.delete_user(id).await.is_ok());
        assert!(matches!(
            service.delete_user(id).await,
            Err(UserError::NotFound(_))
        ));
    }
}
