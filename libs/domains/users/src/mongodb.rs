//! MongoDB implementation of UserRepository

use async_trait::async_trait;
use database::mongodb::is_duplicate_key;
use futures::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{self, Document, doc, oid::ObjectId},
    options::{IndexOptions, ReturnDocument},
};
use tracing::instrument;

use crate::error::{UserError, UserResult};
use crate::models::{User, UserFields, UserFilter};
use crate::repository::UserRepository;

/// Collection holding user documents.
pub const USERS_COLLECTION: &str = "users";

/// MongoDB implementation of the UserRepository
#[derive(Clone)]
pub struct MongoUserRepository {
    collection: Collection<User>,
}

impl MongoUserRepository {
    /// Create a repository over the `users` collection of `db`.
    ///
    /// # Example
    /// ```ignore
    /// let client = Client::with_uri_str("mongodb://localhost:27017").await?;
    /// let repo = MongoUserRepository::new(&client.database("it4409"));
    /// repo.init_indexes().await?;
    /// ```
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection::<User>(USERS_COLLECTION),
        }
    }

    /// Create the unique index on `email`.
    ///
    /// The index keeps the driver's default name (`email_1`), so an index
    /// created earlier by another client over the same collection is reused.
    #[instrument(skip(self), fields(collection = %self.collection.name()))]
    pub async fn init_indexes(&self) -> UserResult<()> {
        let index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        self.collection.create_index(index).await?;

        tracing::info!("Unique email index ready");
        Ok(())
    }

    /// Case-insensitive literal substring match over name, email and address.
    fn search_filter(search: Option<&str>) -> Document {
        let Some(search) = search.filter(|s| !s.is_empty()) else {
            return doc! {};
        };
        let pattern = regex::escape(search);

        doc! {
            "$or": [
                { "name": { "$regex": &pattern, "$options": "i" } },
                { "email": { "$regex": &pattern, "$options": "i" } },
                { "address": { "$regex": &pattern, "$options": "i" } }
            ]
        }
    }

    /// Full-replace update: `age` and `address` are removed when absent.
    fn replace_update(fields: &UserFields) -> Document {
        let mut set = doc! {
            "name": &fields.name,
            "email": &fields.email,
            "updatedAt": bson::DateTime::now(),
        };
        let mut unset = Document::new();

        if let Some(age) = fields.age {
            set.insert("age", age);
        } else {
            unset.insert("age", "");
        }

        if let Some(ref address) = fields.address {
            set.insert("address", address);
        } else {
            unset.insert("address", "");
        }

        let mut update = doc! { "$set": set };
        if !unset.is_empty() {
            update.insert("$unset", unset);
        }
        update
    }

    fn write_error(err: mongodb::error::Error, email: &str) -> UserError {
        if is_duplicate_key(&err) {
            UserError::DuplicateEmail(email.to_string())
        } else {
            err.into()
        }
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    #[instrument(skip(self, fields), fields(email = %fields.email))]
    async fn create(&self, fields: UserFields) -> UserResult<User> {
        let user = User::new(fields);

        self.collection
            .insert_one(&user)
            .await
            .map_err(|e| Self::write_error(e, &user.email))?;

        tracing::info!(user_id = %user.id, "User created");
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: ObjectId) -> UserResult<Option<User>> {
        let user = self.collection.find_one(doc! { "_id": id }).await?;
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn list(&self, filter: UserFilter) -> UserResult<Vec<User>> {
        let cursor = self
            .collection
            .find(Self::search_filter(filter.search.as_deref()))
            .skip(filter.skip)
            .limit(filter.limit)
            .await?;

        let users: Vec<User> = cursor.try_collect().await?;
        Ok(users)
    }

    #[instrument(skip(self))]
    async fn count(&self, search: Option<String>) -> UserResult<u64> {
        let count = self
            .collection
            .count_documents(Self::search_filter(search.as_deref()))
            .await?;
        Ok(count)
    }

    #[instrument(skip(self, fields), fields(email = %fields.email))]
    async fn replace(&self, id: ObjectId, fields: UserFields) -> UserResult<Option<User>> {
        let updated = self
            .collection
            .find_one_and_update(doc! { "_id": id }, Self::replace_update(&fields))
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| Self::write_error(e, &fields.email))?;

        if updated.is_some() {
            tracing::info!(user_id = %id, "User updated");
        }
        Ok(updated)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: ObjectId) -> UserResult<bool> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;

        if result.deleted_count > 0 {
            tracing::info!(user_id = %id, "User deleted");
        }
        Ok(result.deleted_count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(age: Option<f64>, address: Option<&str>) -> UserFields {
        UserFields {
            name: "A".to_string(),
            age,
            email: "a@x.com".to_string(),
            address: address.map(String::from),
        }
    }

    #[test]
    fn test_search_filter_empty() {
        assert!(MongoUserRepository::search_filter(None).is_empty());
        assert!(MongoUserRepository::search_filter(Some("")).is_empty());
    }

    #[test]
    fn test_search_filter_covers_three_fields() {
        let filter = MongoUserRepository::search_filter(Some("hanoi"));
        let clauses = filter.get_array("$or").unwrap();
        assert_eq!(clauses.len(), 3);

        let first = clauses[0].as_document().unwrap();
        let name = first.get_document("name").unwrap();
        assert_eq!(name.get_str("$regex").unwrap(), "hanoi");
        assert_eq!(name.get_str("$options").unwrap(), "i");
    }

    #[test]
    fn test_search_filter_escapes_metacharacters() {
        let filter = MongoUserRepository::search_filter(Some("a.b+(c)"));
        let clauses = filter.get_array("$or").unwrap();
        let email = clauses[1]
            .as_document()
            .and_then(|d| d.get_document("email").ok())
            .unwrap();
        assert_eq!(email.get_str("$regex").unwrap(), r"a\.b\+\(c\)");
    }

    #[test]
    fn test_replace_update_unsets_absent_optionals() {
        let update = MongoUserRepository::replace_update(&fields(None, None));
        let set = update.get_document("$set").unwrap();
        let unset = update.get_document("$unset").unwrap();

        assert_eq!(set.get_str("name").unwrap(), "A");
        assert_eq!(set.get_str("email").unwrap(), "a@x.com");
        assert!(set.get_datetime("updatedAt").is_ok());
        assert!(unset.contains_key("age"));
        assert!(unset.contains_key("address"));
    }

    #[test]
    fn test_replace_update_sets_present_optionals() {
        let update = MongoUserRepository::replace_update(&fields(Some(30.0), Some("HCMC")));
        let set = update.get_document("$set").unwrap();

        assert_eq!(set.get_f64("age").unwrap(), 30.0);
        assert_eq!(set.get_str("address").unwrap(), "HCMC");
        assert!(!update.contains_key("$unset"));
    }
}
