//! Users Domain
//!
//! CRUD over a single MongoDB `users` collection, with pagination and
//! case-insensitive search.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Normalization, validation, pagination
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Trait + MongoDB / in-memory / unavailable
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Documents, DTOs
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_users::{handlers, MongoUserRepository, UserService};
//! use mongodb::Client;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::with_uri_str("mongodb://localhost:27017").await?;
//! let repository = MongoUserRepository::new(&client.database("it4409"));
//! repository.init_indexes().await?;
//!
//! let router = axum::Router::new().nest("/users", handlers::router(UserService::new(repository)));
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;
pub mod unavailable;

// Re-export commonly used types
pub use error::{UserError, UserResult};
pub use handlers::ApiDoc;
pub use models::{
    ListUsersQuery, MessageResponse, Pagination, User, UserEnvelope, UserFields, UserFilter,
    UserPage, UserPayload, UserResponse,
};
pub use self::mongodb::{MongoUserRepository, USERS_COLLECTION};
pub use repository::{InMemoryUserRepository, UserRepository};
pub use service::UserService;
pub use unavailable::UnavailableUserRepository;
