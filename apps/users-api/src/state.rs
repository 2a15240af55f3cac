//! Application state management.
//!
//! This module defines the shared application state passed to route builders.
//! The state contains:
//! - Configuration
//! - MongoDB client and database, when the store could be opened and indexed

use database::mongodb::{self as mongo, Client, Database, MongoConfig};
use database::{DatabaseError, DatabaseResult};
use domain_users::MongoUserRepository;
use tracing::{error, info};

use crate::config::Config;

/// Open MongoDB handles.
#[derive(Clone)]
pub struct MongoStore {
    /// MongoDB client (cloneable, shares underlying connection pool)
    pub client: Client,
    /// MongoDB database instance
    pub db: Database,
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded from environment variables
    pub config: Config,
    /// The store, or the reason it is unavailable
    pub mongo: Result<MongoStore, String>,
}

impl AppState {
    /// Build the state, opening the store if it is configured.
    ///
    /// The store is only kept once the server answered a ping and the users
    /// indexes exist. Any failure is logged and recorded, never returned.
    pub async fn new(config: Config) -> Self {
        let mongo = match open_store(&config.mongodb).await {
            Ok(store) => prepare_store(store).await,
            Err(e) => Err(e.to_string()),
        };

        match &mongo {
            Ok(store) => info!(database = %store.db.name(), "Using MongoDB database"),
            Err(reason) => error!(error = %reason, "MongoDB is unavailable; user requests will fail"),
        }

        Self { config, mongo }
    }
}

async fn open_store(config: &Result<MongoConfig, String>) -> DatabaseResult<MongoStore> {
    let config = config
        .as_ref()
        .map_err(|reason| DatabaseError::ConfigError(reason.clone()))?;

    let client = mongo::connect_from_config(config).await?;
    let db = mongo::database_for(&client, config);

    Ok(MongoStore { client, db })
}

/// Create the unique email index before any request is served.
async fn prepare_store(store: MongoStore) -> Result<MongoStore, String> {
    MongoUserRepository::new(&store.db)
        .init_indexes()
        .await
        .map_err(|e| format!("Failed to create users indexes: {e}"))?;

    Ok(store)
}
