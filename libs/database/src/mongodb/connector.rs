use mongodb::{Client, Database, bson::doc, options::ClientOptions};
use std::time::Duration;
use tracing::info;

use super::MongoConfig;
use super::config::FALLBACK_DATABASE;

/// Error type for MongoDB operations
#[derive(Debug, thiserror::Error)]
pub enum MongoError {
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
}

/// Build client options from a config, applying pool and timeout settings.
async fn client_options(config: &MongoConfig) -> Result<ClientOptions, MongoError> {
    let mut options = ClientOptions::parse(&config.url).await?;

    options.max_pool_size = Some(config.max_pool_size);
    options.min_pool_size = Some(config.min_pool_size);
    options.connect_timeout = Some(Duration::from_secs(config.connect_timeout_secs));
    options.server_selection_timeout =
        Some(Duration::from_secs(config.server_selection_timeout_secs));

    if let Some(ref app_name) = config.app_name {
        options.app_name = Some(app_name.clone());
    }

    Ok(options)
}

/// Send a `ping` to the deployment.
pub async fn ping(client: &Client) -> Result<(), MongoError> {
    client
        .database("admin")
        .run_command(doc! { "ping": 1 })
        .await
        .map_err(|e| MongoError::ConnectionFailed(e.to_string()))?;
    Ok(())
}

/// Connect using a MongoConfig and fail unless the server answers a ping.
///
/// # Example
/// ```ignore
/// use database::mongodb::{MongoConfig, connect_from_config};
///
/// let config = MongoConfig::with_database("mongodb://localhost:27017", "mydb");
/// let client = connect_from_config(&config).await?;
/// ```
pub async fn connect_from_config(config: &MongoConfig) -> Result<Client, MongoError> {
    info!("Attempting to connect to MongoDB at {}", config.redacted_url());

    let client = Client::with_options(client_options(config).await?)?;
    ping(&client).await?;

    info!("Successfully connected to MongoDB");
    Ok(client)
}

/// Resolve the database to use for a config: the explicit name, then the
/// database named in the connection string, then [`FALLBACK_DATABASE`].
pub fn database_for(client: &Client, config: &MongoConfig) -> Database {
    match config.database.as_deref() {
        Some(name) => client.database(name),
        None => client
            .default_database()
            .unwrap_or_else(|| client.database(FALLBACK_DATABASE)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_client_options_apply_config() {
        let config = MongoConfig {
            max_pool_size: 12,
            min_pool_size: 2,
            connect_timeout_secs: 3,
            ..MongoConfig::new("mongodb://localhost:27017")
        }
        .with_app_name("users-api");

        let options = client_options(&config).await.unwrap();
        assert_eq!(options.max_pool_size, Some(12));
        assert_eq!(options.min_pool_size, Some(2));
        assert_eq!(options.connect_timeout, Some(Duration::from_secs(3)));
        assert_eq!(options.app_name.as_deref(), Some("users-api"));
    }

    #[tokio::test]
    async fn test_client_options_rejects_bad_scheme() {
        let config = MongoConfig::new("postgres://localhost:5432");
        assert!(client_options(&config).await.is_err());
    }

    #[tokio::test]
    async fn test_database_for_prefers_explicit_name() {
        let config = MongoConfig::with_database("mongodb://localhost:27017/from_uri", "explicit");
        let client = client_without_ping(&config).await;
        assert_eq!(database_for(&client, &config).name(), "explicit");
    }

    #[tokio::test]
    async fn test_database_for_uses_uri_then_fallback() {
        let config = MongoConfig::new("mongodb://localhost:27017/it4409");
        let client = client_without_ping(&config).await;
        assert_eq!(database_for(&client, &config).name(), "it4409");

        let config = MongoConfig::new("mongodb://localhost:27017");
        let client = client_without_ping(&config).await;
        assert_eq!(database_for(&client, &config).name(), FALLBACK_DATABASE);
    }

    async fn client_without_ping(config: &MongoConfig) -> Client {
        Client::with_options(client_options(config).await.unwrap()).unwrap()
    }

    #[tokio::test]
    #[ignore] // Requires actual MongoDB
    async fn test_connect_from_config() {
        let config = MongoConfig::with_database("mongodb://localhost:27017", "test");
        assert!(connect_from_config(&config).await.is_ok());
    }
}
