/// Unified database error type for connector-level operations
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// MongoDB driver errors
    #[cfg(feature = "mongodb")]
    #[error("MongoDB error: {0}")]
    Mongo(#[from] crate::mongodb::MongoError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

#[cfg(feature = "config")]
impl From<core_config::ConfigError> for DatabaseError {
    fn from(err: core_config::ConfigError) -> Self {
        DatabaseError::ConfigError(err.to_string())
    }
}

/// Result type alias for database operations
pub type DatabaseResult<T> = Result<T, DatabaseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "config")]
    #[test]
    fn test_from_config_error() {
        let err: DatabaseError = core_config::ConfigError::MissingEnvVar("MONGO_URI".into()).into();
        assert!(matches!(err, DatabaseError::ConfigError(ref msg) if msg.contains("MONGO_URI")));
    }

    #[cfg(feature = "mongodb")]
    #[test]
    fn test_mongo_error_display() {
        let err: DatabaseError =
            crate::mongodb::MongoError::ConnectionFailed("no servers".into()).into();
        assert_eq!(err.to_string(), "MongoDB error: Connection failed: no servers");
    }
}
