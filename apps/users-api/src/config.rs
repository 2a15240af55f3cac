use core_config::{AppInfo, ConfigError, FromEnv, app_info, env_parse_optional, server::ServerConfig};

// Import MongoDB config from the database library
use database::mongodb::MongoConfig;

use std::path::{Path, PathBuf};

// Re-export Environment for use in other modules
pub use core_config::Environment;

/// Load `.env` from the working directory, if there is one.
pub fn load_dotenv() -> Option<PathBuf> {
    load_env_file(Path::new(".env"))
}

/// Load variables from `path`. Variables already set are kept.
///
/// Returns the path when the file was read.
pub fn load_env_file(path: &Path) -> Option<PathBuf> {
    dotenvy::from_path(path).ok().map(|()| path.to_path_buf())
}

/// Settings of the users resource
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UsersConfig {
    /// `USERS_MAX_PAGE_LIMIT`: upper bound on `limit`, unbounded when unset
    pub max_page_limit: Option<u64>,
}

impl FromEnv for UsersConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            max_page_limit: env_parse_optional("USERS_MAX_PAGE_LIMIT")?,
        })
    }
}

/// Application-specific configuration
/// Composes shared config components from the `config` library
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    /// MongoDB settings, or the reason they could not be loaded.
    ///
    /// A missing `MONGO_URI` does not stop the process; it is reported once
    /// tracing is up and every store-backed request fails.
    pub mongodb: Result<MongoConfig, String>,
    pub server: ServerConfig,
    pub users: UsersConfig,
    pub environment: Environment,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let mongodb = MongoConfig::from_env().map_err(|e| e.to_string());
        let server = ServerConfig::from_env()?;
        let users = UsersConfig::from_env()?;

        Ok(Self {
            app: app_info!(),
            mongodb,
            server,
            users,
            environment,
        })
    }
}
