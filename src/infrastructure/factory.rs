//! Repository factory for runtime backend selection.
//!
//! The factory owns the storage lifecycle: it opens the connection pool
//! once, ensures the schema exists, and hands out a shared
//! `Arc<dyn TodoRepository>`. The pool is closed through
//! [`TodoRepository::close`] on shutdown.
//!
//! # Environment Variables
//!
//! - `STORAGE_MODE`: `sqlite` (default) | `postgres` | `in_memory`
//! - `DATABASE_URL`: connection URL (defaults to `sqlite://pixel_todos.db`
//!   for `SQLite`, required for `PostgreSQL`)
//! - `DATABASE_MAX_CONNECTIONS`: pool size (default: 5)
//!
//! # Example
//!
//! ```ignore
//! let config = RepositoryConfig::from_env()?;
//! let repositories = RepositoryFactory::new(config).create().await?;
//! let todo = repositories.todo_repository.find_by_id(TodoId::from_i64(1)).await?;
//! ```

use std::env;
use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;

use super::{
    InMemoryTodoRepository, PostgresTodoRepository, RepositoryError, SqliteTodoRepository,
    TodoRepository,
};

/// Database used when `DATABASE_URL` is not set and storage is `SQLite`.
pub const DEFAULT_SQLITE_URL: &str = "sqlite://pixel_todos.db";

/// Pool size used when `DATABASE_MAX_CONNECTIONS` is not set.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

// =============================================================================
// Configuration Types
// =============================================================================

/// Storage backend for todo records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageMode {
    /// `SQLite` file database.
    #[default]
    Sqlite,
    /// `PostgreSQL` server.
    Postgres,
    /// Process-local storage, lost on restart.
    InMemory,
}

impl FromStr for StorageMode {
    type Err = ConfigurationError;

    /// Parses a storage mode from a string.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidStorageMode` if the string is not recognized.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "sqlite" | "sqlite3" => Ok(Self::Sqlite),
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            "in_memory" | "inmemory" | "memory" => Ok(Self::InMemory),
            _ => Err(ConfigurationError::InvalidStorageMode(value.to_string())),
        }
    }
}

/// Configuration for the repository factory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryConfig {
    /// Storage backend.
    pub storage_mode: StorageMode,
    /// Connection URL; `None` selects the default for the backend.
    pub database_url: Option<String>,
    /// Maximum number of pooled connections.
    pub max_connections: u32,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            storage_mode: StorageMode::default(),
            database_url: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl RepositoryConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> RepositoryConfigBuilder {
        RepositoryConfigBuilder::default()
    }

    /// Creates a configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if a variable holds an invalid value or
    /// `DATABASE_URL` is missing for `PostgreSQL`.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Creates a configuration from an arbitrary key lookup.
    ///
    /// Empty or whitespace-only values are treated as unset.
    ///
    /// # Errors
    ///
    /// See [`RepositoryConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigurationError> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let storage_mode = match read("STORAGE_MODE") {
            Some(value) => value.parse()?,
            None => StorageMode::default(),
        };

        let max_connections = match read("DATABASE_MAX_CONNECTIONS") {
            Some(value) => value
                .parse::<u32>()
                .map_err(|_| ConfigurationError::InvalidMaxConnections(value))?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let config = Self {
            storage_mode,
            database_url: read("DATABASE_URL"),
            max_connections,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if the URL is missing for `PostgreSQL`
    /// or the pool size is zero.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.storage_mode == StorageMode::Postgres && self.database_url.is_none() {
            return Err(ConfigurationError::MissingDatabaseUrl);
        }

        if self.max_connections == 0 {
            return Err(ConfigurationError::InvalidMaxConnections("0".to_string()));
        }

        Ok(())
    }

    /// Returns the configured URL, falling back to the `SQLite` default.
    #[must_use]
    pub fn effective_database_url(&self) -> Option<&str> {
        match (self.storage_mode, self.database_url.as_deref()) {
            (_, Some(url)) => Some(url),
            (StorageMode::Sqlite, None) => Some(DEFAULT_SQLITE_URL),
            (StorageMode::Postgres | StorageMode::InMemory, None) => None,
        }
    }
}

/// Builder for `RepositoryConfig`.
///
/// # Example
///
/// ```ignore
/// let config = RepositoryConfig::builder()
///     .storage_mode(StorageMode::Postgres)
///     .database_url("postgres://localhost/todos")
///     .build()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct RepositoryConfigBuilder {
    storage_mode: StorageMode,
    database_url: Option<String>,
    max_connections: Option<u32>,
}

impl RepositoryConfigBuilder {
    /// Sets the storage mode.
    #[must_use]
    pub const fn storage_mode(mut self, mode: StorageMode) -> Self {
        self.storage_mode = mode;
        self
    }

    /// Sets the database URL.
    #[must_use]
    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = Some(url.into());
        self
    }

    /// Sets the pool size.
    #[must_use]
    pub const fn max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = Some(max_connections);
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if the configuration is invalid.
    pub fn build(self) -> Result<RepositoryConfig, ConfigurationError> {
        let config = RepositoryConfig {
            storage_mode: self.storage_mode,
            database_url: self.database_url,
            max_connections: self.max_connections.unwrap_or(DEFAULT_MAX_CONNECTIONS),
        };

        config.validate()?;
        Ok(config)
    }
}

// =============================================================================
// Error Types
// =============================================================================

/// Errors in the storage configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// Invalid storage mode value.
    #[error("Invalid storage mode: '{0}'. Expected 'sqlite', 'postgres' or 'in_memory'")]
    InvalidStorageMode(String),

    /// Missing `DATABASE_URL` when storage mode is Postgres.
    #[error("DATABASE_URL environment variable is required when STORAGE_MODE=postgres")]
    MissingDatabaseUrl,

    /// Pool size that is not a positive integer.
    #[error("Invalid DATABASE_MAX_CONNECTIONS: '{0}'. Expected a positive integer")]
    InvalidMaxConnections(String),
}

/// Errors that can occur during factory initialization.
#[derive(Debug, Error)]
pub enum FactoryError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    DatabaseConnection(RepositoryError),

    /// Schema creation error.
    #[error("Schema initialization error: {0}")]
    SchemaInitialization(RepositoryError),
}

// =============================================================================
// Repository Factory
// =============================================================================

/// Initialized storage handles.
#[derive(Clone)]
pub struct Repositories {
    /// Todo repository shared by every request.
    pub todo_repository: Arc<dyn TodoRepository>,
}

impl std::fmt::Debug for Repositories {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Repositories")
            .field("todo_repository", &"Arc<dyn TodoRepository>")
            .finish()
    }
}

/// Factory for creating repository instances based on configuration.
#[derive(Debug, Clone)]
pub struct RepositoryFactory {
    config: RepositoryConfig,
}

impl RepositoryFactory {
    /// Creates a new repository factory with the given configuration.
    #[must_use]
    pub const fn new(config: RepositoryConfig) -> Self {
        Self { config }
    }

    /// Opens the configured store and ensures the schema exists.
    ///
    /// # Errors
    ///
    /// Returns `FactoryError` if the connection cannot be opened or the
    /// schema cannot be created.
    pub async fn create(&self) -> Result<Repositories, FactoryError> {
        let url = self.config.effective_database_url();
        let max_connections = self.config.max_connections;

        let todo_repository: Arc<dyn TodoRepository> = match (self.config.storage_mode, url) {
            (StorageMode::InMemory, _) => Arc::new(InMemoryTodoRepository::new()),

            (StorageMode::Sqlite, Some(url)) => {
                let repository = SqliteTodoRepository::connect(url, max_connections)
                    .await
                    .map_err(FactoryError::DatabaseConnection)?;
                repository
                    .ensure_schema()
                    .await
                    .map_err(FactoryError::SchemaInitialization)?;
                Arc::new(repository)
            }

            (StorageMode::Postgres, Some(url)) => {
                let repository = PostgresTodoRepository::connect(url, max_connections)
                    .await
                    .map_err(FactoryError::DatabaseConnection)?;
                repository
                    .ensure_schema()
                    .await
                    .map_err(FactoryError::SchemaInitialization)?;
                Arc::new(repository)
            }

            (StorageMode::Sqlite | StorageMode::Postgres, None) => {
                return Err(ConfigurationError::MissingDatabaseUrl.into());
            }
        };

        Ok(Repositories { todo_repository })
    }
}

// =============================================================================
// Tests
// =============================================================================
