//! Infrastructure layer: storage backends and their wiring.
//!
//! This module provides:
//! - The `TodoRepository` trait shared by every backend
//! - In-memory, `SQLite` and `PostgreSQL` implementations
//! - A factory that selects a backend from configuration

mod factory;
mod in_memory;
mod postgres;
mod repository;
mod schema;
mod sqlite;

pub use factory::{
    ConfigurationError, DEFAULT_MAX_CONNECTIONS, DEFAULT_SQLITE_URL, FactoryError, Repositories,
    RepositoryConfig, RepositoryConfigBuilder, RepositoryFactory, StorageMode,
};
pub use in_memory::InMemoryTodoRepository;
pub use postgres::PostgresTodoRepository;
pub use repository::{Pagination, RepositoryError, RepositoryFuture, TodoFilter, TodoRepository};
pub use sqlite::SqliteTodoRepository;
