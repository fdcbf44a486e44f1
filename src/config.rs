//! Server process configuration.
//!
//! Storage settings live in [`crate::infrastructure::RepositoryConfig`];
//! this module covers the listener, the front-end directory and the tokio
//! runtime.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

/// Listen address used when `HOST` is not set.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Listen port used when `PORT` is not set.
pub const DEFAULT_PORT: u16 = 8000;

/// Environment label used when `ENVIRONMENT` is not set.
pub const DEFAULT_ENVIRONMENT: &str = "development";

/// Front-end directory used when `STATIC_DIR` is not set.
pub const DEFAULT_STATIC_DIR: &str = "frontend";

// =============================================================================
// Server Configuration
// =============================================================================

/// Listener and hosting settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Free-form label such as `development` or `production`, only logged.
    pub environment: String,
    /// Directory holding the front-end bundle.
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            environment: DEFAULT_ENVIRONMENT.to_string(),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
        }
    }
}

impl ServerConfig {
    /// Reads `HOST`, `PORT`, `ENVIRONMENT` and `STATIC_DIR`.
    ///
    /// # Errors
    ///
    /// Returns `ServerConfigError::InvalidPort` if `PORT` is not a valid port.
    pub fn from_env() -> Result<Self, ServerConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`ServerConfig::from_env`] with an arbitrary key lookup.
    /// Empty values are treated as unset.
    ///
    /// # Errors
    ///
    /// Returns `ServerConfigError::InvalidPort` if `PORT` is not a valid port.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ServerConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let defaults = Self::default();

        let port = match read("PORT") {
            Some(value) => value
                .parse::<u16>()
                .map_err(|_| ServerConfigError::InvalidPort(value))?,
            None => defaults.port,
        };

        Ok(Self {
            host: read("HOST").unwrap_or(defaults.host),
            port,
            environment: read("ENVIRONMENT").unwrap_or(defaults.environment),
            static_dir: read("STATIC_DIR").map_or(defaults.static_dir, PathBuf::from),
        })
    }

    /// Resolves the listen address.
    ///
    /// # Errors
    ///
    /// Returns `ServerConfigError::InvalidAddress` if `host` is not an IP
    /// address.
    pub fn socket_address(&self) -> Result<SocketAddr, ServerConfigError> {
        let address = format!("{}:{}", self.host, self.port);
        address
            .parse()
            .map_err(|_| ServerConfigError::InvalidAddress(address))
    }
}

/// Errors in the server configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServerConfigError {
    #[error("Invalid PORT: '{0}'. Expected an integer between 0 and 65535")]
    InvalidPort(String),

    #[error("Invalid server address: '{0}'")]
    InvalidAddress(String),
}

// =============================================================================
// Worker Threads
// =============================================================================

/// Result of parsing the `WORKER_THREADS` environment variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerThreads {
    /// Thread count to configure, `None` for the tokio default.
    pub threads: Option<usize>,
    /// Message to print before logging is set up.
    pub warning: Option<String>,
}

impl WorkerThreads {
    /// Reads `WORKER_THREADS`, capping it at four times the available
    /// parallelism.
    pub fn from_env() -> Self {
        let max_threads = std::thread::available_parallelism()
            .map(|parallelism| parallelism.get().saturating_mul(4))
            .unwrap_or(64);
        Self::parse(env::var("WORKER_THREADS").ok().as_deref(), max_threads)
    }

    /// Interprets a raw `WORKER_THREADS` value.
    ///
    /// Empty, zero and non-numeric values fall back to the default; zero and
    /// non-numeric values also produce a warning.
    pub fn parse(value: Option<&str>, max_threads: usize) -> Self {
        let default = |warning: Option<String>| Self {
            threads: None,
            warning,
        };

        let Some(trimmed) = value.map(str::trim).filter(|value| !value.is_empty()) else {
            return default(None);
        };

        match trimmed.parse::<usize>() {
            Ok(0) => default(Some(
                "WORKER_THREADS=0 is invalid (must be > 0), using default".to_string(),
            )),
            Ok(threads) if threads > max_threads => Self {
                threads: Some(max_threads),
                warning: Some(format!(
                    "WORKER_THREADS={threads} exceeds recommended limit ({max_threads}), capping to {max_threads}"
                )),
            },
            Ok(threads) => Self {
                threads: Some(threads),
                warning: None,
            },
            Err(error) => default(Some(format!(
                "WORKER_THREADS='{trimmed}' is not a valid number ({error}), using default"
            ))),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
