//! Pixel Todo API
//!
//! # Environment Variables
//!
//! - `HOST`: Server host address (default: `0.0.0.0`)
//! - `PORT`: Server port (default: `8000`)
//! - `ENVIRONMENT`: Environment label, logged at startup (default: `development`)
//! - `STATIC_DIR`: Front-end bundle directory (default: `frontend`)
//! - `STORAGE_MODE`: `sqlite` (default) | `postgres` | `in_memory`
//! - `DATABASE_URL`: Connection URL (default: `sqlite://pixel_todos.db`,
//!   required when `STORAGE_MODE=postgres`)
//! - `DATABASE_MAX_CONNECTIONS`: Pool size (default: `5`)
//! - `RUST_LOG`: Logging filter (e.g., `info`, `pixel_todo_api=debug`)
//! - `LOG_FORMAT`: `text` (default) | `json`
//! - `WORKER_THREADS`: Number of tokio worker threads (default: logical CPU count)

use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pixel_todo_api::api::{AppState, build_router};
use pixel_todo_api::config::{ServerConfig, WorkerThreads};
use pixel_todo_api::infrastructure::{RepositoryConfig, RepositoryFactory};

fn main() {
    dotenvy::dotenv().ok();

    let worker_threads = WorkerThreads::from_env();
    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();

    if let Some(warning) = &worker_threads.warning {
        eprintln!("Warning: {warning}");
    }
    if let Some(threads) = worker_threads.threads {
        builder.worker_threads(threads);
        if worker_threads.warning.is_none() {
            eprintln!("Tokio worker_threads set to: {threads}");
        }
    } else if worker_threads.warning.is_none() {
        eprintln!("Tokio worker_threads: using default (logical CPU count)");
    }

    let runtime = builder.build().expect("Failed to create tokio runtime");
    runtime.block_on(async_main());
}

async fn async_main() {
    let json_logs = std::env::var("LOG_FORMAT")
        .is_ok_and(|format| format.trim().eq_ignore_ascii_case("json"));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pixel_todo_api=debug,tower_http=debug".into()),
        )
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json_logs).then(tracing_subscriber::fmt::layer))
        .init();

    let server_config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(error) => {
            tracing::error!("Configuration error: {}", error);
            std::process::exit(1);
        }
    };

    tracing::info!(
        environment = %server_config.environment,
        "Starting Pixel Todo API"
    );

    let repository_config = match RepositoryConfig::from_env() {
        Ok(config) => config,
        Err(error) => {
            tracing::error!("Configuration error: {}", error);
            std::process::exit(1);
        }
    };

    tracing::info!(
        storage_mode = ?repository_config.storage_mode,
        max_connections = repository_config.max_connections,
        "Repository configuration loaded"
    );

    // Opens the pool and creates the schema if it is missing
    let factory = RepositoryFactory::new(repository_config);
    let repositories = match factory.create().await {
        Ok(repositories) => {
            tracing::info!("Repositories initialized successfully");
            repositories
        }
        Err(error) => {
            tracing::error!("Failed to initialize repositories: {}", error);
            std::process::exit(1);
        }
    };

    let todo_repository = repositories.todo_repository.clone();
    let application_state = AppState::from_repositories(repositories);
    let application = build_router(application_state, Some(&server_config.static_dir));

    let address = match server_config.socket_address() {
        Ok(address) => address,
        Err(error) => {
            tracing::error!(%error, "Invalid server address");
            std::process::exit(1);
        }
    };

    let listener = match TcpListener::bind(address).await {
        Ok(listener) => listener,
        Err(error) => {
            tracing::error!(%error, "Failed to bind to address {}", address);
            std::process::exit(1);
        }
    };

    match listener.local_addr() {
        Ok(address) => tracing::info!("Listening on {}", address),
        Err(error) => tracing::warn!(%error, "Could not determine local address"),
    }

    let served = axum::serve(listener, application)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    todo_repository.close().await;
    tracing::info!("Storage closed");

    if let Err(error) = served {
        tracing::error!(%error, "Server error");
        std::process::exit(1);
    }

    tracing::info!("Server shutdown complete");
}

/// Completes on SIGINT, or on SIGTERM where supported.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::warn!(%error, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::warn!(%error, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
