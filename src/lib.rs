//! Pixel Todo API Library
//!
//! A small todo-list service: an axum router over a pluggable todo
//! repository (`SQLite`, `PostgreSQL` or in-memory), plus hosting for the
//! front-end bundle.

pub mod api;
pub mod config;
pub mod domain;
pub mod infrastructure;
