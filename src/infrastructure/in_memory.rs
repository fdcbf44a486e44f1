//! In-memory repository implementation.
//!
//! Backed by a `BTreeMap` behind a `tokio::sync::RwLock`. Suitable for
//! tests and for running the service without a database
//! (`STORAGE_MODE=in_memory`); nothing survives a restart.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::RwLock;

use crate::domain::{NewTodo, Timestamp, Todo, TodoId, TodoPatch, TodoStats};
use crate::infrastructure::{Pagination, RepositoryFuture, TodoFilter, TodoRepository};

#[derive(Debug, Default)]
struct Store {
    todos: BTreeMap<TodoId, Todo>,
    /// Last allocated ID; IDs are never reused, even after deletes.
    last_id: i64,
}

/// In-memory implementation of `TodoRepository`.
///
/// # Example
///
/// ```ignore
/// let repository = InMemoryTodoRepository::new();
/// let todo = repository.create(NewTodo::new("Buy milk")).await?;
/// let found = repository.find_by_id(todo.id).await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryTodoRepository {
    store: Arc<RwLock<Store>>,
}

impl InMemoryTodoRepository {
    /// Creates a new empty in-memory todo repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Sorts newest first, breaking `created_at` ties by descending ID.
fn newest_first(left: &Todo, right: &Todo) -> std::cmp::Ordering {
    right
        .created_at
        .cmp(&left.created_at)
        .then_with(|| right.id.cmp(&left.id))
}

#[allow(clippy::significant_drop_tightening)]
impl TodoRepository for InMemoryTodoRepository {
    fn find_by_id(&self, id: TodoId) -> RepositoryFuture<Option<Todo>> {
        let store = Arc::clone(&self.store);
        async move {
            let guard = store.read().await;
            Ok(guard.todos.get(&id).cloned())
        }
        .boxed()
    }

    fn list(&self, filter: TodoFilter, pagination: Pagination) -> RepositoryFuture<Vec<Todo>> {
        let store = Arc::clone(&self.store);
        async move {
            let guard = store.read().await;
            let mut matching: Vec<Todo> = guard
                .todos
                .values()
                .filter(|todo| filter.matches(todo))
                .cloned()
                .collect();
            matching.sort_by(newest_first);

            let skip = usize::try_from(pagination.skip).unwrap_or(usize::MAX);
            let limit = usize::try_from(pagination.limit).unwrap_or(usize::MAX);
            Ok(matching.into_iter().skip(skip).take(limit).collect())
        }
        .boxed()
    }

    fn create(&self, todo: NewTodo) -> RepositoryFuture<Todo> {
        let store = Arc::clone(&self.store);
        async move {
            let mut guard = store.write().await;
            guard.last_id += 1;
            let id = TodoId::from_i64(guard.last_id);
            let stored = Todo::from_new(id, todo, Timestamp::now());
            guard.todos.insert(id, stored.clone());
            tracing::debug!(%id, "Created todo");
            Ok(stored)
        }
        .boxed()
    }

    fn update(&self, id: TodoId, patch: TodoPatch) -> RepositoryFuture<Option<Todo>> {
        let store = Arc::clone(&self.store);
        async move {
            let mut guard = store.write().await;
            let Some(existing) = guard.todos.remove(&id) else {
                return Ok(None);
            };
            let updated = existing.apply_patch(patch, Timestamp::now());
            guard.todos.insert(id, updated.clone());
            tracing::debug!(%id, "Updated todo");
            Ok(Some(updated))
        }
        .boxed()
    }

    fn delete(&self, id: TodoId) -> RepositoryFuture<bool> {
        let store = Arc::clone(&self.store);
        async move {
            let mut guard = store.write().await;
            let deleted = guard.todos.remove(&id).is_some();
            if deleted {
                tracing::debug!(%id, "Deleted todo");
            }
            Ok(deleted)
        }
        .boxed()
    }

    fn stats(&self) -> RepositoryFuture<TodoStats> {
        let store = Arc::clone(&self.store);
        async move {
            let guard = store.read().await;
            let total = guard.todos.len() as u64;
            let completed = guard.todos.values().filter(|todo| todo.completed).count() as u64;
            Ok(TodoStats::from_counts(total, completed))
        }
        .boxed()
    }
}

// =============================================================================
// Tests
// =============================================================================
