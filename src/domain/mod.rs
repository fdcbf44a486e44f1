//! Domain layer for the Pixel Todo service.
//!
//! This module contains the todo entity, its value objects, and the pure
//! functions that create and mutate it.

pub mod todo;

pub use todo::{
    NewTodo, Priority, Timestamp, Todo, TodoId, TodoPatch, TodoStats, UnknownPriority,
};
