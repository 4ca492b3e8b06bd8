//! `ironstart-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no transport or storage concerns).

pub mod error;
pub mod id;
pub mod todo;

pub use error::{DomainError, DomainResult};
pub use id::{SessionId, TodoId, UserId};
pub use todo::{NewTodo, Todo, TodoTitle, TITLE_MAX_CHARS, TITLE_MIN_CHARS};
