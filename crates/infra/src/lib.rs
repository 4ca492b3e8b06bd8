//! Infrastructure layer: storage adapters behind the domain-facing traits.

pub mod auth_store;
pub mod todo_store;

pub use auth_store::InMemoryAuthStore;
pub use todo_store::{InMemoryTodoRepository, PostgresTodoRepository, TodoRepository, TodoStoreError};
