//! Identity-partitioned todo storage.
//!
//! Every operation is scoped to a single owner. There is no way
//! to read across partitions through this boundary.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryTodoRepository;
pub use postgres::PostgresTodoRepository;
pub use r#trait::{TodoRepository, TodoStoreError};
