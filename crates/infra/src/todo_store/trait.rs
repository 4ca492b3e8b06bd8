use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use ironstart_core::{Todo, UserId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TodoStoreError {
    #[error("todo store unavailable: {0}")]
    Unavailable(String),

    #[error("todo id already exists: {0}")]
    DuplicateId(String),
}

/// Repository keyed by owning identity.
#[async_trait]
pub trait TodoRepository: Send + Sync {
    /// All todos owned by `owner`, in insertion order.
    async fn list_for(&self, owner: UserId) -> Result<Vec<Todo>, TodoStoreError>;

    /// Append to the partition of `todo.user_id`.
    async fn append(&self, todo: Todo) -> Result<(), TodoStoreError>;
}

#[async_trait]
impl<S> TodoRepository for Arc<S>
where
    S: TodoRepository + ?Sized,
{
    async fn list_for(&self, owner: UserId) -> Result<Vec<Todo>, TodoStoreError> {
        (**self).list_for(owner).await
    }

    async fn append(&self, todo: Todo) -> Result<(), TodoStoreError> {
        (**self).append(todo).await
    }
}
