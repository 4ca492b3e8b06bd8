use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;

use ironstart_core::{Todo, UserId};

use super::r#trait::{TodoRepository, TodoStoreError};

type Partition = Arc<Mutex<Vec<Todo>>>;

/// In-memory todo store for tests/dev.
///
/// The outer map is only write-locked to create a missing partition. Appends
/// take the partition's own mutex, so concurrent creates for one owner never
/// lose updates and different owners never wait on each other.
#[derive(Debug, Default)]
pub struct InMemoryTodoRepository {
    partitions: RwLock<HashMap<UserId, Partition>>,
}

impl InMemoryTodoRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn existing(&self, owner: UserId) -> Result<Option<Partition>, TodoStoreError> {
        let map = self.partitions.read().map_err(|_| poisoned())?;
        Ok(map.get(&owner).cloned())
    }

    fn partition(&self, owner: UserId) -> Result<Partition, TodoStoreError> {
        if let Some(p) = self.existing(owner)? {
            return Ok(p);
        }
        let mut map = self.partitions.write().map_err(|_| poisoned())?;
        Ok(map.entry(owner).or_default().clone())
    }
}

fn poisoned() -> TodoStoreError {
    TodoStoreError::Unavailable("in-memory todo store lock poisoned".to_string())
}

#[async_trait]
impl TodoRepository for InMemoryTodoRepository {
    async fn list_for(&self, owner: UserId) -> Result<Vec<Todo>, TodoStoreError> {
        let Some(partition) = self.existing(owner)? else {
            return Ok(Vec::new());
        };
        let todos = partition.lock().map_err(|_| poisoned())?;
        Ok(todos.clone())
    }

    async fn append(&self, todo: Todo) -> Result<(), TodoStoreError> {
        let partition = self.partition(todo.user_id)?;
        let mut todos = partition.lock().map_err(|_| poisoned())?;
        if todos.iter().any(|t| t.id == todo.id) {
            return Err(TodoStoreError::DuplicateId(todo.id.to_string()));
        }
        todos.push(todo);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use ironstart_core::{NewTodo, TodoTitle};

    use super::*;

    fn todo(owner: UserId, title: &str) -> Todo {
        Todo::create(
            owner,
            NewTodo {
                title: TodoTitle::parse(title).unwrap(),
            },
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn unknown_owner_lists_empty() {
        let repo = InMemoryTodoRepository::new();
        assert!(repo.list_for(UserId::new()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_preserves_insertion_order() {
        let repo = InMemoryTodoRepository::new();
        let owner = UserId::new();
        for t in ["first", "second", "third"] {
            repo.append(todo(owner, t)).await.unwrap();
        }
        let titles: Vec<_> = repo
            .list_for(owner)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, ["first", "second", "third"]);
    }

    #[tokio::test]
    async fn partitions_are_isolated() {
        let repo = InMemoryTodoRepository::new();
        let a = UserId::new();
        let b = UserId::new();
        repo.append(todo(a, "mine")).await.unwrap();

        assert!(repo.list_for(b).await.unwrap().is_empty());
        assert_eq!(repo.list_for(a).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn duplicate_ids_are_rejected() {
        let repo = InMemoryTodoRepository::new();
        let t = todo(UserId::new(), "once");
        repo.append(t.clone()).await.unwrap();
        assert!(matches!(repo.append(t).await, Err(TodoStoreError::DuplicateId(_))));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_appends_for_one_owner_are_not_lost() {
        let repo = Arc::new(InMemoryTodoRepository::new());
        let owner = UserId::new();

        let handles: Vec<_> = (0..200)
            .map(|i| {
                let repo = repo.clone();
                tokio::spawn(async move { repo.append(todo(owner, &format!("t{i}"))).await })
            })
            .collect();
        for h in handles {
            h.await.unwrap().unwrap();
        }

        assert_eq!(repo.list_for(owner).await.unwrap().len(), 200);
    }
}
