//! Postgres-backed todo repository.
//!
//! ## Ordering
//!
//! Rows carry a `seq BIGSERIAL` column; listing orders by it, which gives
//! insertion order without relying on timestamp resolution.
//!
//! ## Partitioning
//!
//! Every query filters on `user_id`. Concurrent appends for one owner are
//! plain inserts, so the database serializes them without lost updates.
//!
//! ## Error Mapping
//!
//! | SQLx error | TodoStoreError |
//! |------------|-----------------|
//! | Database, code `23505` (unique violation) | `DuplicateId` |
//! | anything else | `Unavailable` |

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use ironstart_core::{Todo, TodoId, UserId};

use super::r#trait::{TodoRepository, TodoStoreError};

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS todos (
    seq         BIGSERIAL PRIMARY KEY,
    id          UUID NOT NULL UNIQUE,
    user_id     UUID NOT NULL,
    title       TEXT NOT NULL CHECK (char_length(title) BETWEEN 1 AND 255),
    completed   BOOLEAN NOT NULL DEFAULT FALSE,
    created_at  TIMESTAMPTZ NOT NULL
)"#;

const CREATE_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS todos_user_id_seq_idx ON todos (user_id, seq)";

#[derive(Debug, Clone)]
pub struct PostgresTodoRepository {
    pool: PgPool,
}

impl PostgresTodoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the `todos` table and its index if they are missing.
    pub async fn ensure_schema(&self) -> Result<(), TodoStoreError> {
        sqlx::query(CREATE_TABLE)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        sqlx::query(CREATE_INDEX)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }
}

fn map_sqlx_error(err: sqlx::Error) -> TodoStoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.code().as_deref() == Some("23505") {
            return TodoStoreError::DuplicateId(db.message().to_string());
        }
    }
    TodoStoreError::Unavailable(err.to_string())
}

#[async_trait]
impl TodoRepository for PostgresTodoRepository {
    #[instrument(skip(self), fields(owner = %owner))]
    async fn list_for(&self, owner: UserId) -> Result<Vec<Todo>, TodoStoreError> {
        let rows = sqlx::query(
            "SELECT id, user_id, title, completed, created_at FROM todos WHERE user_id = $1 ORDER BY seq",
        )
        .bind(owner.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter()
            .map(|row| {
                let id: Uuid = row.try_get("id")?;
                let user_id: Uuid = row.try_get("user_id")?;
                let created_at: DateTime<Utc> = row.try_get("created_at")?;
                Ok(Todo {
                    id: TodoId::from_uuid(id),
                    title: row.try_get("title")?,
                    completed: row.try_get("completed")?,
                    user_id: UserId::from_uuid(user_id),
                    created_at,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()
            .map_err(map_sqlx_error)
    }

    #[instrument(skip(self, todo), fields(owner = %todo.user_id, todo_id = %todo.id))]
    async fn append(&self, todo: Todo) -> Result<(), TodoStoreError> {
        sqlx::query(
            "INSERT INTO todos (id, user_id, title, completed, created_at) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(todo.id.as_uuid())
        .bind(todo.user_id.as_uuid())
        .bind(&todo.title)
        .bind(todo.completed)
        .bind(todo.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }
}
