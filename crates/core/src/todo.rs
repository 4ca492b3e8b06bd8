//! Todo records: the example resource owned by a single user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::id::{TodoId, UserId};

pub const TITLE_MIN_CHARS: usize = 1;
pub const TITLE_MAX_CHARS: usize = 255;

/// A todo title that is known to be between 1 and 255 characters long.
///
/// Length is measured in UTF-16 code units, matching how browsers and the
/// JSON Schema `maxLength` emitted by the API count it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TodoTitle(String);

impl TodoTitle {
    pub fn parse(raw: impl Into<String>) -> DomainResult<Self> {
        let raw = raw.into();
        let len = raw.encode_utf16().count();
        if len < TITLE_MIN_CHARS {
            return Err(DomainError::validation("title must not be empty"));
        }
        if len > TITLE_MAX_CHARS {
            return Err(DomainError::validation(format!(
                "title must be at most {TITLE_MAX_CHARS} characters"
            )));
        }
        Ok(Self(raw))
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Validated input for creating a todo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    pub title: TodoTitle,
}

/// A todo record as stored and returned over the wire.
///
/// # Invariants
/// - `user_id` is the identity that created the record and never changes.
/// - `completed` is `false` at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: TodoId,
    pub title: String,
    pub completed: bool,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
}

impl Todo {
    /// Build a fresh record owned by `owner`.
    pub fn create(owner: UserId, input: NewTodo, now: DateTime<Utc>) -> Self {
        Self {
            id: TodoId::new(),
            title: input.title.into_inner(),
            completed: false,
            user_id: owner,
            created_at: now,
        }
    }
}
