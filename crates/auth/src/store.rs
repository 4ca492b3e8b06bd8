use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use ironstart_core::UserId;

use crate::{Session, User};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthStoreError {
    #[error("email already registered")]
    DuplicateEmail,

    #[error("auth store unavailable: {0}")]
    Unavailable(String),
}

/// A user together with their encoded password hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredentials {
    pub user: User,
    pub password_hash: String,
}

/// Persistence boundary for users and sessions.
///
/// Emails are passed already normalized; implementations compare them verbatim.
#[async_trait]
pub trait AuthStore: Send + Sync {
    /// Insert a user; fails with [`AuthStoreError::DuplicateEmail`] if the email is taken.
    async fn insert_user(&self, credentials: StoredCredentials) -> Result<(), AuthStoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<StoredCredentials>, AuthStoreError>;

    async fn find_user(&self, user_id: UserId) -> Result<Option<User>, AuthStoreError>;

    async fn insert_session(&self, session: Session) -> Result<(), AuthStoreError>;

    async fn find_session(&self, token: &str) -> Result<Option<Session>, AuthStoreError>;

    /// Deleting an unknown token is not an error.
    async fn delete_session(&self, token: &str) -> Result<(), AuthStoreError>;
}

#[async_trait]
impl<S> AuthStore for Arc<S>
where
    S: AuthStore + ?Sized,
{
    async fn insert_user(&self, credentials: StoredCredentials) -> Result<(), AuthStoreError> {
        (**self).insert_user(credentials).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<StoredCredentials>, AuthStoreError> {
        (**self).find_by_email(email).await
    }

    async fn find_user(&self, user_id: UserId) -> Result<Option<User>, AuthStoreError> {
        (**self).find_user(user_id).await
    }

    async fn insert_session(&self, session: Session) -> Result<(), AuthStoreError> {
        (**self).insert_session(session).await
    }

    async fn find_session(&self, token: &str) -> Result<Option<Session>, AuthStoreError> {
        (**self).find_session(token).await
    }

    async fn delete_session(&self, token: &str) -> Result<(), AuthStoreError> {
        (**self).delete_session(token).await
    }
}
