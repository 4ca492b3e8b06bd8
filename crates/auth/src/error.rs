use thiserror::Error;

use crate::store::AuthStoreError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid email address")]
    InvalidEmail,

    #[error("name must not be empty")]
    InvalidName,

    #[error("password must be at least {min} characters")]
    PasswordTooShort { min: usize },

    #[error("password must be at most {max} characters")]
    PasswordTooLong { max: usize },

    #[error("a user with this email already exists")]
    UserAlreadyExists,

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error(transparent)]
    Store(#[from] AuthStoreError),
}
