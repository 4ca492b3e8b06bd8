//! Registered users.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ironstart_core::UserId;

use crate::error::AuthError;

/// A registered user, as exposed to the rest of the system.
///
/// Password material never lives on this type; see [`crate::StoredCredentials`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: String, email: String, now: DateTime<Utc>) -> Self {
        Self {
            id: UserId::new(),
            name,
            email,
            email_verified: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Trim + lowercase an email and perform a shape check.
///
/// Emails are the lookup key for sign-in, so they are stored in normalized form.
pub fn normalize_email(raw: &str) -> Result<String, AuthError> {
    let email = raw.trim().to_lowercase();

    let Some((local, domain)) = email.split_once('@') else {
        return Err(AuthError::InvalidEmail);
    };
    if local.is_empty() || domain.contains('@') || email.chars().any(char::is_whitespace) {
        return Err(AuthError::InvalidEmail);
    }
    match domain.split_once('.') {
        Some((host, tld)) if !host.is_empty() && !tld.is_empty() && !domain.ends_with('.') => {
            Ok(email)
        }
        _ => Err(AuthError::InvalidEmail),
    }
}
