use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use ironstart_core::{SessionId, UserId};

use crate::User;

/// Sessions live for a week unless signed out.
pub const DEFAULT_SESSION_TTL_SECS: i64 = 7 * 24 * 60 * 60;

pub fn default_session_ttl() -> Duration {
    Duration::seconds(DEFAULT_SESSION_TTL_SECS)
}

/// Server-side session record.
///
/// `token` is the raw (unsigned) token; clients only ever see the signed form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: SessionId,
    #[serde(skip)]
    pub token: String,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// A resolved, unexpired session together with its user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub session: Session,
    pub user: User,
}

impl AuthSession {
    pub fn user_id(&self) -> UserId {
        self.user.id
    }
}
