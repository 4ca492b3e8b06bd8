use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use ironstart_auth::{AuthStore, AuthStoreError, Session, StoredCredentials, User};
use ironstart_core::UserId;

#[derive(Debug, Default)]
struct Inner {
    by_email: HashMap<String, StoredCredentials>,
    email_by_id: HashMap<UserId, String>,
    sessions: HashMap<String, Session>,
}

/// In-memory users + sessions for tests/dev. Everything is lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryAuthStore {
    inner: RwLock<Inner>,
}

impl InMemoryAuthStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session_count(&self) -> usize {
        self.inner.read().map(|i| i.sessions.len()).unwrap_or(0)
    }
}

fn poisoned() -> AuthStoreError {
    AuthStoreError::Unavailable("in-memory auth store lock poisoned".to_string())
}

#[async_trait]
impl AuthStore for InMemoryAuthStore {
    async fn insert_user(&self, credentials: StoredCredentials) -> Result<(), AuthStoreError> {
        let mut inner = self.inner.write().map_err(|_| poisoned())?;
        let email = credentials.user.email.clone();
        if inner.by_email.contains_key(&email) {
            return Err(AuthStoreError::DuplicateEmail);
        }
        inner.email_by_id.insert(credentials.user.id, email.clone());
        inner.by_email.insert(email, credentials);
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<StoredCredentials>, AuthStoreError> {
        let inner = self.inner.read().map_err(|_| poisoned())?;
        Ok(inner.by_email.get(email).cloned())
    }

    async fn find_user(&self, user_id: UserId) -> Result<Option<User>, AuthStoreError> {
        let inner = self.inner.read().map_err(|_| poisoned())?;
        Ok(inner
            .email_by_id
            .get(&user_id)
            .and_then(|email| inner.by_email.get(email))
            .map(|c| c.user.clone()))
    }

    async fn insert_session(&self, session: Session) -> Result<(), AuthStoreError> {
        let mut inner = self.inner.write().map_err(|_| poisoned())?;
        // Abandoned sessions are never looked up again; drop them here.
        let now = session.created_at;
        inner.sessions.retain(|_, s| !s.is_expired(now));
        inner.sessions.insert(session.token.clone(), session);
        Ok(())
    }

    async fn find_session(&self, token: &str) -> Result<Option<Session>, AuthStoreError> {
        let inner = self.inner.read().map_err(|_| poisoned())?;
        Ok(inner.sessions.get(token).cloned())
    }

    async fn delete_session(&self, token: &str) -> Result<(), AuthStoreError> {
        let mut inner = self.inner.write().map_err(|_| poisoned())?;
        inner.sessions.remove(token);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use ironstart_auth::{AuthService, ClientMeta, PasswordHasher, SignUp};

    use super::*;

    fn credentials(email: &str) -> StoredCredentials {
        StoredCredentials {
            user: User::new("Test".to_string(), email.to_string(), Utc::now()),
            password_hash: "unused".to_string(),
        }
    }

    #[tokio::test]
    async fn duplicate_email_is_reported() {
        let store = InMemoryAuthStore::new();
        store.insert_user(credentials("a@example.com")).await.unwrap();
        assert_eq!(
            store.insert_user(credentials("a@example.com")).await,
            Err(AuthStoreError::DuplicateEmail)
        );
    }

    #[tokio::test]
    async fn users_are_found_by_id_and_email() {
        let store = InMemoryAuthStore::new();
        let c = credentials("a@example.com");
        let id = c.user.id;
        store.insert_user(c).await.unwrap();

        assert_eq!(store.find_user(id).await.unwrap().unwrap().email, "a@example.com");
        assert!(store.find_by_email("a@example.com").await.unwrap().is_some());
        assert!(store.find_user(UserId::new()).await.unwrap().is_none());
    }

    fn session(token: &str, created_at: chrono::DateTime<Utc>, ttl_minutes: i64) -> Session {
        Session {
            id: ironstart_core::SessionId::new(),
            token: token.to_string(),
            user_id: UserId::new(),
            created_at,
            expires_at: created_at + chrono::Duration::minutes(ttl_minutes),
            ip_address: None,
            user_agent: None,
        }
    }

    #[tokio::test]
    async fn expired_sessions_are_pruned_on_insert() {
        let store = InMemoryAuthStore::new();
        let start = Utc::now();
        store.insert_session(session("short", start, 5)).await.unwrap();
        store.insert_session(session("long", start, 60)).await.unwrap();
        assert_eq!(store.session_count(), 2);

        let later = start + chrono::Duration::minutes(10);
        store.insert_session(session("fresh", later, 5)).await.unwrap();

        assert_eq!(store.session_count(), 2);
        assert!(store.find_session("short").await.unwrap().is_none());
        assert!(store.find_session("long").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn backs_the_auth_service() {
        let store = std::sync::Arc::new(InMemoryAuthStore::new());
        let auth = AuthService::new(store.clone(), "0123456789abcdef0123456789abcdef")
            .with_hasher(PasswordHasher::with_iterations(1_000));

        let signed = auth
            .sign_up_email(
                SignUp {
                    name: "Bob".to_string(),
                    email: "bob@example.com".to_string(),
                    password: "hunter2hunter2".to_string(),
                },
                ClientMeta::default(),
                Utc::now(),
            )
            .await
            .unwrap();
        assert_eq!(store.session_count(), 1);

        auth.sign_out(&signed.token).await.unwrap();
        assert_eq!(store.session_count(), 0);
    }
}
