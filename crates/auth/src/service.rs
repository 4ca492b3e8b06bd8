//! Email/password authentication and session resolution.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use ironstart_core::SessionId;

use crate::error::AuthError;
use crate::password::PasswordHasher;
use crate::session::{AuthSession, Session, default_session_ttl};
use crate::store::{AuthStore, AuthStoreError, StoredCredentials};
use crate::token::{TokenSigner, generate_token};
use crate::user::{User, normalize_email};

#[derive(Debug, Clone, Deserialize)]
pub struct SignUp {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignIn {
    pub email: String,
    pub password: String,
}

/// Request metadata recorded on new sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientMeta {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// A freshly issued session plus the signed token to hand to the client.
#[derive(Debug, Clone, Serialize)]
pub struct SignedSession {
    pub token: String,
    #[serde(flatten)]
    pub session: AuthSession,
}

/// Session provider backed by an [`AuthStore`].
#[derive(Debug)]
pub struct AuthService<S> {
    store: S,
    signer: TokenSigner,
    hasher: PasswordHasher,
    session_ttl: Duration,
}

impl<S: AuthStore> AuthService<S> {
    pub fn new(store: S, secret: impl Into<Vec<u8>>) -> Self {
        Self {
            store,
            signer: TokenSigner::new(secret),
            hasher: PasswordHasher::default(),
            session_ttl: default_session_ttl(),
        }
    }

    pub fn with_hasher(mut self, hasher: PasswordHasher) -> Self {
        self.hasher = hasher;
        self
    }

    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }

    /// Register a new user and sign them in.
    pub async fn sign_up_email(
        &self,
        req: SignUp,
        meta: ClientMeta,
        now: DateTime<Utc>,
    ) -> Result<SignedSession, AuthError> {
        let name = req.name.trim().to_string();
        if name.is_empty() {
            return Err(AuthError::InvalidName);
        }
        let email = normalize_email(&req.email)?;
        PasswordHasher::check_policy(&req.password)?;

        let user = User::new(name, email, now);
        let credentials = StoredCredentials {
            user: user.clone(),
            password_hash: self.hash_password(req.password).await?,
        };

        match self.store.insert_user(credentials).await {
            Ok(()) => {}
            Err(AuthStoreError::DuplicateEmail) => return Err(AuthError::UserAlreadyExists),
            Err(e) => return Err(e.into()),
        }

        tracing::info!(user_id = %user.id, "user registered");
        self.issue_session(user, meta, now).await
    }

    pub async fn sign_in_email(
        &self,
        req: SignIn,
        meta: ClientMeta,
        now: DateTime<Utc>,
    ) -> Result<SignedSession, AuthError> {
        // Malformed emails can't match a stored user; report them the same way.
        let email = normalize_email(&req.email).map_err(|_| AuthError::InvalidCredentials)?;

        let Some(credentials) = self.store.find_by_email(&email).await? else {
            return Err(AuthError::InvalidCredentials);
        };
        let matches = self
            .verify_password(req.password, credentials.password_hash.clone())
            .await?;
        if !matches {
            tracing::debug!(user_id = %credentials.user.id, "password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        self.issue_session(credentials.user, meta, now).await
    }

    /// Invalidate the session behind a signed token. Unknown or forged tokens are a no-op.
    pub async fn sign_out(&self, signed_token: &str) -> Result<(), AuthError> {
        if let Some(token) = self.signer.verify(signed_token) {
            self.store.delete_session(token).await?;
        }
        Ok(())
    }

    /// Resolve a signed token to a live session.
    ///
    /// Forged, unknown, and expired tokens all yield `Ok(None)`; expired sessions are
    /// removed on the way out. Only store failures are errors.
    pub async fn get_session(
        &self,
        signed_token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<AuthSession>, AuthError> {
        let Some(token) = self.signer.verify(signed_token) else {
            return Ok(None);
        };
        let Some(session) = self.store.find_session(token).await? else {
            return Ok(None);
        };
        if session.is_expired(now) {
            self.store.delete_session(token).await?;
            return Ok(None);
        }
        let Some(user) = self.store.find_user(session.user_id).await? else {
            tracing::warn!(session_id = %session.id, "session references a missing user");
            return Ok(None);
        };

        Ok(Some(AuthSession { session, user }))
    }

    // PBKDF2 is CPU-bound; keep it off the async workers.
    async fn hash_password(&self, password: String) -> Result<String, AuthError> {
        let hasher = self.hasher;
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::Hashing(e.to_string()))
    }

    async fn verify_password(&self, password: String, encoded: String) -> Result<bool, AuthError> {
        let hasher = self.hasher;
        tokio::task::spawn_blocking(move || hasher.verify(&password, &encoded))
            .await
            .map_err(|e| AuthError::Hashing(e.to_string()))
    }

    async fn issue_session(
        &self,
        user: User,
        meta: ClientMeta,
        now: DateTime<Utc>,
    ) -> Result<SignedSession, AuthError> {
        let token = generate_token();
        let session = Session {
            id: SessionId::new(),
            token: token.clone(),
            user_id: user.id,
            created_at: now,
            expires_at: now + self.session_ttl,
            ip_address: meta.ip_address,
            user_agent: meta.user_agent,
        };
        self.store.insert_session(session.clone()).await?;

        Ok(SignedSession {
            token: self.signer.sign(&token),
            session: AuthSession { session, user },
        })
    }
}
