//! `ironstart-auth`: email/password identities and server-side sessions.
//!
//! This crate is decoupled from HTTP and concrete storage: the
//! transport layer extracts credentials, and persistence sits behind [`AuthStore`].

pub mod error;
pub mod openapi;
pub mod password;
pub mod service;
pub mod session;
pub mod store;
pub mod token;
pub mod user;

pub use error::AuthError;
pub use password::PasswordHasher;
pub use service::{AuthService, ClientMeta, SignIn, SignUp, SignedSession};
pub use session::{AuthSession, DEFAULT_SESSION_TTL_SECS, Session, default_session_ttl};
pub use store::{AuthStore, AuthStoreError, StoredCredentials};
pub use token::TokenSigner;
pub use user::{User, normalize_email};
