//! Session lookup from request headers (cookie or bearer token).

use async_trait::async_trait;
use axum::http::{HeaderMap, HeaderValue, header};
use chrono::Utc;
use thiserror::Error;

use ironstart_auth::{AuthError, AuthService, AuthSession, AuthStore, ClientMeta};

pub const SESSION_COOKIE: &str = "ironstart.session_token";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionProviderError {
    #[error("session provider unavailable: {0}")]
    Unavailable(String),
}

/// Resolves request headers to an authenticated session, if any.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn get_session(
        &self,
        headers: &HeaderMap,
    ) -> Result<Option<AuthSession>, SessionProviderError>;
}

#[async_trait]
impl<S: AuthStore> SessionProvider for AuthService<S> {
    async fn get_session(
        &self,
        headers: &HeaderMap,
    ) -> Result<Option<AuthSession>, SessionProviderError> {
        let Some(token) = session_token(headers) else {
            return Ok(None);
        };
        AuthService::get_session(self, token, Utc::now())
            .await
            .map_err(|e| match e {
                AuthError::Store(e) => SessionProviderError::Unavailable(e.to_string()),
                other => SessionProviderError::Unavailable(other.to_string()),
            })
    }
}

/// The signed session token carried by the request: cookie first, then bearer.
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    cookie_value(headers, SESSION_COOKIE).or_else(|| bearer_token(headers))
}

/// Cheap presence check used by the page gate; does not validate anything.
pub fn has_session_cookie(headers: &HeaderMap) -> bool {
    cookie_value(headers, SESSION_COOKIE).is_some()
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, v)| *k == name && !v.is_empty())
        .map(|(_, v)| v)
}

pub fn client_meta(headers: &HeaderMap) -> ClientMeta {
    let header_str = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    ClientMeta {
        ip_address: header_str("x-forwarded-for")
            .and_then(|v| v.split(',').next())
            .map(|v| v.trim().to_string()),
        user_agent: header_str(header::USER_AGENT.as_str()).map(str::to_string),
    }
}

/// `Set-Cookie` value carrying a signed session token.
pub fn session_cookie(signed_token: &str, max_age_secs: i64, secure: bool) -> Option<HeaderValue> {
    let mut cookie = format!(
        "{SESSION_COOKIE}={signed_token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie).ok()
}

/// `Set-Cookie` value that removes the session cookie.
pub fn expired_session_cookie(secure: bool) -> HeaderValue {
    let cookie = if secure {
        format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0; Secure")
    } else {
        format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
    };
    HeaderValue::from_str(&cookie).unwrap_or_else(|_| HeaderValue::from_static(""))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (k, v) in pairs {
            map.append(*k, HeaderValue::from_str(v).unwrap());
        }
        map
    }

    #[test]
    fn cookie_is_found_among_others() {
        let h = headers(&[("cookie", "theme=dark; ironstart.session_token=abc.sig; other=1")]);
        assert_eq!(session_token(&h), Some("abc.sig"));
        assert!(has_session_cookie(&h));
    }

    #[test]
    fn bearer_is_used_when_no_cookie() {
        let h = headers(&[("authorization", "Bearer tok.sig")]);
        assert_eq!(session_token(&h), Some("tok.sig"));
        assert!(!has_session_cookie(&h));
    }

    #[test]
    fn cookie_wins_over_bearer() {
        let h = headers(&[
            ("authorization", "Bearer from-header"),
            ("cookie", "ironstart.session_token=from-cookie"),
        ]);
        assert_eq!(session_token(&h), Some("from-cookie"));
    }

    #[test]
    fn empty_or_malformed_credentials_are_ignored() {
        let h = headers(&[
            ("authorization", "Basic dXNlcjpwYXNz"),
            ("cookie", "ironstart.session_token="),
        ]);
        assert_eq!(session_token(&h), None);
        assert_eq!(session_token(&headers(&[("authorization", "Bearer   ")])), None);
    }

    #[test]
    fn client_meta_takes_first_forwarded_address() {
        let h = headers(&[
            ("x-forwarded-for", "203.0.113.7, 10.0.0.1"),
            ("user-agent", "curl/8"),
        ]);
        let meta = client_meta(&h);
        assert_eq!(meta.ip_address.as_deref(), Some("203.0.113.7"));
        assert_eq!(meta.user_agent.as_deref(), Some("curl/8"));
    }

    #[test]
    fn cookie_flags() {
        let c = session_cookie("t.s", 60, true).unwrap();
        let c = c.to_str().unwrap();
        assert!(c.starts_with("ironstart.session_token=t.s;"));
        assert!(c.contains("HttpOnly"));
        assert!(c.contains("Max-Age=60"));
        assert!(c.ends_with("Secure"));
        assert!(expired_session_cookie(false).to_str().unwrap().contains("Max-Age=0"));
    }
}
