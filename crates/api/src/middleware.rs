use std::sync::Arc;

use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::context::{AuthedContext, RequestContext};
use crate::rpc::RpcError;
use crate::session::{SessionProvider, has_session_cookie};

pub const UNAUTHORIZED_MESSAGE: &str = "You must be signed in to perform this action.";

/// Rejects calls without a session and attaches the caller's identity.
///
/// Sits in front of every procedure regardless of transport.
#[derive(Clone)]
pub struct AuthGate {
    provider: Arc<dyn SessionProvider>,
}

impl AuthGate {
    pub fn new(provider: Arc<dyn SessionProvider>) -> Self {
        Self { provider }
    }

    pub async fn authenticate(&self, ctx: RequestContext) -> Result<AuthedContext, RpcError> {
        match self.provider.get_session(ctx.headers()).await? {
            Some(session) => Ok(AuthedContext::new(ctx, session)),
            None => {
                tracing::debug!("rejected unauthenticated call");
                Err(RpcError::unauthorized(UNAUTHORIZED_MESSAGE))
            }
        }
    }
}

/// Edge redirect for page routes, based only on whether a session cookie is
/// present. Pages that need a real session check it themselves.
pub async fn page_gate(req: Request, next: Next) -> Response {
    let path = req.uri().path();
    let has_cookie = has_session_cookie(req.headers());

    if !has_cookie && is_under(path, "/dashboard") {
        return Redirect::temporary("/sign-in").into_response();
    }
    if has_cookie && (is_under(path, "/sign-in") || is_under(path, "/sign-up")) {
        return Redirect::temporary("/dashboard").into_response();
    }

    next.run(req).await
}

fn is_under(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use axum::http::{HeaderMap, HeaderValue};
    use chrono::Utc;

    use ironstart_auth::{AuthSession, Session, User};
    use ironstart_core::SessionId;

    use super::*;
    use crate::rpc::ErrorKind;
    use crate::session::SessionProviderError;

    struct Fixed(Option<AuthSession>);

    #[async_trait]
    impl SessionProvider for Fixed {
        async fn get_session(
            &self,
            _headers: &HeaderMap,
        ) -> Result<Option<AuthSession>, SessionProviderError> {
            Ok(self.0.clone())
        }
    }

    struct Down;

    #[async_trait]
    impl SessionProvider for Down {
        async fn get_session(
            &self,
            _headers: &HeaderMap,
        ) -> Result<Option<AuthSession>, SessionProviderError> {
            Err(SessionProviderError::Unavailable("connection refused".into()))
        }
    }

    fn session() -> AuthSession {
        let now = Utc::now();
        let user = User::new("Ada".into(), "ada@example.com".into(), now);
        AuthSession {
            session: Session {
                id: SessionId::new(),
                token: "t".into(),
                user_id: user.id,
                created_at: now,
                expires_at: now + chrono::Duration::hours(1),
                ip_address: None,
                user_agent: None,
            },
            user,
        }
    }

    #[tokio::test]
    async fn missing_session_is_unauthorized() {
        let gate = AuthGate::new(Arc::new(Fixed(None)));
        let err = gate.authenticate(RequestContext::default()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unauthorized);
        assert_eq!(err.message, UNAUTHORIZED_MESSAGE);
    }

    #[tokio::test]
    async fn session_identity_is_attached() {
        let s = session();
        let expected = s.user.id;
        let gate = AuthGate::new(Arc::new(Fixed(Some(s))));

        let mut headers = HeaderMap::new();
        headers.insert("x-test", HeaderValue::from_static("1"));
        let ctx = gate.authenticate(RequestContext::new(headers)).await.unwrap();

        assert_eq!(ctx.user_id(), expected);
        assert_eq!(ctx.session().user.email, "ada@example.com");
        assert!(ctx.headers().contains_key("x-test"));
    }

    #[tokio::test]
    async fn provider_failure_is_upstream() {
        let gate = AuthGate::new(Arc::new(Down));
        let err = gate.authenticate(RequestContext::default()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::UpstreamFailure);
    }

    #[test]
    fn prefix_matching_respects_segments() {
        assert!(is_under("/dashboard", "/dashboard"));
        assert!(is_under("/dashboard/settings", "/dashboard"));
        assert!(!is_under("/dashboards", "/dashboard"));
        assert!(!is_under("/", "/dashboard"));
    }
}
