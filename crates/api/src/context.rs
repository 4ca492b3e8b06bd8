use axum::http::HeaderMap;

use ironstart_auth::AuthSession;
use ironstart_core::UserId;

/// Per-request context before authentication.
///
/// Built fresh by each transport adapter and passed explicitly; nothing about
/// the caller is ever read from process-wide state.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    headers: HeaderMap,
}

impl RequestContext {
    pub fn new(headers: HeaderMap) -> Self {
        Self { headers }
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}

/// Request context after the auth gate: the input plus the verified identity.
#[derive(Debug, Clone)]
pub struct AuthedContext {
    request: RequestContext,
    user_id: UserId,
    session: AuthSession,
}

impl AuthedContext {
    pub fn new(request: RequestContext, session: AuthSession) -> Self {
        Self {
            request,
            user_id: session.user_id(),
            session,
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn session(&self) -> &AuthSession {
        &self.session
    }

    pub fn headers(&self) -> &HeaderMap {
        self.request.headers()
    }
}
