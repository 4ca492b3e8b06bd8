//! Minimal page routes behind the cookie gate.

use std::sync::Arc;

use axum::{
    Router,
    extract::Extension,
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};

use crate::app::errors::json_error;
use crate::app::services::AppServices;
use crate::middleware::page_gate;
use crate::session::{SessionProvider, expired_session_cookie};

pub fn router() -> Router {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/dashboard/*rest", get(dashboard))
        .route("/sign-in", get(sign_in))
        .route("/sign-up", get(sign_up))
        .layer(axum::middleware::from_fn(page_gate))
}

pub async fn dashboard(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
) -> Response {
    match SessionProvider::get_session(services.auth.as_ref(), &headers).await {
        Ok(Some(session)) => Html(format!(
            "<!doctype html><title>Dashboard</title><h1>Welcome, {}</h1>",
            escape_html(&session.user.name)
        ))
        .into_response(),
        // A stale cookie would bounce between the gates forever; drop it.
        Ok(None) => (
            [(
                header::SET_COOKIE,
                expired_session_cookie(services.config.secure_cookies()),
            )],
            Redirect::temporary("/sign-in"),
        )
            .into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "session lookup failed");
            json_error(StatusCode::BAD_GATEWAY, "UPSTREAM_FAILURE", e.to_string())
        }
    }
}

pub async fn sign_in(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
) -> Response {
    auth_page(&services, &headers, "Sign in").await
}

pub async fn sign_up(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
) -> Response {
    auth_page(&services, &headers, "Sign up").await
}

async fn auth_page(services: &AppServices, headers: &HeaderMap, title: &str) -> Response {
    if let Ok(Some(_)) = SessionProvider::get_session(services.auth.as_ref(), headers).await {
        return Redirect::temporary("/dashboard").into_response();
    }
    Html(format!("<!doctype html><title>{title}</title><h1>{title}</h1>")).into_response()
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_escaped() {
        assert_eq!(
            escape_html("<b>Tom & \"Jerry\"</b>"),
            "&lt;b&gt;Tom &amp; &quot;Jerry&quot;&lt;/b&gt;"
        );
    }
}
