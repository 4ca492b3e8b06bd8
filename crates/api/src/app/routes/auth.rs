//! Email/password auth endpoints, mounted at `/api/auth`.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use serde_json::{Value, json};

use ironstart_auth::{SignIn, SignUp, SignedSession};

use crate::app::errors::{auth_error_to_response, json_error};
use crate::app::services::AppServices;
use crate::session::{
    SessionProvider, client_meta, expired_session_cookie, session_cookie, session_token,
};

pub fn router() -> Router {
    Router::new()
        .route("/sign-up/email", post(sign_up_email))
        .route("/sign-in/email", post(sign_in_email))
        .route("/sign-out", post(sign_out))
        .route("/get-session", get(get_session))
}

pub async fn sign_up_email(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
    body: Result<Json<SignUp>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return json_error(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.body_text()),
    };
    match services
        .auth
        .sign_up_email(body, client_meta(&headers), Utc::now())
        .await
    {
        Ok(signed) => signed_in_response(&services, signed),
        Err(e) => auth_error_to_response(e),
    }
}

pub async fn sign_in_email(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
    body: Result<Json<SignIn>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return json_error(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.body_text()),
    };
    match services
        .auth
        .sign_in_email(body, client_meta(&headers), Utc::now())
        .await
    {
        Ok(signed) => signed_in_response(&services, signed),
        Err(e) => auth_error_to_response(e),
    }
}

pub async fn sign_out(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
) -> Response {
    if let Some(token) = session_token(&headers) {
        if let Err(e) = services.auth.sign_out(token).await {
            return auth_error_to_response(e);
        }
    }

    let mut response = Json(json!({ "success": true })).into_response();
    response.headers_mut().insert(
        header::SET_COOKIE,
        expired_session_cookie(services.config.secure_cookies()),
    );
    response
}

pub async fn get_session(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
) -> Response {
    match SessionProvider::get_session(services.auth.as_ref(), &headers).await {
        Ok(Some(session)) => Json(session).into_response(),
        Ok(None) => Json(Value::Null).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "session lookup failed");
            json_error(StatusCode::BAD_GATEWAY, "UPSTREAM_FAILURE", e.to_string())
        }
    }
}

fn signed_in_response(services: &AppServices, signed: SignedSession) -> Response {
    let cookie = session_cookie(
        &signed.token,
        services.auth.session_ttl().num_seconds(),
        services.config.secure_cookies(),
    );
    let mut response = Json(signed).into_response();
    if let Some(cookie) = cookie {
        response.headers_mut().insert(header::SET_COOKIE, cookie);
    }
    response
}
