use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use ironstart_auth::AuthError;

/// Error body in the same `{code, status, message}` shape procedures use.
pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "code": code,
            "status": status.as_u16(),
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn auth_error_to_response(err: AuthError) -> axum::response::Response {
    match err {
        AuthError::InvalidEmail
        | AuthError::InvalidName
        | AuthError::PasswordTooShort { .. }
        | AuthError::PasswordTooLong { .. } => {
            json_error(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", err.to_string())
        }
        AuthError::UserAlreadyExists => json_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "USER_ALREADY_EXISTS",
            err.to_string(),
        ),
        AuthError::InvalidCredentials => {
            json_error(StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS", err.to_string())
        }
        AuthError::Hashing(msg) => {
            tracing::error!(error = %msg, "password hashing task failed");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_SERVER_ERROR",
                "internal error",
            )
        }
        AuthError::Store(e) => {
            tracing::warn!(error = %e, "auth store failure");
            json_error(StatusCode::BAD_GATEWAY, "UPSTREAM_FAILURE", e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use ironstart_auth::AuthStoreError;

    use super::*;

    #[test]
    fn auth_errors_map_to_statuses() {
        let cases = [
            (AuthError::InvalidEmail, StatusCode::BAD_REQUEST),
            (AuthError::PasswordTooShort { min: 8 }, StatusCode::BAD_REQUEST),
            (AuthError::UserAlreadyExists, StatusCode::UNPROCESSABLE_ENTITY),
            (AuthError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (
                AuthError::Hashing("task panicked".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                AuthError::Store(AuthStoreError::Unavailable("down".into())),
                StatusCode::BAD_GATEWAY,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(auth_error_to_response(err).status(), status);
        }
    }
}
