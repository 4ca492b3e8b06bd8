use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;

use ironstart_core::DomainError;
use ironstart_infra::TodoStoreError;

use crate::rpc::schema::Issue;
use crate::session::SessionProviderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    Unauthorized,
    ValidationError,
    NotFound,
    UpstreamFailure,
    InternalServerError,
}

impl ErrorKind {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::ValidationError => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::UpstreamFailure => StatusCode::BAD_GATEWAY,
            ErrorKind::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::Unauthorized => "UNAUTHORIZED",
            ErrorKind::ValidationError => "VALIDATION_ERROR",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::UpstreamFailure => "UPSTREAM_FAILURE",
            ErrorKind::InternalServerError => "INTERNAL_SERVER_ERROR",
        }
    }
}

/// Error surfaced by a procedure call, whatever the transport.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{message}")]
pub struct RpcError {
    pub kind: ErrorKind,
    pub message: String,
    pub data: Option<Value>,
}

impl RpcError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            data: None,
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UpstreamFailure, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InternalServerError, message)
    }

    /// Input failed its declared schema.
    pub fn validation(issues: Vec<Issue>) -> Self {
        Self {
            kind: ErrorKind::ValidationError,
            message: "Input validation failed".to_string(),
            data: Some(json!({ "issues": issues })),
        }
    }

    pub fn malformed_input(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ValidationError, message)
    }

    pub fn status(&self) -> StatusCode {
        self.kind.status()
    }

    /// Structured error body shared by both adapters.
    pub fn to_json(&self) -> Value {
        let mut body = json!({
            "code": self.kind.code(),
            "status": self.status().as_u16(),
            "message": self.message,
        });
        if let Some(data) = &self.data {
            body["data"] = data.clone();
        }
        body
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.to_json())).into_response()
    }
}

impl From<TodoStoreError> for RpcError {
    fn from(err: TodoStoreError) -> Self {
        tracing::error!(error = %err, "todo store failure");
        RpcError::upstream(err.to_string())
    }
}

impl From<SessionProviderError> for RpcError {
    fn from(err: SessionProviderError) -> Self {
        tracing::warn!(error = %err, "session lookup failed");
        RpcError::upstream(err.to_string())
    }
}

impl From<DomainError> for RpcError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => {
                RpcError::malformed_input(msg)
            }
        }
    }
}
