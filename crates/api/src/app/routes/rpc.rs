//! RPC adapter: `/api/rpc/<operation path>` with `{"json": ...}` envelopes.

use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{Extension, Path, Query, rejection::QueryRejection},
    http::{HeaderMap, Method},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::app::services::AppServices;
use crate::context::RequestContext;
use crate::rpc::RpcError;

#[derive(Debug, Deserialize)]
pub struct RpcQuery {
    data: Option<String>,
}

pub async fn handle(
    Extension(services): Extension<Arc<AppServices>>,
    Path(path): Path<String>,
    method: Method,
    query: Result<Query<RpcQuery>, QueryRejection>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(entry) = services.router.match_rpc(&path) else {
        tracing::debug!(path = %path, "unknown rpc operation");
        return error_envelope(RpcError::not_found("Not found"));
    };

    let envelope = if method == Method::GET {
        match query {
            Ok(Query(query)) => query_envelope(query.data.as_deref()),
            Err(rejection) => Err(RpcError::malformed_input(rejection.body_text())),
        }
    } else {
        body_envelope(&body)
    };
    let input = match envelope {
        Ok(input) => input,
        Err(e) => return error_envelope(e),
    };

    match services
        .router
        .invoke(entry.name, RequestContext::new(headers), input)
        .await
    {
        Ok(output) => Json(json!({ "json": output })).into_response(),
        Err(e) => error_envelope(e),
    }
}

fn error_envelope(err: RpcError) -> Response {
    let mut body = err.to_json();
    body["defined"] = Value::Bool(false);
    (err.status(), Json(json!({ "json": body }))).into_response()
}

fn body_envelope(body: &Bytes) -> Result<Value, RpcError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    let envelope: Value = serde_json::from_slice(body)
        .map_err(|e| RpcError::malformed_input(format!("request body is not valid JSON: {e}")))?;
    unwrap_envelope(envelope)
}

fn query_envelope(data: Option<&str>) -> Result<Value, RpcError> {
    let Some(data) = data.filter(|d| !d.is_empty()) else {
        return Ok(Value::Null);
    };
    let envelope: Value = serde_json::from_str(data)
        .map_err(|e| RpcError::malformed_input(format!("data parameter is not valid JSON: {e}")))?;
    unwrap_envelope(envelope)
}

fn unwrap_envelope(envelope: Value) -> Result<Value, RpcError> {
    match envelope {
        Value::Object(mut map) => Ok(map.remove("json").unwrap_or(Value::Null)),
        Value::Null => Ok(Value::Null),
        _ => Err(RpcError::malformed_input("expected a {\"json\": ...} envelope")),
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::*;

    #[test]
    fn envelopes_are_unwrapped() {
        assert_eq!(
            body_envelope(&Bytes::from_static(br#"{"json":{"title":"x"}}"#)).unwrap(),
            json!({ "title": "x" })
        );
        assert!(body_envelope(&Bytes::new()).unwrap().is_null());
        assert!(body_envelope(&Bytes::from_static(b"{}")).unwrap().is_null());
        assert_eq!(
            query_envelope(Some(r#"{"json":{"title":"y"}}"#)).unwrap(),
            json!({ "title": "y" })
        );
        assert!(query_envelope(None).unwrap().is_null());
    }

    #[test]
    fn non_object_envelopes_are_rejected() {
        assert!(body_envelope(&Bytes::from_static(b"[1]")).is_err());
        assert!(query_envelope(Some("not json")).is_err());
    }

    #[test]
    fn errors_are_wrapped_as_undefined() {
        let response = error_envelope(RpcError::unauthorized("nope"));
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
