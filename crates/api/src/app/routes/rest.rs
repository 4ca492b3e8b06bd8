//! REST adapter: matches method + path under `/api` against the contract.

use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{Extension, Query},
    http::{HeaderMap, Method, Uri},
    response::{IntoResponse, Response},
};
use serde_json::{Map, Value};

use crate::app::services::AppServices;
use crate::context::RequestContext;
use crate::rpc::{HttpMethod, RpcError, Schema};

const MOUNT: &str = "/api";

/// Mounted as the app's fallback so unmatched `/api/...` paths get a JSON 404.
pub async fn handle(
    Extension(services): Extension<Arc<AppServices>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(path) = api_path(uri.path()) else {
        return not_found();
    };
    let entry = HttpMethod::from_http(&method).and_then(|m| services.router.match_rest(m, path));
    let Some(entry) = entry else {
        tracing::debug!(%method, path = uri.path(), "no operation matches");
        return not_found();
    };

    let input = if entry.method.has_body() {
        body_input(&body)
    } else {
        query_input(&uri, entry.input.as_ref())
    };
    let input = match input {
        Ok(input) => input,
        Err(e) => return e.into_response(),
    };

    match services
        .router
        .invoke(entry.name, RequestContext::new(headers), input)
        .await
    {
        Ok(output) => Json(output).into_response(),
        Err(e) => e.into_response(),
    }
}

fn not_found() -> Response {
    RpcError::not_found("Not found").into_response()
}

/// Path relative to the `/api` mount, if the request is under it.
fn api_path(path: &str) -> Option<&str> {
    let rest = path.strip_prefix(MOUNT)?;
    match rest {
        "" => Some("/"),
        _ if rest.starts_with('/') => Some(rest),
        _ => None,
    }
}

fn body_input(body: &Bytes) -> Result<Value, RpcError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body)
        .map_err(|e| RpcError::malformed_input(format!("request body is not valid JSON: {e}")))
}

/// Query pairs as a JSON object, coerced per the input schema. Repeated keys
/// collect into arrays.
fn query_input(uri: &Uri, schema: Option<&Schema>) -> Result<Value, RpcError> {
    let Some(schema) = schema else {
        return Ok(Value::Null);
    };
    let Query(pairs) = Query::<Vec<(String, String)>>::try_from_uri(uri)
        .map_err(|e| RpcError::malformed_input(format!("invalid query string: {e}")))?;

    let mut object = Map::new();
    for (key, value) in pairs {
        match object.get_mut(&key) {
            Some(Value::Array(values)) => values.push(Value::String(value)),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, Value::String(value)]);
            }
            None => {
                object.insert(key, Value::String(value));
            }
        }
    }
    Ok(schema.coerce(Value::Object(object)))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::rpc::schema::field;

    #[test]
    fn only_paths_under_the_mount_are_considered() {
        assert_eq!(api_path("/api/todos"), Some("/todos"));
        assert_eq!(api_path("/api"), Some("/"));
        assert_eq!(api_path("/apitodos"), None);
        assert_eq!(api_path("/todos"), None);
    }

    #[test]
    fn query_strings_are_coerced_by_schema() {
        let schema = Schema::object([
            field("done", Schema::boolean()),
            field("tag", Schema::array(Schema::string())),
        ]);
        let uri: Uri = "/api/todos?done=false&tag=a&tag=b&other=1".parse().unwrap();
        let input = query_input(&uri, Some(&schema)).unwrap();
        assert_eq!(input, json!({ "done": false, "tag": ["a", "b"], "other": "1" }));
        assert!(query_input(&uri, None).unwrap().is_null());
    }

    #[test]
    fn empty_bodies_are_null_and_bad_json_is_rejected() {
        assert!(body_input(&Bytes::from_static(b"  ")).unwrap().is_null());
        assert_eq!(
            body_input(&Bytes::from_static(br#"{"title":"x"}"#)).unwrap(),
            json!({ "title": "x" })
        );
        assert!(body_input(&Bytes::from_static(b"{nope")).is_err());
    }
}
