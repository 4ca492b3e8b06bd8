//! OpenAPI 3.1 document generation from the operation contract.

use async_trait::async_trait;
use serde_json::{Map, Value, json};
use thiserror::Error;

use ironstart_auth::{AuthService, AuthStore};

use crate::rpc::contract::{Contract, ContractEntry};
use crate::rpc::error::RpcError;

/// Prefix the auth provider's own paths are re-keyed under.
pub const AUTH_PREFIX: &str = "/auth";

#[derive(Debug, Clone)]
pub struct OpenApiInfo {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Default for OpenApiInfo {
    fn default() -> Self {
        Self {
            title: "Ironstart API".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            description: "Todo procedures and session authentication".to_string(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("openapi source unavailable: {0}")]
pub struct OpenApiSourceError(pub String);

/// Supplies a secondary OpenAPI document to merge in.
#[async_trait]
pub trait OpenApiSource: Send + Sync {
    async fn fetch(&self) -> Result<Value, OpenApiSourceError>;
}

#[async_trait]
impl<S: AuthStore> OpenApiSource for AuthService<S> {
    async fn fetch(&self) -> Result<Value, OpenApiSourceError> {
        Ok(ironstart_auth::openapi::openapi_document())
    }
}

/// Build the document. Deterministic for a fixed contract and inputs.
pub fn generate(
    contract: &Contract,
    info: &OpenApiInfo,
    servers: &[String],
    secondary: Option<&Value>,
) -> Value {
    let mut schemas = Map::new();
    let mut paths = Map::new();

    for entry in contract.entries() {
        let operation = operation(entry, &mut schemas);
        let item = paths
            .entry(entry.path.to_string())
            .or_insert_with(|| json!({}));
        item[entry.method.openapi_key()] = operation;
    }

    if let Some(doc) = secondary {
        if let Some(extra) = doc.get("paths").and_then(Value::as_object) {
            for (path, item) in extra {
                paths.insert(format!("{AUTH_PREFIX}{path}"), item.clone());
            }
        }
        if let Some(extra) = doc
            .pointer("/components/schemas")
            .and_then(Value::as_object)
        {
            for (name, schema) in extra {
                schemas.entry(name.clone()).or_insert_with(|| schema.clone());
            }
        }
    }

    let servers: Vec<Value> = servers.iter().map(|url| json!({ "url": url })).collect();

    json!({
        "openapi": "3.1.0",
        "info": {
            "title": info.title,
            "version": info.version,
            "description": info.description,
        },
        "servers": servers,
        "security": [{ "bearerAuth": [] }],
        "components": {
            "securitySchemes": {
                "bearerAuth": { "type": "http", "scheme": "bearer" },
            },
            "schemas": schemas,
        },
        "paths": paths,
    })
}

/// Fetch the secondary document and generate. A failed fetch fails the
/// whole generation rather than publishing a document without auth routes.
pub async fn generate_with_source(
    contract: &Contract,
    info: &OpenApiInfo,
    servers: &[String],
    source: &dyn OpenApiSource,
) -> Result<Value, RpcError> {
    let secondary = source.fetch().await.map_err(|e| {
        tracing::warn!(error = %e, "failed to load auth openapi document");
        RpcError::upstream(e.to_string())
    })?;
    if !secondary.get("paths").is_some_and(Value::is_object) {
        tracing::warn!("auth openapi document has no paths");
        return Err(RpcError::upstream("auth openapi document has no paths"));
    }
    Ok(generate(contract, info, servers, Some(&secondary)))
}

fn operation(entry: &ContractEntry, schemas: &mut Map<String, Value>) -> Value {
    let output = entry.output.to_json_schema(schemas);
    let mut op = json!({
        "operationId": entry.name,
        "summary": entry.summary,
        "tags": [tag(entry.name)],
        "responses": {
            "200": {
                "description": "OK",
                "content": { "application/json": { "schema": output } },
            },
            "401": { "description": "Unauthorized" },
        },
    });

    if let Some(input) = &entry.input {
        if entry.method.has_body() {
            op["requestBody"] = json!({
                "required": true,
                "content": { "application/json": { "schema": input.to_json_schema(schemas) } },
            });
        } else if let Some(fields) = input.fields() {
            let params: Vec<Value> = fields
                .iter()
                .map(|f| {
                    json!({
                        "name": f.name,
                        "in": "query",
                        "required": f.required,
                        "schema": f.schema.to_json_schema(schemas),
                    })
                })
                .collect();
            op["parameters"] = Value::Array(params);
        }
        op["responses"]["400"] = json!({ "description": "Input validation failed" });
    }

    op
}

fn tag(name: &str) -> String {
    let group = name.split('.').next().unwrap_or(name);
    let mut chars = group.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
