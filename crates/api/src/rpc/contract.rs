//! Operation contracts: what each procedure accepts, returns and where it
//! lives over HTTP.

use std::collections::BTreeMap;
use std::fmt;

use axum::http::Method;

use super::schema::{Schema, StringFormat, field};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Lowercase key used by OpenAPI path items.
    pub fn openapi_key(self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Patch => "patch",
            HttpMethod::Delete => "delete",
        }
    }

    /// Whether input travels in the request body rather than the query string.
    pub fn has_body(self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }

    pub fn from_http(method: &Method) -> Option<Self> {
        match *method {
            Method::GET => Some(HttpMethod::Get),
            Method::POST => Some(HttpMethod::Post),
            Method::PUT => Some(HttpMethod::Put),
            Method::PATCH => Some(HttpMethod::Patch),
            Method::DELETE => Some(HttpMethod::Delete),
            _ => None,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContractEntry {
    /// Dotted operation name, e.g. `todo.list`.
    pub name: &'static str,
    pub method: HttpMethod,
    /// REST path relative to the `/api` mount.
    pub path: &'static str,
    pub summary: &'static str,
    pub input: Option<Schema>,
    pub output: Schema,
}

impl ContractEntry {
    /// Path segment used by the RPC adapter: `todo.list` -> `todo/list`.
    pub fn rpc_path(&self) -> String {
        self.name.replace('.', "/")
    }
}

/// Immutable set of operation contracts, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct Contract {
    entries: BTreeMap<&'static str, ContractEntry>,
}

impl Contract {
    pub fn new(entries: impl IntoIterator<Item = ContractEntry>) -> Self {
        Self {
            entries: entries.into_iter().map(|e| (e.name, e)).collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ContractEntry> {
        self.entries.get(name)
    }

    /// Entries in name order.
    pub fn entries(&self) -> impl Iterator<Item = &ContractEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entry whose method and path match exactly.
    pub fn match_rest(&self, method: HttpMethod, path: &str) -> Option<&ContractEntry> {
        let path = normalize_path(path);
        self.entries
            .values()
            .find(|e| e.method == method && e.path == path)
    }

    pub fn match_rpc(&self, rpc_path: &str) -> Option<&ContractEntry> {
        let rpc_path = rpc_path.trim_matches('/');
        self.entries.values().find(|e| e.rpc_path() == rpc_path)
    }
}

fn normalize_path(path: &str) -> &str {
    match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    }
}

pub fn todo_schema() -> Schema {
    Schema::named(
        "Todo",
        Schema::object([
            field("id", Schema::string().format(StringFormat::Uuid)),
            field("title", Schema::string().min_length(1).max_length(255)),
            field("completed", Schema::boolean()),
            field("userId", Schema::string().format(StringFormat::Uuid)),
            field("createdAt", Schema::string().format(StringFormat::DateTime)),
        ]),
    )
}

pub fn create_todo_input() -> Schema {
    Schema::object([field("title", Schema::string().min_length(1).max_length(255))])
}

/// The todo feature's operations.
pub fn todo_contract() -> Contract {
    Contract::new([
        ContractEntry {
            name: "todo.list",
            method: HttpMethod::Get,
            path: "/todos",
            summary: "List todos",
            input: None,
            output: Schema::array(todo_schema()),
        },
        ContractEntry {
            name: "todo.create",
            method: HttpMethod::Post,
            path: "/todos",
            summary: "Create a todo",
            input: Some(create_todo_input()),
            output: todo_schema(),
        },
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rest_matching_is_by_method_and_path() {
        let contract = todo_contract();
        assert_eq!(
            contract.match_rest(HttpMethod::Get, "/todos").map(|e| e.name),
            Some("todo.list")
        );
        assert_eq!(
            contract.match_rest(HttpMethod::Post, "/todos/").map(|e| e.name),
            Some("todo.create")
        );
        assert!(contract.match_rest(HttpMethod::Delete, "/todos").is_none());
        assert!(contract.match_rest(HttpMethod::Get, "/unknown-path").is_none());
    }

    #[test]
    fn rpc_paths_follow_dotted_names() {
        let contract = todo_contract();
        assert_eq!(contract.match_rpc("todo/create").map(|e| e.name), Some("todo.create"));
        assert_eq!(contract.match_rpc("/todo/list/").map(|e| e.name), Some("todo.list"));
        assert!(contract.match_rpc("todo").is_none());
    }

    #[test]
    fn body_methods() {
        assert!(HttpMethod::Post.has_body());
        assert!(!HttpMethod::Get.has_body());
        assert!(!HttpMethod::Delete.has_body());
        assert_eq!(HttpMethod::from_http(&Method::PATCH), Some(HttpMethod::Patch));
        assert_eq!(HttpMethod::from_http(&Method::OPTIONS), None);
    }
}
