//! The procedure registry shared by every transport adapter.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tracing::instrument;

use crate::context::RequestContext;
use crate::middleware::AuthGate;
use crate::rpc::contract::{Contract, ContractEntry, HttpMethod};
use crate::rpc::error::RpcError;
use crate::rpc::procedure::Procedure;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RouterBuildError {
    #[error("no handler registered for operation {0}")]
    MissingHandler(&'static str),

    #[error("handler registered for unknown operation {0}")]
    UnknownOperation(String),
}

/// Operation name -> guarded procedure. Built once at startup, then read-only.
pub struct AppRouter {
    contract: Contract,
    procedures: BTreeMap<&'static str, Arc<dyn Procedure>>,
    gate: AuthGate,
}

pub struct AppRouterBuilder {
    contract: Contract,
    procedures: BTreeMap<String, Arc<dyn Procedure>>,
}

impl AppRouterBuilder {
    pub fn procedure(mut self, name: &str, procedure: impl Procedure + 'static) -> Self {
        self.procedures.insert(name.to_string(), Arc::new(procedure));
        self
    }

    /// Every contract entry needs exactly one handler, and every handler a
    /// contract entry.
    pub fn build(mut self, gate: AuthGate) -> Result<AppRouter, RouterBuildError> {
        let mut procedures = BTreeMap::new();
        for entry in self.contract.entries() {
            let procedure = self
                .procedures
                .remove(entry.name)
                .ok_or(RouterBuildError::MissingHandler(entry.name))?;
            procedures.insert(entry.name, procedure);
        }
        if let Some(name) = self.procedures.into_keys().next() {
            return Err(RouterBuildError::UnknownOperation(name));
        }

        Ok(AppRouter {
            contract: self.contract,
            procedures,
            gate,
        })
    }
}

impl AppRouter {
    pub fn builder(contract: Contract) -> AppRouterBuilder {
        AppRouterBuilder {
            contract,
            procedures: BTreeMap::new(),
        }
    }

    pub fn contract(&self) -> &Contract {
        &self.contract
    }

    pub fn entry(&self, name: &str) -> Option<&ContractEntry> {
        self.contract.get(name)
    }

    pub fn match_rest(&self, method: HttpMethod, path: &str) -> Option<&ContractEntry> {
        self.contract.match_rest(method, path)
    }

    pub fn match_rpc(&self, rpc_path: &str) -> Option<&ContractEntry> {
        self.contract.match_rpc(rpc_path)
    }

    /// Run one operation: auth gate, input schema, handler, output schema.
    #[instrument(name = "rpc.invoke", skip(self, ctx, input))]
    pub async fn invoke(
        &self,
        name: &str,
        ctx: RequestContext,
        input: Value,
    ) -> Result<Value, RpcError> {
        let (Some(entry), Some(procedure)) = (self.contract.get(name), self.procedures.get(name))
        else {
            return Err(RpcError::not_found(format!("unknown operation {name}")));
        };

        let authed = self.gate.authenticate(ctx).await?;

        let input = match &entry.input {
            Some(schema) => schema.parse(input).map_err(|issues| {
                tracing::debug!(issues = issues.len(), "input rejected");
                RpcError::validation(issues)
            })?,
            None => Value::Null,
        };

        let output = procedure.call(&authed, input).await?;

        entry.output.parse(output).map_err(|issues| {
            tracing::error!(?issues, "procedure output does not match its schema");
            RpcError::internal("procedure output does not match its schema")
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use axum::http::{HeaderMap, HeaderValue};
    use chrono::Utc;
    use serde_json::json;

    use ironstart_auth::{AuthSession, Session, User};
    use ironstart_core::{SessionId, UserId};
    use ironstart_infra::{InMemoryTodoRepository, TodoRepository};

    use super::*;
    use crate::context::AuthedContext;
    use crate::rpc::contract::todo_contract;
    use crate::rpc::error::ErrorKind;
    use crate::rpc::todo_router;
    use crate::session::{SessionProvider, SessionProviderError};

    /// Maps the `x-user` header to a session for that user.
    struct HeaderSessions {
        users: Vec<User>,
    }

    #[async_trait]
    impl SessionProvider for HeaderSessions {
        async fn get_session(
            &self,
            headers: &HeaderMap,
        ) -> Result<Option<AuthSession>, SessionProviderError> {
            let Some(email) = headers.get("x-user").and_then(|v| v.to_str().ok()) else {
                return Ok(None);
            };
            let now = Utc::now();
            Ok(self.users.iter().find(|u| u.email == email).map(|user| AuthSession {
                session: Session {
                    id: SessionId::new(),
                    token: "t".into(),
                    user_id: user.id,
                    created_at: now,
                    expires_at: now + chrono::Duration::hours(1),
                    ip_address: None,
                    user_agent: None,
                },
                user: user.clone(),
            }))
        }
    }

    struct Fixture {
        router: AppRouter,
        repo: Arc<InMemoryTodoRepository>,
        alice: UserId,
        bob: UserId,
    }

    fn fixture() -> Fixture {
        let now = Utc::now();
        let alice = User::new("Alice".into(), "alice@example.com".into(), now);
        let bob = User::new("Bob".into(), "bob@example.com".into(), now);
        let (alice_id, bob_id) = (alice.id, bob.id);
        let repo = Arc::new(InMemoryTodoRepository::new());
        let provider = Arc::new(HeaderSessions { users: vec![alice, bob] });
        let router = todo_router(repo.clone(), provider).unwrap();
        Fixture {
            router,
            repo,
            alice: alice_id,
            bob: bob_id,
        }
    }

    fn as_user(email: &'static str) -> RequestContext {
        let mut headers = HeaderMap::new();
        headers.insert("x-user", HeaderValue::from_static(email));
        RequestContext::new(headers)
    }

    struct Counting(Arc<AtomicUsize>);

    #[async_trait]
    impl Procedure for Counting {
        async fn call(&self, _ctx: &AuthedContext, _input: Value) -> Result<Value, RpcError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(json!([]))
        }
    }

    #[tokio::test]
    async fn unauthenticated_calls_never_reach_the_handler() {
        let calls = Arc::new(AtomicUsize::new(0));
        let provider = Arc::new(HeaderSessions { users: vec![] });
        let router = AppRouter::builder(todo_contract())
            .procedure("todo.list", Counting(calls.clone()))
            .procedure("todo.create", Counting(calls.clone()))
            .build(AuthGate::new(provider))
            .unwrap();

        for (op, input) in [("todo.list", Value::Null), ("todo.create", json!({ "title": "x" }))] {
            let err = router
                .invoke(op, RequestContext::default(), input)
                .await
                .unwrap_err();
            assert_eq!(err.kind, ErrorKind::Unauthorized);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn invalid_titles_are_rejected_and_nothing_is_stored() {
        let f = fixture();
        for title in [String::new(), "x".repeat(256)] {
            let err = f
                .router
                .invoke("todo.create", as_user("alice@example.com"), json!({ "title": title }))
                .await
                .unwrap_err();
            assert_eq!(err.kind, ErrorKind::ValidationError);
            assert_eq!(err.data.as_ref().unwrap()["issues"][0]["path"][0], "title");
        }
        assert!(f.repo.list_for(f.alice).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn created_todo_is_listed_for_its_owner() {
        let f = fixture();
        let created = f
            .router
            .invoke("todo.create", as_user("alice@example.com"), json!({ "title": "Build new app" }))
            .await
            .unwrap();
        assert_eq!(created["title"], "Build new app");
        assert_eq!(created["completed"], false);
        assert_eq!(created["userId"], f.alice.to_string());

        let listed = f
            .router
            .invoke("todo.list", as_user("alice@example.com"), Value::Null)
            .await
            .unwrap();
        assert_eq!(listed, json!([created]));
    }

    #[tokio::test]
    async fn partitions_do_not_leak_between_users() {
        let f = fixture();
        f.router
            .invoke("todo.create", as_user("alice@example.com"), json!({ "title": "alice's" }))
            .await
            .unwrap();

        let listed = f
            .router
            .invoke("todo.list", as_user("bob@example.com"), Value::Null)
            .await
            .unwrap();
        assert_eq!(listed, json!([]));
        assert!(f.repo.list_for(f.bob).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_keys_are_stripped_before_the_handler() {
        let f = fixture();
        let created = f
            .router
            .invoke(
                "todo.create",
                as_user("alice@example.com"),
                json!({ "title": "t", "completed": true, "userId": f.bob.to_string() }),
            )
            .await
            .unwrap();
        assert_eq!(created["completed"], false);
        assert_eq!(created["userId"], f.alice.to_string());
    }

    struct Malformed(Arc<AtomicUsize>);

    #[async_trait]
    impl Procedure for Malformed {
        async fn call(&self, _ctx: &AuthedContext, _input: Value) -> Result<Value, RpcError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(json!({ "bogus": 1 }))
        }
    }

    #[tokio::test]
    async fn output_not_matching_its_schema_is_an_internal_error() {
        let calls = Arc::new(AtomicUsize::new(0));
        let alice = User::new("Alice".into(), "alice@example.com".into(), Utc::now());
        let provider = Arc::new(HeaderSessions { users: vec![alice] });
        let router = AppRouter::builder(todo_contract())
            .procedure("todo.list", Malformed(calls.clone()))
            .procedure("todo.create", Counting(Arc::new(AtomicUsize::new(0))))
            .build(AuthGate::new(provider))
            .unwrap();

        let err = router
            .invoke("todo.list", as_user("alice@example.com"), Value::Null)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InternalServerError);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unknown_operation_is_not_found() {
        let f = fixture();
        let err = f
            .router
            .invoke("todo.delete", as_user("alice@example.com"), Value::Null)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[test]
    fn builder_requires_a_handler_per_operation() {
        let provider = Arc::new(HeaderSessions { users: vec![] });
        let calls = Arc::new(AtomicUsize::new(0));

        let missing = AppRouter::builder(todo_contract())
            .procedure("todo.list", Counting(calls.clone()))
            .build(AuthGate::new(provider.clone()));
        assert!(matches!(missing, Err(RouterBuildError::MissingHandler("todo.create"))));

        let extra = AppRouter::builder(todo_contract())
            .procedure("todo.list", Counting(calls.clone()))
            .procedure("todo.create", Counting(calls.clone()))
            .procedure("todo.remove", Counting(calls))
            .build(AuthGate::new(provider));
        assert!(matches!(extra, Err(RouterBuildError::UnknownOperation(name)) if name == "todo.remove"));
    }
}
