//! Contract-first procedure layer: schemas, contracts, the guarded router and
//! OpenAPI generation. Transport adapters live in `app::routes`.

use std::sync::Arc;

use ironstart_infra::TodoRepository;

use crate::middleware::AuthGate;
use crate::session::SessionProvider;

pub mod contract;
pub mod error;
pub mod openapi;
pub mod procedure;
pub mod procedures;
pub mod router;
pub mod schema;

pub use contract::{Contract, ContractEntry, HttpMethod, todo_contract};
pub use error::{ErrorKind, RpcError};
pub use openapi::{OpenApiInfo, OpenApiSource, OpenApiSourceError};
pub use procedure::{Handler, Procedure, Typed};
pub use router::{AppRouter, RouterBuildError};
pub use schema::{Issue, Schema};

/// The application's router: todo procedures behind the session gate.
pub fn todo_router(
    repo: Arc<dyn TodoRepository>,
    sessions: Arc<dyn SessionProvider>,
) -> Result<AppRouter, RouterBuildError> {
    AppRouter::builder(todo_contract())
        .procedure(
            "todo.list",
            Typed(procedures::todo::ListTodos { repo: repo.clone() }),
        )
        .procedure("todo.create", Typed(procedures::todo::CreateTodo { repo }))
        .build(AuthGate::new(sessions))
}
