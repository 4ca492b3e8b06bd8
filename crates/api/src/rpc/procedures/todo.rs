use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;

use ironstart_core::{NewTodo, Todo, TodoTitle};
use ironstart_infra::TodoRepository;

use crate::context::AuthedContext;
use crate::rpc::error::RpcError;
use crate::rpc::procedure::Handler;

pub struct ListTodos {
    pub repo: Arc<dyn TodoRepository>,
}

#[async_trait]
impl Handler for ListTodos {
    type Input = ();
    type Output = Vec<Todo>;

    async fn handle(&self, ctx: &AuthedContext, _input: ()) -> Result<Vec<Todo>, RpcError> {
        Ok(self.repo.list_for(ctx.user_id()).await?)
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateTodoInput {
    pub title: String,
}

pub struct CreateTodo {
    pub repo: Arc<dyn TodoRepository>,
}

#[async_trait]
impl Handler for CreateTodo {
    type Input = CreateTodoInput;
    type Output = Todo;

    async fn handle(&self, ctx: &AuthedContext, input: CreateTodoInput) -> Result<Todo, RpcError> {
        let title = TodoTitle::parse(input.title)?;
        let todo = Todo::create(ctx.user_id(), NewTodo { title }, Utc::now());
        self.repo.append(todo.clone()).await?;
        tracing::debug!(todo_id = %todo.id, user_id = %todo.user_id, "todo created");
        Ok(todo)
    }
}
