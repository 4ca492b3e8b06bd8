use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::context::AuthedContext;
use crate::rpc::error::RpcError;

/// Typed procedure logic. Runs only after the caller is authenticated and
/// the input has passed its schema.
#[async_trait]
pub trait Handler: Send + Sync + 'static {
    type Input: DeserializeOwned + Send;
    type Output: Serialize + Send;

    async fn handle(
        &self,
        ctx: &AuthedContext,
        input: Self::Input,
    ) -> Result<Self::Output, RpcError>;
}

/// Type-erased procedure, as stored in the router.
#[async_trait]
pub trait Procedure: Send + Sync {
    async fn call(&self, ctx: &AuthedContext, input: Value) -> Result<Value, RpcError>;
}

/// Adapts a typed [`Handler`] to the JSON-in/JSON-out [`Procedure`] shape.
pub struct Typed<H>(pub H);

#[async_trait]
impl<H: Handler> Procedure for Typed<H> {
    async fn call(&self, ctx: &AuthedContext, input: Value) -> Result<Value, RpcError> {
        let input: H::Input = serde_json::from_value(input)
            .map_err(|e| RpcError::malformed_input(format!("invalid input: {e}")))?;
        let output = self.0.handle(ctx, input).await?;
        serde_json::to_value(output).map_err(|e| {
            tracing::error!(error = %e, "procedure output failed to serialize");
            RpcError::internal("failed to serialize output")
        })
    }
}
