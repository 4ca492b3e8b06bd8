//! HTTP application wiring (Axum router + service wiring).
//!
//! - `services.rs`: storage, auth service and procedure router
//! - `routes/`: transport adapters, auth endpoints and page stubs
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;

pub mod errors;
pub mod routes;
pub mod services;

pub use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: AppConfig) -> anyhow::Result<Router> {
    let services = Arc::new(services::build_services(config).await?);
    Ok(build_app_with(services))
}

/// Build the router around already-wired services.
pub fn build_app_with(services: Arc<AppServices>) -> Router {
    Router::new()
        .route("/health", get(routes::system::health))
        .route("/api-reference", get(routes::openapi::reference))
        .nest("/api", routes::api_router())
        .merge(routes::pages::router())
        .fallback(routes::rest::handle)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(Extension(services)),
        )
}
