use axum::{Router, routing::get};

pub mod auth;
pub mod openapi;
pub mod pages;
pub mod rest;
pub mod rpc;
pub mod system;

/// Routes under `/api`. Contract-driven REST paths are served by the app
/// fallback (see [`rest::handle`]), not registered here.
pub fn api_router() -> Router {
    Router::new()
        .route("/openapi", get(openapi::document))
        .route("/rpc/*path", get(rpc::handle).post(rpc::handle))
        .nest("/auth", auth::router())
}
