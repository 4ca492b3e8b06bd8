//! HTTP API: contract-driven procedures, transport adapters, and session gating.

pub mod app;
pub mod config;
pub mod context;
pub mod middleware;
pub mod rpc;
pub mod session;
