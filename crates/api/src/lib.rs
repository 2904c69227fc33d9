//! HTTP API for Vurp, the paid-traffic agency workspace.
//!
//! The binary in `main.rs` wires configuration, the pool and the background
//! tasks; integration tests build the same [`router::build_app_router`]
//! against a test database.

pub mod auth;
pub mod background;
pub mod billing;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod query;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
