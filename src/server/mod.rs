//! Axum-based HTTP server for the diary edge API.
//!
//! Requests pass through CORS, admission control and JSON validation before
//! being dispatched to the link-preview or AI handlers. Every failure is
//! rendered as `{ "error": ..., "code": ... }`.
//!
//! # Components
//!
//! - `handlers`: Implementation of individual API endpoints.
//! - `middleware`: CORS, admission control, request IDs, metrics and the panic safety net.
//! - `routes`: The router configuration that ties everything together.

mod handlers;
mod middleware;
mod routes;

pub use middleware::client_id;
pub use routes::{create_router, AppState};
