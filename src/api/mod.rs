//! HTTP API
//!
//! - `POST /chat` - body `{"message": "..."}`, reply `{"reply": "..."}`
//!
//! Errors are returned as `{"error": "..."}` with a 4xx/5xx status.

/// Request handlers.
pub mod handlers;
/// Router configuration and route definitions.
pub mod routes;
