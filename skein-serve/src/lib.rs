//! HTTP server for skein (spec §6.1): thin axum glue over [`skein::Orchestrator`].
//!
//! Grounded on `serve::app` (axum `Router` + `AppState` built once and shared via
//! `with_state`), restated here as plain JSON REST routes rather than the teacher's
//! WebSocket upgrade, since spec §6.1 describes request/response operations, not a streaming
//! protocol.

mod app;
mod error;
mod routes;

pub use app::{router, AppState};
