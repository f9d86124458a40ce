//! Axum app: shared state and router (spec §6.1 — the HTTP transport wraps the core's
//! language-native operations; the core itself stays transport-agnostic).

use std::sync::Arc;

use axum::routing::{delete, get, post};
use axum::Router;
use skein::checkpoint::Checkpointer;
use skein::store::Datastore;
use skein::Orchestrator;

use crate::routes;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub checkpointer: Arc<dyn Checkpointer>,
    pub store: Arc<Datastore>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/chat", post(routes::chat))
        .route("/session/:id", get(routes::get_session))
        .route("/session/:id", delete(routes::delete_session))
        .route("/health", get(routes::health))
        .with_state(state)
}
