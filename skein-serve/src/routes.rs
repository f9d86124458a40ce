//! Request handlers for the four operations spec §6.1 names.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use skein::store::JobState;
use skein::{AgentName, ChatTurnReply, ChatTurnRequest, HealthStatus};

use crate::app::AppState;
use crate::error::ApiError;

#[derive(Deserialize)]
pub(crate) struct ChatRequestBody {
    pub message: String,
    pub user_id: String,
    pub workspace: String,
    pub session_id: String,
}

pub(crate) async fn chat(
    State(state): State<AppState>,
    Json(body): Json<ChatRequestBody>,
) -> Result<Json<ChatTurnReply>, ApiError> {
    let request = ChatTurnRequest {
        session_id: body.session_id,
        user_id: body.user_id,
        workspace: body.workspace,
        user_message: body.message,
    };
    let reply = state.orchestrator.handle_turn(request).await?;
    Ok(Json(reply))
}

/// Session metadata only (spec §6.1: "no messages unless explicitly requested").
#[derive(Serialize)]
pub(crate) struct SessionSummary {
    session_id: String,
    user_id: String,
    workspace: String,
    turn_count: u64,
    current_agent: Option<AgentName>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

pub(crate) async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionSummary>, StatusCode> {
    match state.checkpointer.load(&session_id).await {
        Ok(Some(s)) => Ok(Json(SessionSummary {
            session_id: s.session_id,
            user_id: s.user_id,
            workspace: s.workspace,
            turn_count: s.turn_count,
            current_agent: s.current_agent,
            created_at: s.created_at,
            updated_at: s.updated_at,
        })),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(_) => Err(StatusCode::INTERNAL_SERVER_ERROR),
    }
}

/// Idempotent: deleting an absent session still returns 204.
pub(crate) async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> StatusCode {
    match state.checkpointer.delete(&session_id).await {
        Ok(()) => StatusCode::NO_CONTENT,
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[derive(Serialize)]
pub(crate) struct HealthResponse {
    status: &'static str,
    components: HealthComponents,
}

#[derive(Serialize)]
pub(crate) struct HealthComponents {
    checkpointer: &'static str,
    datastore: &'static str,
    scheduler_jobs: Vec<JobRunView>,
}

#[derive(Serialize)]
pub(crate) struct JobRunView {
    job_name: String,
    last_run_at: Option<DateTime<Utc>>,
    last_status: Option<String>,
}

impl From<JobState> for JobRunView {
    fn from(s: JobState) -> Self {
        JobRunView {
            job_name: s.job_name,
            last_run_at: s.last_run_unix.and_then(|t| DateTime::from_timestamp(t, 0)),
            last_status: s.last_status,
        }
    }
}

pub(crate) async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let checkpointer_status = state.checkpointer.health().await;
    let datastore_status = state.store.health().await;
    let scheduler_jobs = state.store.job_states().await.unwrap_or_default();
    Json(HealthResponse {
        status: label(checkpointer_status.worst(datastore_status)),
        components: HealthComponents {
            checkpointer: label(checkpointer_status),
            datastore: label(datastore_status),
            scheduler_jobs: scheduler_jobs.into_iter().map(JobRunView::from).collect(),
        },
    })
}

fn label(status: HealthStatus) -> &'static str {
    match status {
        HealthStatus::Ok => "ok",
        HealthStatus::Degraded => "degraded",
        HealthStatus::Unavailable => "unavailable",
    }
}
