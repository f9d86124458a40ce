//! Maps [`skein::OrchestratorError`] onto the status codes spec §6.1 assigns to `POST /chat`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use skein::OrchestratorError;

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

pub(crate) struct ApiError(pub OrchestratorError);

impl From<OrchestratorError> for ApiError {
    fn from(e: OrchestratorError) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            OrchestratorError::Validation(_) => StatusCode::BAD_REQUEST,
            OrchestratorError::ConcurrentTurn => StatusCode::CONFLICT,
            OrchestratorError::Overloaded => StatusCode::TOO_MANY_REQUESTS,
            OrchestratorError::CheckpointUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
            OrchestratorError::Timeout => StatusCode::GATEWAY_TIMEOUT,
        };
        (status, Json(ErrorBody { error: self.0.to_string() })).into_response()
    }
}
