// Store errors -> HTTP responses, and the per-call deadline.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::future::Future;
use std::time::Duration;

use crate::error::{StoreError, StoreResult};

#[derive(Debug)]
pub enum ApiError {
    Store(StoreError),
    DeadlineExceeded(Duration),
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::Store(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Store(e @ (StoreError::InvalidTimestamp(_) | StoreError::Conversion(_))) => {
                (StatusCode::BAD_REQUEST, e.to_string())
            }
            ApiError::Store(e @ StoreError::Storage(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
            ApiError::DeadlineExceeded(d) => (
                StatusCode::GATEWAY_TIMEOUT,
                format!("storage call exceeded {}s deadline", d.as_secs()),
            ),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

/// Runs one storage call under `deadline`. An expired call is dropped, not retried.
pub(super) async fn with_deadline<T>(
    deadline: Duration,
    call: impl Future<Output = StoreResult<T>>,
) -> Result<T, ApiError> {
    match tokio::time::timeout(deadline, call).await {
        Ok(result) => result.map_err(ApiError::from),
        Err(_) => {
            tracing::warn!(deadline_secs = deadline.as_secs(), "storage call timed out");
            Err(ApiError::DeadlineExceeded(deadline))
        }
    }
}
