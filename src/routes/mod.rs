// HTTP routes: JSON relays onto the snapshot and statistics stores

mod error;
mod http;

use axum::{
    Router,
    routing::{get, post},
};
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};

use crate::config::RequestConfig;
use crate::storage::{Database, SnapshotStore, StatisticsStore};

pub use error::ApiError;
pub use http::{
    AgentInformationRequest, AgentInformationResponse, InfoType, SchedulerInformationRequest,
    SchedulerInformationResponse,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) snapshots: SnapshotStore,
    pub(crate) statistics: StatisticsStore,
    /// Deadline applied to every storage call.
    pub(crate) request_timeout: Duration,
}

pub fn app(db: &Database, requests: &RequestConfig) -> Router {
    let state = AppState {
        snapshots: db.snapshots(),
        statistics: db.statistics(),
        request_timeout: Duration::from_secs(requests.timeout_secs),
    };
    Router::new()
        .route("/version", get(http::version_handler)) // GET /version
        .route("/api/snapshots", post(http::insert_snapshot)) // POST /api/snapshots
        .route("/api/snapshots/query", post(http::query_snapshots)) // POST /api/snapshots/query
        .route("/api/statistics", post(http::insert_statistics)) // POST /api/statistics
        .route("/api/statistics/query", post(http::query_statistics)) // POST /api/statistics/query
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
