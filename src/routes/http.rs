// Handlers: version, record inserts, snapshot/statistics queries

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};

use super::AppState;
use super::error::{ApiError, with_deadline};
use crate::models::{Pagination, Snapshot, StatisticsSample, TimeFilter};

const NAME: &str = env!("CARGO_PKG_NAME");
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerInformationRequest {
    pub scheduler_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_range: Option<TimeFilter>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerInformationResponse {
    pub snapshots: Vec<Snapshot>,
    pub count: u64,
}

/// Which part of each sample an agent query returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InfoType {
    #[default]
    All,
    Cpu,
    Memory,
    Disk,
    Net,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentInformationRequest {
    pub agent_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_range: Option<TimeFilter>,
    #[serde(default, rename = "type")]
    pub info_type: InfoType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentInformationResponse {
    pub stats: Vec<StatisticsSample>,
    pub count: u64,
}

/// GET /version: service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}

/// POST /api/snapshots: store one scheduler run.
pub(super) async fn insert_snapshot(
    State(state): State<AppState>,
    Json(snapshot): Json<Snapshot>,
) -> Result<StatusCode, ApiError> {
    with_deadline(state.request_timeout, state.snapshots.insert(&snapshot)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/statistics: store one agent sample.
pub(super) async fn insert_statistics(
    State(state): State<AppState>,
    Json(sample): Json<StatisticsSample>,
) -> Result<StatusCode, ApiError> {
    with_deadline(state.request_timeout, state.statistics.insert(&sample)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/snapshots/query
pub(super) async fn query_snapshots(
    State(state): State<AppState>,
    Json(rq): Json<SchedulerInformationRequest>,
) -> Result<Json<SchedulerInformationResponse>, ApiError> {
    let page = with_deadline(
        state.request_timeout,
        state.snapshots.query(
            &rq.scheduler_id,
            rq.pagination.as_ref(),
            rq.time_range.as_ref(),
        ),
    )
    .await?;
    Ok(Json(SchedulerInformationResponse {
        snapshots: page.records,
        count: page.total_count,
    }))
}

/// POST /api/statistics/query
pub(super) async fn query_statistics(
    State(state): State<AppState>,
    Json(rq): Json<AgentInformationRequest>,
) -> Result<Json<AgentInformationResponse>, ApiError> {
    let store = &state.statistics;
    let agent_id = rq.agent_id.as_str();
    let pagination = rq.pagination.as_ref();
    let filter = rq.time_range.as_ref();
    let deadline = state.request_timeout;

    let page = match rq.info_type {
        InfoType::All => {
            with_deadline(deadline, store.query_full(agent_id, pagination, filter)).await?
        }
        InfoType::Cpu => {
            with_deadline(deadline, store.query_cpu(agent_id, pagination, filter)).await?
        }
        InfoType::Memory => {
            with_deadline(deadline, store.query_memory(agent_id, pagination, filter)).await?
        }
        InfoType::Disk => {
            with_deadline(deadline, store.query_disk(agent_id, pagination, filter)).await?
        }
        InfoType::Net => {
            with_deadline(deadline, store.query_network(agent_id, pagination, filter)).await?
        }
    };
    Ok(Json(AgentInformationResponse {
        stats: page.records,
        count: page.total_count,
    }))
}
