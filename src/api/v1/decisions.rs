//! Decision endpoints: synchronous runs and background processes

use std::str::FromStr;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;

use crate::api::state::AppState;
use crate::api::types::{
    ApiError, CleanupQueryParams, CleanupResponse, DecisionRequest, DecisionResponse, Json,
    ProcessResponse, ProcessStartResponse, ProcessesListResponse, ProcessesQueryParams,
    RunQueryParams,
};
use crate::domain::process::{ProcessStats, ProcessStatus};

/// POST /api/v1/decisions/run - Run the workflow and wait for the decision
pub async fn run_decision(
    State(state): State<AppState>,
    Query(params): Query<RunQueryParams>,
    Json(request): Json<DecisionRequest>,
) -> Result<Json<DecisionResponse>, ApiError> {
    let run = state
        .decision_service
        .run(&request.decision_query)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(DecisionResponse::from_run(&run, params.include_history)))
}

/// POST /api/v1/decisions/start - Create a process and run it in the background
pub async fn start_decision(
    State(state): State<AppState>,
    Json(request): Json<DecisionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let manager = &state.process_manager;
    let record = manager
        .create(&request.decision_query)
        .await
        .map_err(ApiError::from)?;

    info!(process_id = %record.process_id(), "Scheduling decision process");
    manager.spawn_execution(record.process_id());

    Ok((
        StatusCode::ACCEPTED,
        Json(ProcessStartResponse::pending(&record)),
    ))
}

/// GET /api/v1/decisions/status/{process_id}
pub async fn get_status(
    State(state): State<AppState>,
    Path(process_id): Path<String>,
) -> Result<Json<ProcessResponse>, ApiError> {
    let record = state
        .process_manager
        .get(&process_id)
        .await
        .map_err(ApiError::from)?;

    match record {
        Some(record) => Ok(Json(ProcessResponse::from(&record))),
        None => Err(ApiError::not_found(format!(
            "Process '{}' not found",
            process_id
        ))),
    }
}

/// GET /api/v1/decisions/processes - List processes, optionally by status
pub async fn list_processes(
    State(state): State<AppState>,
    Query(params): Query<ProcessesQueryParams>,
) -> Result<Json<ProcessesListResponse>, ApiError> {
    let manager = &state.process_manager;

    let records = match params.status.as_deref() {
        Some(raw) => {
            let status = ProcessStatus::from_str(raw).map_err(|_| {
                ApiError::bad_request(format!(
                    "Unknown status '{}'; expected pending, running, completed or failed",
                    raw
                ))
                .with_param("status")
            })?;
            manager.list_by_status(status).await
        }
        None => manager.list_all().await,
    }
    .map_err(ApiError::from)?;

    let stats = manager.get_stats().await.map_err(ApiError::from)?;

    Ok(Json(ProcessesListResponse::new(stats, &records)))
}

/// GET /api/v1/decisions/processes/stats
pub async fn process_stats(State(state): State<AppState>) -> Result<Json<ProcessStats>, ApiError> {
    let stats = state
        .process_manager
        .get_stats()
        .await
        .map_err(ApiError::from)?;

    Ok(Json(stats))
}

/// DELETE /api/v1/decisions/processes/{process_id}
pub async fn delete_process(
    State(state): State<AppState>,
    Path(process_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let deleted = state
        .process_manager
        .delete(&process_id)
        .await
        .map_err(ApiError::from)?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(format!(
            "Process '{}' not found",
            process_id
        )))
    }
}

/// DELETE /api/v1/decisions/cleanup - Remove finished processes older than the threshold
pub async fn cleanup_processes(
    State(state): State<AppState>,
    Query(params): Query<CleanupQueryParams>,
) -> Result<Json<CleanupResponse>, ApiError> {
    let removed = state
        .process_manager
        .cleanup_completed(params.older_than_hours)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(CleanupResponse::success(removed, params.older_than_hours)))
}
