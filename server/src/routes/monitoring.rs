use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use srxsync::{
    DivergentFile, MonitoringStats, PassRecord, PassTrigger, ReconciliationResult, RemoteFile,
    RemoteProject,
};

use super::ApiResponse;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

const DEFAULT_HISTORY_LIMIT: usize = 20;

#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    pub enabled: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct CheckQuery {
    #[serde(default)]
    pub background: bool,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DivergentReport {
    pub count: usize,
    pub files: Vec<DivergentFile>,
    pub errors: Vec<String>,
}

fn pass_response(result: ReconciliationResult) -> Json<ApiResponse<ReconciliationResult>> {
    let message = match result.errors.first() {
        Some(first) if result.total_candidates == 0 => first.clone(),
        _ => result.summary(),
    };
    Json(ApiResponse::with_outcome(result.is_success(), message, result))
}

pub async fn status(State(state): State<Arc<AppState>>) -> Json<ApiResponse<MonitoringStats>> {
    let stats = state.status.stats();
    let message = format!(
        "Monitoring is {}",
        if stats.is_enabled { "enabled" } else { "disabled" }
    );
    Json(ApiResponse::ok(message, stats))
}

pub async fn toggle(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ToggleRequest>,
) -> Json<ApiResponse<MonitoringStats>> {
    state.status.set_enabled(request.enabled);
    let message = format!(
        "Monitoring {}",
        if request.enabled { "enabled" } else { "disabled" }
    );
    Json(ApiResponse::ok(message, state.status.stats()))
}

/// Runs a monitoring pass now. Subject to the monitoring flag.
///
/// With `?background=true` the pass is handed to the scheduler instead and
/// the response returns immediately without a result.
pub async fn check(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CheckQuery>,
) -> Result<Json<ApiResponse<ReconciliationResult>>, ApiError> {
    if !query.background {
        return Ok(pass_response(state.monitoring.run_pass(PassTrigger::Manual).await));
    }

    state
        .trigger_tx
        .send(())
        .map_err(|_| ApiError::Conflict("Scheduler is not running".to_string()))?;
    Ok(Json(ApiResponse {
        success: true,
        message: "Monitoring pass queued".to_string(),
        data: None,
    }))
}

pub async fn list_projects(State(state): State<Arc<AppState>>) -> ApiResult<Vec<RemoteProject>> {
    let projects = state.reconciler.target_projects(state.group_id()).await?;
    let message = format!(
        "Found {} projects in group {}",
        projects.len(),
        state.config.project_group_label
    );
    Ok(Json(ApiResponse::ok(message, projects)))
}

pub async fn list_files(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<u64>,
) -> ApiResult<Vec<RemoteFile>> {
    let files = state.reconciler.inventory().list_files(project_id).await?;
    let message = format!("Found {} XML files in project {}", files.len(), project_id);
    Ok(Json(ApiResponse::ok(message, files)))
}

pub async fn configure_project(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<u64>,
) -> Json<ApiResponse<ReconciliationResult>> {
    pass_response(state.reconciler.reconcile_project(project_id).await)
}

pub async fn configure_all(
    State(state): State<Arc<AppState>>,
) -> Json<ApiResponse<ReconciliationResult>> {
    pass_response(state.reconciler.reconcile_group(state.group_id()).await)
}

pub async fn divergent(State(state): State<Arc<AppState>>) -> ApiResult<DivergentReport> {
    let report = state
        .reconciler
        .check_divergent_files(state.group_id())
        .await?;
    let success = report.is_success();
    let message = match report.errors.len() {
        0 => format!("{} files need configuration", report.files.len()),
        skipped => format!(
            "{} files need configuration; {} projects could not be inspected",
            report.files.len(),
            skipped
        ),
    };
    Ok(Json(ApiResponse::with_outcome(
        success,
        message,
        DivergentReport {
            count: report.files.len(),
            files: report.files,
            errors: report.errors,
        },
    )))
}

pub async fn history(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Vec<PassRecord>> {
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    if limit == 0 {
        return Err(ApiError::BadRequest("limit must be at least 1".to_string()));
    }
    let records = state.status.history(limit);
    let message = format!("{} passes", records.len());
    Ok(Json(ApiResponse::ok(message, records)))
}
