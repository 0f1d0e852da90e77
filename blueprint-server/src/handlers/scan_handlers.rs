use std::convert::Infallible;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Json};
use blueprint_core::{SelectOutcome, SelectionView};
use blueprint_model::{
    ApiResponse, ContextId, DecisionId, ScanKind, ScanProgressEvent,
    ScanRunId, ScanStatus,
};
use serde::{Deserialize, Serialize};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use tracing::warn;

use crate::errors::HttpError;
use crate::infra::app_state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct StartScanRequest {
    pub context_id: Option<ContextId>,
}

#[derive(Debug, Serialize)]
pub struct ScanStartedResponse {
    pub kind: ScanKind,
    pub run_id: ScanRunId,
    pub decision_queued: Option<DecisionId>,
}

#[derive(Debug, Serialize)]
pub struct ScanStatusesResponse {
    pub statuses: Vec<ScanStatus>,
}

#[derive(Debug, Serialize)]
pub struct SelectionsResponse {
    pub selections: Vec<SelectionView>,
}

fn parse_kind(raw: &str) -> Result<ScanKind, HttpError> {
    raw.parse().map_err(|_| {
        HttpError::not_found(format!("unknown scan kind: {raw}"))
    })
}

pub async fn start_scan_handler(
    State(state): State<AppState>,
    Path(raw_kind): Path<String>,
    body: Option<Json<StartScanRequest>>,
) -> Result<impl IntoResponse, HttpError> {
    let kind = parse_kind(&raw_kind)?;
    let request = body.map(|Json(request)| request).unwrap_or_default();
    let report = state
        .executor
        .execute(kind, state.project.clone(), request.context_id)
        .await?;

    Ok(Json(ApiResponse::success(ScanStartedResponse {
        kind: report.kind,
        run_id: report.run_id,
        decision_queued: report.decision_queued,
    })))
}

pub async fn retry_scan_handler(
    State(state): State<AppState>,
    Path(raw_kind): Path<String>,
    body: Option<Json<StartScanRequest>>,
) -> Result<impl IntoResponse, HttpError> {
    let kind = parse_kind(&raw_kind)?;
    let request = body.map(|Json(request)| request).unwrap_or_default();
    let report = state
        .executor
        .retry(kind, state.project.clone(), request.context_id)
        .await?;

    Ok(Json(ApiResponse::success(ScanStartedResponse {
        kind: report.kind,
        run_id: report.run_id,
        decision_queued: report.decision_queued,
    })))
}

/// Toggles the pre-scan selection for a kind. Landing on `Selected` queues
/// a confirmation decision; accepting that runs the scan, rejecting it
/// returns the selection to idle.
pub async fn select_scan_handler(
    State(state): State<AppState>,
    Path(raw_kind): Path<String>,
    body: Option<Json<StartScanRequest>>,
) -> Result<Json<ApiResponse<SelectOutcome>>, HttpError> {
    let kind = parse_kind(&raw_kind)?;
    let request = body.map(|Json(request)| request).unwrap_or_default();
    let outcome = state
        .selection
        .select(kind, state.project.clone(), request.context_id)
        .await;
    Ok(Json(ApiResponse::success(outcome)))
}

pub async fn selections_handler(
    State(state): State<AppState>,
) -> Json<ApiResponse<SelectionsResponse>> {
    let selections = state.selection.snapshot().await;
    Json(ApiResponse::success(SelectionsResponse { selections }))
}

pub async fn all_statuses_handler(
    State(state): State<AppState>,
) -> Json<ApiResponse<ScanStatusesResponse>> {
    let statuses = state.executor.status_store().snapshot().await;
    Json(ApiResponse::success(ScanStatusesResponse { statuses }))
}

pub async fn scan_status_handler(
    State(state): State<AppState>,
    Path(raw_kind): Path<String>,
) -> Result<Json<ApiResponse<ScanStatus>>, HttpError> {
    let kind = parse_kind(&raw_kind)?;
    let status = state.executor.status_store().status(kind).await;
    Ok(Json(ApiResponse::success(status)))
}

pub async fn scan_progress_sse_handler(
    State(state): State<AppState>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>> {
    let receiver = state.executor.status_store().subscribe();
    let stream = BroadcastStream::new(receiver).filter_map(|item| match item {
        Ok(frame) => progress_to_event(&frame).map(Ok),
        Err(err) => {
            warn!("scan progress broadcast error: {err}");
            None
        }
    });

    Sse::new(stream).keep_alive(default_keep_alive())
}

fn progress_to_event(frame: &ScanProgressEvent) -> Option<Event> {
    match serde_json::to_string(frame) {
        Ok(data) => Some(
            Event::default()
                .event("scan-progress")
                .id(frame.sequence.to_string())
                .data(data),
        ),
        Err(err) => {
            warn!("failed to serialize progress frame: {err}");
            None
        }
    }
}

fn default_keep_alive() -> KeepAlive {
    KeepAlive::new()
        .interval(Duration::from_secs(15))
        .text("keep-alive")
}
