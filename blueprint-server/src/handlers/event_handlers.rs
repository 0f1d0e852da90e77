use axum::extract::State;
use axum::response::Json;
use blueprint_core::events;
use blueprint_model::{ApiResponse, ScanKind};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::errors::HttpError;
use crate::infra::app_state::AppState;

#[derive(Debug, Serialize)]
pub struct LastRunView {
    pub kind: ScanKind,
    pub label: &'static str,
    pub last_run: Option<DateTime<Utc>>,
    pub days_ago: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct LastRunsResponse {
    pub last_runs: Vec<LastRunView>,
}

#[derive(Debug, Serialize)]
pub struct HydrateResponse {
    pub applied: usize,
}

pub async fn last_runs_handler(
    State(state): State<AppState>,
) -> Json<ApiResponse<LastRunsResponse>> {
    let store = state.executor.status_store();
    let mut last_runs = Vec::new();
    for descriptor in state.executor.registry().descriptors() {
        let status = store.status(descriptor.kind).await;
        last_runs.push(LastRunView {
            kind: descriptor.kind,
            label: descriptor.label,
            last_run: status.last_run,
            days_ago: status.days_since_last_run(Utc::now()),
        });
    }
    Json(ApiResponse::success(LastRunsResponse { last_runs }))
}

/// Re-reads the backend audit log; used on project change.
pub async fn hydrate_handler(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<HydrateResponse>>, HttpError> {
    let applied = events::hydrate_last_runs(
        state.executor.backend().as_ref(),
        state.executor.registry(),
        state.executor.status_store(),
        state.project.id,
    )
    .await?;
    Ok(Json(ApiResponse::success(HydrateResponse { applied })))
}
