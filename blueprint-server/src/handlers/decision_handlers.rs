use axum::extract::State;
use axum::response::Json;
use blueprint_model::{ApiResponse, DecisionView};
use serde::Serialize;

use crate::errors::HttpError;
use crate::infra::app_state::AppState;

#[derive(Debug, Serialize)]
pub struct CurrentDecisionResponse {
    pub current: Option<DecisionView>,
    pub pending: usize,
}

#[derive(Debug, Serialize)]
pub struct ConsumedDecisionResponse {
    /// The decision that was consumed, if any was current.
    pub consumed: Option<DecisionView>,
    pub current: Option<DecisionView>,
}

pub async fn current_decision_handler(
    State(state): State<AppState>,
) -> Json<ApiResponse<CurrentDecisionResponse>> {
    let queue = state.executor.decision_queue();
    Json(ApiResponse::success(CurrentDecisionResponse {
        current: queue.current().await,
        pending: queue.len().await,
    }))
}

pub async fn accept_decision_handler(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ConsumedDecisionResponse>>, HttpError> {
    let queue = state.executor.decision_queue();
    let consumed = queue.accept().await?;
    Ok(Json(ApiResponse::success(ConsumedDecisionResponse {
        consumed,
        current: queue.current().await,
    })))
}

pub async fn reject_decision_handler(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ConsumedDecisionResponse>>, HttpError> {
    let queue = state.executor.decision_queue();
    let consumed = queue.reject().await?;
    Ok(Json(ApiResponse::success(ConsumedDecisionResponse {
        consumed,
        current: queue.current().await,
    })))
}
