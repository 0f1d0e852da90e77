use axum::{
    Router,
    routing::{get, post},
};

use crate::handlers::{
    decision_handlers, event_handlers, scan_handlers,
};
use crate::infra::app_state::AppState;

/// Create all v1 API routes
pub fn create_v1_router() -> Router<AppState> {
    Router::new()
        // Scan lifecycle
        .route("/scans/status", get(scan_handlers::all_statuses_handler))
        .route(
            "/scans/progress",
            get(scan_handlers::scan_progress_sse_handler),
        )
        .route(
            "/scans/selection",
            get(scan_handlers::selections_handler),
        )
        .route(
            "/scans/{kind}/status",
            get(scan_handlers::scan_status_handler),
        )
        .route(
            "/scans/{kind}/select",
            post(scan_handlers::select_scan_handler),
        )
        .route("/scans/{kind}/start", post(scan_handlers::start_scan_handler))
        .route("/scans/{kind}/retry", post(scan_handlers::retry_scan_handler))
        // Decision queue
        .route(
            "/decisions/current",
            get(decision_handlers::current_decision_handler),
        )
        .route(
            "/decisions/accept",
            post(decision_handlers::accept_decision_handler),
        )
        .route(
            "/decisions/reject",
            post(decision_handlers::reject_decision_handler),
        )
        // Audit events
        .route("/events/last-runs", get(event_handlers::last_runs_handler))
        .route("/events/hydrate", post(event_handlers::hydrate_handler))
}
