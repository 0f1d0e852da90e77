//! Audit-event recording and "last run" hydration.

use std::sync::Arc;

use blueprint_model::{NewBlueprintEvent, ProjectId};
use tracing::{debug, warn};

use crate::client::BackendApi;
use crate::error::Result;
use crate::registry::ScanRegistry;
use crate::status::StatusStore;

/// Fire-and-forget audit write. Failures are logged, never propagated; the
/// accept that triggered the event has already succeeded.
pub fn spawn_record(
    api: Arc<dyn BackendApi>,
    project_id: ProjectId,
    title: impl Into<String>,
) {
    let event = NewBlueprintEvent {
        project_id,
        title: title.into(),
    };
    tokio::spawn(async move {
        if let Err(err) = api.record_event(&event).await {
            warn!(title = %event.title, %project_id, "failed to record audit event: {err}");
        }
    });
}

/// Read-through hydration of `last_run` from the backend event log.
///
/// Fetches events for every known title, maps titles back to scan kinds via
/// the registry, and moves each kind's `last_run` forward to the newest
/// matching event. Returns how many events were applied.
pub async fn hydrate_last_runs(
    api: &dyn BackendApi,
    registry: &ScanRegistry,
    status: &StatusStore,
    project_id: ProjectId,
) -> Result<usize> {
    let titles: Vec<String> = registry
        .known_event_titles()
        .into_iter()
        .map(str::to_string)
        .collect();
    let events = api.events_for_titles(project_id, &titles).await?;

    let mut applied = 0;
    for event in &events {
        match registry.kind_for_event_title(&event.title) {
            Some(kind) => {
                status.record_last_run(kind, event.created_at).await;
                applied += 1;
            }
            None => {
                debug!(title = %event.title, "ignoring event with unknown title");
            }
        }
    }
    Ok(applied)
}
