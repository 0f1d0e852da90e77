use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ids::ProjectId;

/// One row of the backend's audit-event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlueprintEvent {
    pub id: Uuid,
    pub project_id: ProjectId,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

/// Payload for recording a new audit event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBlueprintEvent {
    pub project_id: ProjectId,
    pub title: String,
}
