use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ids::{ContextId, ProjectId};

/// A named, user-curated subset of project files used to scope scans.
///
/// Externally owned; this subsystem reads and proposes contexts but the
/// backend is the source of truth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Context {
    pub id: ContextId,
    pub project_id: ProjectId,
    pub name: String,
    #[serde(default)]
    pub group_id: Option<Uuid>,
    #[serde(default)]
    pub file_count: usize,
    pub updated_at: DateTime<Utc>,
}

/// Full context payload including the file list, from `/api/contexts/detail`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextDetail {
    #[serde(flatten)]
    pub context: Context,
    pub files: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextGroup {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub context_ids: Vec<ContextId>,
}
