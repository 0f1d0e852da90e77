use serde::{Deserialize, Serialize};

use crate::ids::ProjectId;

/// Externally owned project entity; read-only from this subsystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub path: String,
    /// Detected framework id as reported by the backend (`nextjs`, `vite`, ...).
    #[serde(default)]
    pub framework: Option<String>,
}

impl Project {
    pub fn is_nextjs(&self) -> bool {
        matches!(
            self.framework.as_deref(),
            Some("nextjs") | Some("next") | Some("next.js")
        )
    }
}
