use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ids::ProjectId;

/// Screenshot artifact from `POST /api/tester/screenshot`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenshotCapture {
    pub route: String,
    pub image_path: String,
    pub captured_at: DateTime<Utc>,
}

/// AI-generated test scenario managed via `/api/test-scenarios`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestScenario {
    pub id: Uuid,
    pub project_id: ProjectId,
    pub name: String,
    pub steps: Vec<String>,
    #[serde(default)]
    pub route: Option<String>,
}

/// Creation payload for `POST /api/test-scenarios`; the backend assigns ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTestScenario {
    pub project_id: ProjectId,
    pub name: String,
    pub steps: Vec<String>,
    #[serde(default)]
    pub route: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioExecutionStatus {
    Passed,
    Failed,
    Skipped,
}

/// Result of `POST /api/test-scenarios/execute`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioExecution {
    pub scenario_id: Uuid,
    pub status: ScenarioExecutionStatus,
    #[serde(default)]
    pub screenshot: Option<ScreenshotCapture>,
    #[serde(default)]
    pub diff_path: Option<String>,
}
