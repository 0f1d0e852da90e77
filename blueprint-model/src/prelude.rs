//! Convenience re-exports for downstream crates.

pub use crate::api::ApiResponse;
pub use crate::context::{Context, ContextDetail, ContextGroup};
pub use crate::decision::{DecisionKind, DecisionView, Severity};
pub use crate::error::{ModelError, Result as ModelResult};
pub use crate::events::{BlueprintEvent, NewBlueprintEvent};
pub use crate::ids::{ContextId, DecisionId, ProjectId, ScanRunId};
pub use crate::project::Project;
pub use crate::scan::{ScanKind, ScanProgressEvent, ScanStatus};
pub use crate::structure::{StructureScanReport, StructureViolation};
pub use crate::testing::{
    NewTestScenario, ScenarioExecution, ScenarioExecutionStatus,
    ScreenshotCapture, TestScenario,
};
pub use crate::tree::{TreeNode, TreeNodeKind};
pub use crate::unused::{UnusedCodeFrame, UnusedCodeReport, UnusedItem};
