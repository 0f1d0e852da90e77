//! Core data model definitions shared across Blueprint crates.
#![allow(missing_docs)]

pub mod api;
pub mod context;
pub mod decision;
pub mod error;
pub mod events;
pub mod ids;
pub mod prelude;
pub mod project;
pub mod scan;
pub mod structure;
pub mod testing;
pub mod tree;
pub mod unused;

// Intentionally curated re-exports for downstream consumers.
pub use api::ApiResponse;
pub use context::{Context, ContextDetail, ContextGroup};
pub use decision::{DecisionKind, DecisionView, Severity};
pub use error::{ModelError, Result as ModelResult};
pub use events::{BlueprintEvent, NewBlueprintEvent};
pub use ids::{ContextId, DecisionId, ProjectId, ScanRunId};
pub use project::Project;
pub use scan::{ScanKind, ScanProgressEvent, ScanStatus};
pub use structure::{StructureScanReport, StructureViolation};
pub use testing::{
    NewTestScenario, ScenarioExecution, ScenarioExecutionStatus,
    ScreenshotCapture, TestScenario,
};
pub use tree::{TreeNode, TreeNodeKind};
pub use unused::{UnusedCodeFrame, UnusedCodeReport, UnusedItem};
