//! Scan implementations.
//!
//! One handler per [`ScanKind`], registered in a compile-time
//! [`HandlerSet`]. Handlers talk to the backend through the [`BackendApi`]
//! seam and report progress through a [`ProgressSink`]; they never touch
//! the decision queue themselves (the executor builds decisions from the
//! returned outcome).

mod build;
mod contexts;
mod photo;
mod structure;
mod test_generation;
mod unused_code;
mod vision;

pub use build::BuildScan;
pub use contexts::ContextsScan;
pub use photo::PhotoScan;
pub use structure::StructureScan;
pub use test_generation::TestGenerationScan;
pub use unused_code::UnusedCodeScan;
pub use vision::VisionScan;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use blueprint_model::{
    Context, ContextDetail, NewTestScenario, Project, ScanKind,
    ScreenshotCapture, StructureScanReport, UnusedCodeReport,
};

use crate::client::BackendApi;
use crate::error::Result;
use crate::status::ProgressSink;

/// Everything a handler may read for one run.
#[derive(Debug, Clone)]
pub struct ScanInput {
    pub project: Project,
    /// Resolved context detail for context-scoped scans; the executor
    /// enforces presence before dispatch.
    pub context: Option<ContextDetail>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VisionSummary {
    pub context_name: String,
    pub context_files: usize,
    pub files: usize,
    pub directories: usize,
    pub depth: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContextCoverage {
    pub total: usize,
    pub ungrouped: Vec<Context>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BuildCheck {
    pub steps: Vec<String>,
    pub warnings: Vec<String>,
}

/// Normalized result of a successful scan run.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    Structure(StructureScanReport),
    Vision(VisionSummary),
    Contexts(ContextCoverage),
    Build(BuildCheck),
    Photo(Vec<ScreenshotCapture>),
    UnusedCode(UnusedCodeReport),
    TestGeneration(Vec<NewTestScenario>),
}

#[async_trait]
pub trait ScanHandler: Send + Sync {
    fn kind(&self) -> ScanKind;

    /// Pre-dispatch guard; a failure here aborts the run before any status
    /// bookkeeping is touched.
    fn preflight(&self, _input: &ScanInput) -> Result<()> {
        Ok(())
    }

    async fn run(
        &self,
        input: &ScanInput,
        progress: &ProgressSink,
    ) -> Result<ScanOutcome>;
}

/// Registry of handler implementations keyed by kind.
pub struct HandlerSet {
    handlers: HashMap<ScanKind, Arc<dyn ScanHandler>>,
}

impl std::fmt::Debug for HandlerSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<_> = self.handlers.keys().collect();
        kinds.sort();
        f.debug_struct("HandlerSet").field("kinds", &kinds).finish()
    }
}

impl HandlerSet {
    pub fn empty() -> Self {
        HandlerSet {
            handlers: HashMap::new(),
        }
    }

    /// The full production set, one handler per kind.
    pub fn standard(api: Arc<dyn BackendApi>) -> Self {
        let mut set = Self::empty();
        set.insert(Arc::new(StructureScan::new(Arc::clone(&api))));
        set.insert(Arc::new(VisionScan::new(Arc::clone(&api))));
        set.insert(Arc::new(ContextsScan::new(Arc::clone(&api))));
        set.insert(Arc::new(BuildScan::new(Duration::from_millis(150))));
        set.insert(Arc::new(PhotoScan::new(Arc::clone(&api))));
        set.insert(Arc::new(UnusedCodeScan::new(Arc::clone(&api))));
        set.insert(Arc::new(TestGenerationScan::new(api)));
        set
    }

    pub fn insert(&mut self, handler: Arc<dyn ScanHandler>) {
        self.handlers.insert(handler.kind(), handler);
    }

    pub fn get(&self, kind: ScanKind) -> Option<Arc<dyn ScanHandler>> {
        self.handlers.get(&kind).cloned()
    }
}

/// Maps a Next.js `page.*` file path to the route it serves, if any.
pub(crate) fn route_for_page_file(path: &str) -> Option<String> {
    let normalized = path.trim_start_matches('/');
    let rest = normalized
        .strip_prefix("src/app/")
        .or_else(|| normalized.strip_prefix("app/"))
        .or_else(|| {
            if normalized == "src/app" || normalized == "app" {
                Some("")
            } else {
                None
            }
        })?;

    let (dir, file) = match rest.rfind('/') {
        Some(split) => (&rest[..split], &rest[split + 1..]),
        None => ("", rest),
    };
    let stem = file.strip_suffix(".tsx")
        .or_else(|| file.strip_suffix(".jsx"))
        .or_else(|| file.strip_suffix(".ts"))
        .or_else(|| file.strip_suffix(".js"))?;
    if stem != "page" {
        return None;
    }

    if dir.is_empty() {
        Some("/".to_string())
    } else {
        Some(format!("/{dir}"))
    }
}
