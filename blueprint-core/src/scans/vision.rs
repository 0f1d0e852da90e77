use std::sync::Arc;

use async_trait::async_trait;
use blueprint_model::ScanKind;

use super::{ScanHandler, ScanInput, ScanOutcome, VisionSummary};
use crate::client::BackendApi;
use crate::error::{BlueprintError, Result};
use crate::status::ProgressSink;

/// Context-scoped analysis of the project tree.
pub struct VisionScan {
    api: Arc<dyn BackendApi>,
}

impl VisionScan {
    pub fn new(api: Arc<dyn BackendApi>) -> Self {
        VisionScan { api }
    }
}

#[async_trait]
impl ScanHandler for VisionScan {
    fn kind(&self) -> ScanKind {
        ScanKind::Vision
    }

    async fn run(
        &self,
        input: &ScanInput,
        progress: &ProgressSink,
    ) -> Result<ScanOutcome> {
        let context = input.context.as_ref().ok_or_else(|| {
            BlueprintError::Validation(
                "vision scan requires a context".to_string(),
            )
        })?;

        progress.update_with_message(15, "fetching project tree").await;
        let tree =
            self.api.project_structure(&input.project.path).await?;

        progress.update_with_message(70, "summarizing tree").await;
        let (files, directories) = tree.totals();
        let summary = VisionSummary {
            context_name: context.context.name.clone(),
            context_files: context.files.len(),
            files,
            directories,
            depth: tree.depth(),
        };
        Ok(ScanOutcome::Vision(summary))
    }
}
