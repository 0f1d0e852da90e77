use std::sync::Arc;

use async_trait::async_trait;
use blueprint_model::ScanKind;

use super::{ScanHandler, ScanInput, ScanOutcome};
use crate::client::BackendApi;
use crate::error::Result;
use crate::status::ProgressSink;

/// Structure-rule violation detection via the backend scanner.
pub struct StructureScan {
    api: Arc<dyn BackendApi>,
}

impl StructureScan {
    pub fn new(api: Arc<dyn BackendApi>) -> Self {
        StructureScan { api }
    }
}

#[async_trait]
impl ScanHandler for StructureScan {
    fn kind(&self) -> ScanKind {
        ScanKind::Structure
    }

    async fn run(
        &self,
        input: &ScanInput,
        progress: &ProgressSink,
    ) -> Result<ScanOutcome> {
        progress
            .update_with_message(10, "triggering structure scan")
            .await;
        let report = self
            .api
            .trigger_structure_scan(&input.project.path)
            .await?;
        progress
            .update_with_message(
                90,
                format!("{} violation(s) found", report.violation_count()),
            )
            .await;
        Ok(ScanOutcome::Structure(report))
    }
}
