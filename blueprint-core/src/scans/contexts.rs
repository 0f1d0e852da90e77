use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use blueprint_model::{ContextId, ScanKind};

use super::{ContextCoverage, ScanHandler, ScanInput, ScanOutcome};
use crate::client::BackendApi;
use crate::error::Result;
use crate::status::ProgressSink;

/// Reviews context coverage: which contexts belong to no group.
pub struct ContextsScan {
    api: Arc<dyn BackendApi>,
}

impl ContextsScan {
    pub fn new(api: Arc<dyn BackendApi>) -> Self {
        ContextsScan { api }
    }
}

#[async_trait]
impl ScanHandler for ContextsScan {
    fn kind(&self) -> ScanKind {
        ScanKind::Contexts
    }

    async fn run(
        &self,
        input: &ScanInput,
        progress: &ProgressSink,
    ) -> Result<ScanOutcome> {
        progress.update_with_message(20, "fetching contexts").await;
        let contexts = self.api.contexts(input.project.id).await?;

        progress.update_with_message(60, "fetching groups").await;
        let groups = self.api.context_groups(input.project.id).await?;

        let grouped: HashSet<ContextId> = groups
            .iter()
            .flat_map(|group| group.context_ids.iter().copied())
            .collect();
        let total = contexts.len();
        let ungrouped = contexts
            .into_iter()
            .filter(|context| {
                context.group_id.is_none() && !grouped.contains(&context.id)
            })
            .collect();

        Ok(ScanOutcome::Contexts(ContextCoverage { total, ungrouped }))
    }
}
