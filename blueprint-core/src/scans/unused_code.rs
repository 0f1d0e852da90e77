use std::sync::Arc;

use async_trait::async_trait;
use blueprint_model::{ScanKind, UnusedCodeFrame};
use futures_util::StreamExt;

use super::{ScanHandler, ScanInput, ScanOutcome};
use crate::client::BackendApi;
use crate::error::{BlueprintError, Result};
use crate::status::ProgressSink;

pub(crate) const NEXTJS_ONLY: &str =
    "Unused code scan only supports Next.js projects";

/// Streaming unused-code detection. Next.js projects only.
pub struct UnusedCodeScan {
    api: Arc<dyn BackendApi>,
}

impl UnusedCodeScan {
    pub fn new(api: Arc<dyn BackendApi>) -> Self {
        UnusedCodeScan { api }
    }
}

#[async_trait]
impl ScanHandler for UnusedCodeScan {
    fn kind(&self) -> ScanKind {
        ScanKind::UnusedCode
    }

    fn preflight(&self, input: &ScanInput) -> Result<()> {
        if input.project.is_nextjs() {
            Ok(())
        } else {
            Err(BlueprintError::ScanFailed(NEXTJS_ONLY.to_string()))
        }
    }

    async fn run(
        &self,
        input: &ScanInput,
        progress: &ProgressSink,
    ) -> Result<ScanOutcome> {
        let mut frames =
            self.api.unused_code_scan(&input.project.path).await?;

        while let Some(frame) = frames.next().await {
            match frame? {
                UnusedCodeFrame::Progress { percent, message } => {
                    match message {
                        Some(message) => {
                            progress
                                .update_with_message(percent, message)
                                .await
                        }
                        None => progress.update(percent).await,
                    }
                }
                UnusedCodeFrame::Complete { report } => {
                    return Ok(ScanOutcome::UnusedCode(report));
                }
                UnusedCodeFrame::Error { error } => {
                    return Err(BlueprintError::ScanFailed(error));
                }
            }
        }

        Err(BlueprintError::ScanFailed(
            "unused-code stream ended without a terminal frame".to_string(),
        ))
    }
}
