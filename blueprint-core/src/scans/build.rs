use std::time::Duration;

use async_trait::async_trait;
use blueprint_model::ScanKind;

use super::{BuildCheck, ScanHandler, ScanInput, ScanOutcome};
use crate::error::Result;
use crate::status::ProgressSink;

const STEPS: [&str; 4] = ["install", "typecheck", "lint", "compile"];

/// Build check with timer-simulated progress.
///
/// There is no build telemetry endpoint; progress frames are paced by a
/// fixed per-step delay (zero in tests).
#[derive(Debug, Clone)]
pub struct BuildScan {
    step_delay: Duration,
}

impl BuildScan {
    pub fn new(step_delay: Duration) -> Self {
        BuildScan { step_delay }
    }
}

#[async_trait]
impl ScanHandler for BuildScan {
    fn kind(&self) -> ScanKind {
        ScanKind::Build
    }

    async fn run(
        &self,
        _input: &ScanInput,
        progress: &ProgressSink,
    ) -> Result<ScanOutcome> {
        let mut steps = Vec::with_capacity(STEPS.len());
        for (index, step) in STEPS.iter().enumerate() {
            let percent =
                ((index + 1) * 100 / STEPS.len()).min(100) as u8;
            progress.update_with_message(percent, *step).await;
            if !self.step_delay.is_zero() {
                tokio::time::sleep(self.step_delay).await;
            }
            steps.push((*step).to_string());
        }
        Ok(ScanOutcome::Build(BuildCheck {
            steps,
            warnings: Vec::new(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blueprint_model::{Project, ProjectId};
    use std::sync::Arc;

    use crate::status::StatusStore;

    #[tokio::test]
    async fn build_scan_walks_every_step_and_reaches_full_progress() {
        let store = Arc::new(StatusStore::new());
        let run_id = store.start_scan(ScanKind::Build).await.unwrap();
        let sink = crate::status::ProgressSink::new(
            Arc::clone(&store),
            ScanKind::Build,
            run_id,
        );
        let input = ScanInput {
            project: Project {
                id: ProjectId::new(),
                name: "demo".to_string(),
                path: "/srv/demo".to_string(),
                framework: None,
            },
            context: None,
        };

        let outcome = BuildScan::new(Duration::ZERO)
            .run(&input, &sink)
            .await
            .unwrap();
        let ScanOutcome::Build(check) = outcome else {
            panic!("expected build outcome");
        };
        assert_eq!(check.steps, STEPS);
        assert!(check.warnings.is_empty());
        assert_eq!(store.status(ScanKind::Build).await.progress, 100);
    }
}
