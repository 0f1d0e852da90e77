//! Scan executor: lifecycle sequencing and decision building.
//!
//! `execute` validates, marks the status slot running, dispatches the
//! handler, then converts the outcome into at most one queued decision.
//! Failures land in the status slot as a banner with a manual retry path;
//! they never produce decisions.

use std::sync::Arc;

use blueprint_model::{
    ContextId, DecisionId, Project, ScanKind, ScanRunId, Severity,
};
use tracing::{info, warn};

use crate::client::BackendApi;
use crate::decision::{Decision, DecisionQueue, callback};
use crate::error::{BlueprintError, Result};
use crate::events;
use crate::registry::{ScanDescriptor, ScanRegistry};
use crate::requirement;
use crate::scans::{HandlerSet, ScanInput, ScanOutcome};
use crate::status::{ProgressSink, StatusStore};

/// Severity threshold: finding counts above this escalate to `Warning`.
const WARNING_COUNT_THRESHOLD: usize = 10;

/// What a completed execution produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanReport {
    pub kind: ScanKind,
    pub run_id: ScanRunId,
    pub decision_queued: Option<DecisionId>,
}

pub struct ScanExecutor {
    registry: ScanRegistry,
    handlers: HandlerSet,
    status: Arc<StatusStore>,
    queue: Arc<DecisionQueue>,
    api: Arc<dyn BackendApi>,
}

impl std::fmt::Debug for ScanExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanExecutor")
            .field("handlers", &self.handlers)
            .finish_non_exhaustive()
    }
}

impl ScanExecutor {
    pub fn new(
        api: Arc<dyn BackendApi>,
        handlers: HandlerSet,
        status: Arc<StatusStore>,
        queue: Arc<DecisionQueue>,
    ) -> Self {
        ScanExecutor {
            registry: ScanRegistry::new(),
            handlers,
            status,
            queue,
            api,
        }
    }

    /// Production wiring: the standard handler set over one backend client.
    pub fn standard(api: Arc<dyn BackendApi>) -> Self {
        let handlers = HandlerSet::standard(Arc::clone(&api));
        Self::new(
            api,
            handlers,
            Arc::new(StatusStore::new()),
            Arc::new(DecisionQueue::new()),
        )
    }

    pub fn registry(&self) -> &ScanRegistry {
        &self.registry
    }

    pub fn status_store(&self) -> &Arc<StatusStore> {
        &self.status
    }

    pub fn decision_queue(&self) -> &Arc<DecisionQueue> {
        &self.queue
    }

    pub fn backend(&self) -> &Arc<dyn BackendApi> {
        &self.api
    }

    pub async fn execute(
        &self,
        kind: ScanKind,
        project: Project,
        context_id: Option<ContextId>,
    ) -> Result<ScanReport> {
        let descriptor = self.registry.get(kind);
        let Some(handler) = self.handlers.get(kind) else {
            warn!(%kind, "no handler registered; scan aborted");
            return Err(BlueprintError::NotFound(format!(
                "no handler registered for scan {kind}"
            )));
        };

        if descriptor.context_needed && context_id.is_none() {
            return Err(BlueprintError::Validation(format!(
                "scan {kind} requires a context"
            )));
        }
        let context = match context_id {
            Some(id) => Some(self.api.context_detail(id).await?),
            None => None,
        };

        let input = ScanInput {
            project: project.clone(),
            context,
        };
        handler.preflight(&input)?;

        let run_id = self.status.start_scan(kind).await?;
        let sink =
            ProgressSink::new(Arc::clone(&self.status), kind, run_id);

        match handler.run(&input, &sink).await {
            Ok(outcome) => {
                self.status.complete_scan(kind).await;
                info!(%kind, %run_id, "scan completed");
                let decision_queued = match self
                    .build_decision(descriptor, &project, outcome)
                {
                    Some(decision) => Some(self.queue.add(decision).await),
                    None => None,
                };
                Ok(ScanReport {
                    kind,
                    run_id,
                    decision_queued,
                })
            }
            Err(err) => {
                let message = err.surface_message();
                warn!(%kind, %run_id, "scan failed: {message}");
                self.status.fail_scan(kind, message).await;
                Err(err)
            }
        }
    }

    /// Error-banner retry: clears the recorded failure and re-executes.
    pub async fn retry(
        &self,
        kind: ScanKind,
        project: Project,
        context_id: Option<ContextId>,
    ) -> Result<ScanReport> {
        self.status.clear_error(kind).await;
        self.execute(kind, project, context_id).await
    }

    fn severity_for_count(count: usize) -> Severity {
        if count > WARNING_COUNT_THRESHOLD {
            Severity::Warning
        } else {
            Severity::Info
        }
    }

    fn build_decision(
        &self,
        descriptor: &'static ScanDescriptor,
        project: &Project,
        outcome: ScanOutcome,
    ) -> Option<Decision> {
        let event_title = descriptor.event_title;
        match outcome {
            ScanOutcome::Structure(report) => {
                if report.violations.is_empty() {
                    return None;
                }
                let count = report.violations.len();
                let api = Arc::clone(&self.api);
                let project = project.clone();
                let data = serde_json::to_value(&report).ok();
                let decision = Decision::confirm(
                    ScanKind::Structure,
                    "Structure violations found",
                    format!(
                        "{count} violation(s) across {} scanned file(s). \
                         Accept to generate a remediation requirement.",
                        report.scanned_files
                    ),
                    Self::severity_for_count(count),
                    callback(move || {
                        let api = Arc::clone(&api);
                        let project = project.clone();
                        let violations = report.violations.clone();
                        async move {
                            let requirement =
                                requirement::structure_remediation(
                                    &project,
                                    &violations,
                                )?;
                            api.save_structure_requirement(&requirement)
                                .await?;
                            if let Some(title) = event_title {
                                events::spawn_record(api, project.id, title);
                            }
                            Ok(())
                        }
                    }),
                )
                .with_count(count);
                Some(match data {
                    Some(data) => decision.with_data(data),
                    None => decision,
                })
            }
            ScanOutcome::Vision(summary) => {
                let api = Arc::clone(&self.api);
                let project = project.clone();
                let description = format!(
                    "Context `{}` ({} file(s)) against a tree of {} file(s), \
                     {} director(ies), depth {}. Accept to file a review \
                     requirement.",
                    summary.context_name,
                    summary.context_files,
                    summary.files,
                    summary.directories,
                    summary.depth
                );
                Some(Decision::confirm(
                    ScanKind::Vision,
                    "Vision analysis complete",
                    description,
                    Severity::Info,
                    callback(move || {
                        let api = Arc::clone(&api);
                        let project = project.clone();
                        let summary = summary.clone();
                        async move {
                            let requirement = requirement::vision_review(
                                &project,
                                &summary.context_name,
                                summary.files,
                                summary.directories,
                                summary.depth,
                            );
                            api.write_requirement(&requirement).await?;
                            if let Some(title) = event_title {
                                events::spawn_record(api, project.id, title);
                            }
                            Ok(())
                        }
                    }),
                ))
            }
            ScanOutcome::Contexts(coverage) => {
                if coverage.ungrouped.is_empty() {
                    return None;
                }
                let count = coverage.ungrouped.len();
                let api = Arc::clone(&self.api);
                let project = project.clone();
                Some(
                    Decision::confirm(
                        ScanKind::Contexts,
                        "Ungrouped contexts found",
                        format!(
                            "{count} of {} context(s) belong to no group. \
                             Accept to file a grouping requirement.",
                            coverage.total
                        ),
                        Self::severity_for_count(count),
                        callback(move || {
                            let api = Arc::clone(&api);
                            let project = project.clone();
                            let ungrouped = coverage.ungrouped.clone();
                            async move {
                                let requirement =
                                    requirement::context_grouping(
                                        &project, &ungrouped,
                                    )?;
                                api.write_requirement(&requirement).await?;
                                if let Some(title) = event_title {
                                    events::spawn_record(
                                        api, project.id, title,
                                    );
                                }
                                Ok(())
                            }
                        }),
                    )
                    .with_count(count),
                )
            }
            ScanOutcome::Build(check) => Some(
                Decision::notify(
                    ScanKind::Build,
                    "Build check completed",
                    format!(
                        "{} step(s) ran clean, {} warning(s).",
                        check.steps.len(),
                        check.warnings.len()
                    ),
                    Severity::Info,
                )
                .with_data(serde_json::json!({
                    "steps": check.steps,
                    "warnings": check.warnings,
                })),
            ),
            ScanOutcome::Photo(captures) => {
                let routes: Vec<&str> = captures
                    .iter()
                    .map(|capture| capture.route.as_str())
                    .collect();
                Some(
                    Decision::notify(
                        ScanKind::Photo,
                        "Screenshots captured",
                        format!("{} route(s) captured.", captures.len()),
                        Severity::Info,
                    )
                    .with_count(captures.len())
                    .with_data(serde_json::json!({ "routes": routes })),
                )
            }
            ScanOutcome::UnusedCode(report) => {
                if report.items.is_empty() {
                    return Some(Decision::notify(
                        ScanKind::UnusedCode,
                        "No unused code found",
                        format!(
                            "{} file(s) scanned, nothing to remove.",
                            report.scanned_files
                        ),
                        Severity::Info,
                    ));
                }
                let count = report.items.len();
                let api = Arc::clone(&self.api);
                let project_id = project.id;
                let data = serde_json::to_value(&report).ok();
                let decision = Decision::confirm(
                    ScanKind::UnusedCode,
                    "Unused code detected",
                    format!(
                        "{count} unused symbol(s) across {} file(s). \
                         Accept to save the report.",
                        report.scanned_files
                    ),
                    Self::severity_for_count(count),
                    callback(move || {
                        let api = Arc::clone(&api);
                        let report = report.clone();
                        async move {
                            api.save_unused_report(project_id, &report)
                                .await?;
                            if let Some(title) = event_title {
                                events::spawn_record(api, project_id, title);
                            }
                            Ok(())
                        }
                    }),
                )
                .with_count(count);
                Some(match data {
                    Some(data) => decision.with_data(data),
                    None => decision,
                })
            }
            ScanOutcome::TestGeneration(proposals) => {
                if proposals.is_empty() {
                    return Some(Decision::notify(
                        ScanKind::TestGeneration,
                        "Test coverage up to date",
                        "Every discovered route already has a scenario."
                            .to_string(),
                        Severity::Info,
                    ));
                }
                let count = proposals.len();
                let api = Arc::clone(&self.api);
                let project_id = project.id;
                Some(
                    Decision::confirm(
                        ScanKind::TestGeneration,
                        "Generated test scenarios",
                        format!(
                            "{count} new scenario(s) proposed. Accept to \
                             persist and execute them."
                        ),
                        Severity::Info,
                        callback(move || {
                            let api = Arc::clone(&api);
                            let proposals = proposals.clone();
                            async move {
                                for proposal in &proposals {
                                    let created = api
                                        .create_test_scenario(proposal)
                                        .await?;
                                    api.execute_test_scenario(created.id)
                                        .await?;
                                }
                                if let Some(title) = event_title {
                                    events::spawn_record(
                                        api, project_id, title,
                                    );
                                }
                                Ok(())
                            }
                        }),
                    )
                    .with_count(count),
                )
            }
        }
    }
}
