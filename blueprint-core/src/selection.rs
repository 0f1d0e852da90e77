//! Pre-scan selection state machine and the service that drives it.
//!
//! Per scan kind: `Idle -> Selected -> (AwaitingContext ->) Confirmed ->
//! Running -> {Completed | Failed}`, with cancellation returning to `Idle`.
//! Selecting an already-selected kind toggles it back off. Landing on
//! `Selected` queues a confirmation decision; accepting it runs the
//! executor, rejecting it cancels the selection.

use std::collections::HashMap;
use std::sync::Arc;

use blueprint_model::{ContextId, DecisionId, Project, ScanKind, Severity};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::warn;

use crate::decision::{Decision, callback};
use crate::executor::ScanExecutor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionState {
    Idle,
    Selected,
    /// Context-scoped scan waiting on the context picker sub-flow.
    AwaitingContext,
    Confirmed,
    Running,
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanSelection {
    kind: ScanKind,
    context_needed: bool,
    state: SelectionState,
    context: Option<ContextId>,
}

impl ScanSelection {
    pub fn new(kind: ScanKind, context_needed: bool) -> Self {
        ScanSelection {
            kind,
            context_needed,
            state: SelectionState::Idle,
            context: None,
        }
    }

    pub fn kind(&self) -> ScanKind {
        self.kind
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn context(&self) -> Option<ContextId> {
        self.context
    }

    /// Select toggles: selecting an already-selected scan deselects it.
    /// Context-scoped scans route through the picker before confirmation.
    pub fn toggle(&mut self) -> SelectionState {
        self.state = match self.state {
            SelectionState::Idle
            | SelectionState::Completed
            | SelectionState::Failed => {
                if self.context_needed && self.context.is_none() {
                    SelectionState::AwaitingContext
                } else {
                    SelectionState::Selected
                }
            }
            SelectionState::Selected | SelectionState::AwaitingContext => {
                self.context = None;
                SelectionState::Idle
            }
            // Toggling has no effect once the flow is committed.
            other => other,
        };
        self.state
    }

    pub fn context_chosen(&mut self, context: ContextId) -> SelectionState {
        if self.state == SelectionState::AwaitingContext {
            self.context = Some(context);
            self.state = SelectionState::Selected;
        }
        self.state
    }

    /// The pre-scan confirmation decision was accepted.
    pub fn confirm(&mut self) -> SelectionState {
        if self.state == SelectionState::Selected {
            self.state = SelectionState::Confirmed;
        }
        self.state
    }

    /// The confirmation decision was rejected, or the picker dismissed.
    pub fn cancel(&mut self) -> SelectionState {
        match self.state {
            SelectionState::Running => {}
            _ => {
                self.context = None;
                self.state = SelectionState::Idle;
            }
        }
        self.state
    }

    pub fn started(&mut self) -> SelectionState {
        if self.state == SelectionState::Confirmed {
            self.state = SelectionState::Running;
        }
        self.state
    }

    pub fn finished(&mut self, success: bool) -> SelectionState {
        if self.state == SelectionState::Running {
            self.state = if success {
                SelectionState::Completed
            } else {
                SelectionState::Failed
            };
        }
        self.state
    }
}

/// Serializable snapshot of one kind's selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionView {
    pub kind: ScanKind,
    pub state: SelectionState,
    pub context: Option<ContextId>,
}

/// What a select call did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectOutcome {
    pub state: SelectionState,
    /// Id of the queued confirmation decision, when the selection landed
    /// on `Selected`.
    pub decision_queued: Option<DecisionId>,
}

type Selections = Arc<Mutex<HashMap<ScanKind, ScanSelection>>>;

/// Drives the per-kind selection machines and their confirmation
/// decisions.
///
/// Accepting a confirmation runs the executor; a failing run lands in the
/// status banner (with its manual retry path), so the confirmation is
/// consumed either way. Rejecting cancels the selection back to idle.
pub struct SelectionService {
    executor: Arc<ScanExecutor>,
    selections: Selections,
}

impl std::fmt::Debug for SelectionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionService").finish_non_exhaustive()
    }
}

impl SelectionService {
    pub fn new(executor: Arc<ScanExecutor>) -> Self {
        SelectionService {
            executor,
            selections: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub async fn snapshot(&self) -> Vec<SelectionView> {
        let map = self.selections.lock().await;
        ScanKind::ALL
            .into_iter()
            .map(|kind| match map.get(&kind) {
                Some(selection) => SelectionView {
                    kind,
                    state: selection.state(),
                    context: selection.context(),
                },
                None => SelectionView {
                    kind,
                    state: SelectionState::Idle,
                    context: None,
                },
            })
            .collect()
    }

    pub async fn state(&self, kind: ScanKind) -> SelectionState {
        let map = self.selections.lock().await;
        map.get(&kind)
            .map(ScanSelection::state)
            .unwrap_or(SelectionState::Idle)
    }

    /// Toggles the selection for a kind. An `AwaitingContext` selection
    /// takes the supplied context instead of toggling off; landing on
    /// `Selected` queues the confirmation decision.
    pub async fn select(
        &self,
        kind: ScanKind,
        project: Project,
        context_id: Option<ContextId>,
    ) -> SelectOutcome {
        let descriptor = self.executor.registry().get(kind);
        let (state, context) = {
            let mut map = self.selections.lock().await;
            let selection = map.entry(kind).or_insert_with(|| {
                ScanSelection::new(kind, descriptor.context_needed)
            });
            let state = match (selection.state(), context_id) {
                (SelectionState::AwaitingContext, Some(context)) => {
                    selection.context_chosen(context)
                }
                _ => {
                    let state = selection.toggle();
                    match (state, context_id) {
                        (SelectionState::AwaitingContext, Some(context)) => {
                            selection.context_chosen(context)
                        }
                        _ => state,
                    }
                }
            };
            (state, selection.context())
        };

        let decision_queued = if state == SelectionState::Selected {
            let decision =
                self.confirmation(kind, descriptor.label, project, context);
            Some(self.executor.decision_queue().add(decision).await)
        } else {
            None
        };

        SelectOutcome {
            state,
            decision_queued,
        }
    }

    fn confirmation(
        &self,
        kind: ScanKind,
        label: &'static str,
        project: Project,
        context: Option<ContextId>,
    ) -> Decision {
        let description = match context {
            Some(_) => format!("{label} will run scoped to the chosen context."),
            None => format!("{label} will run against `{}`.", project.path),
        };

        let selections = Arc::clone(&self.selections);
        let executor = Arc::clone(&self.executor);
        let on_accept = callback(move || {
            let selections = Arc::clone(&selections);
            let executor = Arc::clone(&executor);
            let project = project.clone();
            async move {
                let committed = {
                    let mut map = selections.lock().await;
                    map.get_mut(&kind).is_some_and(|selection| {
                        selection.confirm() == SelectionState::Confirmed
                            && selection.started() == SelectionState::Running
                    })
                };
                if !committed {
                    // Deselected while the confirmation sat in the queue.
                    return Ok(());
                }

                let result = executor.execute(kind, project, context).await;
                let success = result.is_ok();
                {
                    let mut map = selections.lock().await;
                    if let Some(selection) = map.get_mut(&kind) {
                        selection.finished(success);
                    }
                }
                if let Err(err) = result {
                    // Surfaced through the status banner and its retry path.
                    warn!(%kind, "confirmed scan failed: {err}");
                }
                Ok(())
            }
        });

        let selections = Arc::clone(&self.selections);
        let on_reject = callback(move || {
            let selections = Arc::clone(&selections);
            async move {
                let mut map = selections.lock().await;
                if let Some(selection) = map.get_mut(&kind) {
                    selection.cancel();
                }
                Ok(())
            }
        });

        Decision::confirm(
            kind,
            format!("Run {label}?"),
            description,
            Severity::Info,
            on_accept,
        )
        .with_on_reject(on_reject)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blueprint_model::{
        Context, ContextDetail, DecisionKind, ProjectId, StructureScanReport,
        TreeNode, TreeNodeKind,
    };
    use chrono::Utc;

    use crate::client::{BackendApi, MockBackendApi};
    use crate::decision::DecisionQueue;
    use crate::scans::HandlerSet;
    use crate::status::StatusStore;

    fn project() -> Project {
        Project {
            id: ProjectId::new(),
            name: "demo".to_string(),
            path: "/srv/demo".to_string(),
            framework: Some("nextjs".to_string()),
        }
    }

    fn service_over(api: MockBackendApi) -> SelectionService {
        let api: Arc<dyn BackendApi> = Arc::new(api);
        let handlers = HandlerSet::standard(Arc::clone(&api));
        let executor = Arc::new(ScanExecutor::new(
            api,
            handlers,
            Arc::new(StatusStore::new()),
            Arc::new(DecisionQueue::new()),
        ));
        SelectionService::new(executor)
    }

    #[test]
    fn happy_path_reaches_completed() {
        let mut selection = ScanSelection::new(ScanKind::Structure, false);
        assert_eq!(selection.toggle(), SelectionState::Selected);
        assert_eq!(selection.confirm(), SelectionState::Confirmed);
        assert_eq!(selection.started(), SelectionState::Running);
        assert_eq!(selection.finished(true), SelectionState::Completed);
    }

    #[test]
    fn selecting_twice_deselects() {
        let mut selection = ScanSelection::new(ScanKind::Structure, false);
        selection.toggle();
        assert_eq!(selection.toggle(), SelectionState::Idle);
    }

    #[test]
    fn context_scoped_scan_routes_through_the_picker() {
        let mut selection = ScanSelection::new(ScanKind::Vision, true);
        assert_eq!(selection.toggle(), SelectionState::AwaitingContext);

        let context = ContextId::new();
        assert_eq!(
            selection.context_chosen(context),
            SelectionState::Selected
        );
        assert_eq!(selection.context(), Some(context));

        // A later re-selection reuses the chosen context.
        selection.confirm();
        selection.started();
        selection.finished(true);
        assert_eq!(selection.toggle(), SelectionState::Selected);
    }

    #[test]
    fn reject_returns_to_idle_and_clears_context() {
        let mut selection = ScanSelection::new(ScanKind::Photo, true);
        selection.toggle();
        selection.context_chosen(ContextId::new());
        assert_eq!(selection.cancel(), SelectionState::Idle);
        assert_eq!(selection.context(), None);
    }

    #[test]
    fn running_scans_cannot_be_cancelled() {
        let mut selection = ScanSelection::new(ScanKind::Build, false);
        selection.toggle();
        selection.confirm();
        selection.started();
        // No abort path exists once a scan is in flight.
        assert_eq!(selection.cancel(), SelectionState::Running);
        assert_eq!(selection.finished(false), SelectionState::Failed);
    }

    #[test]
    fn confirm_from_idle_is_ignored() {
        let mut selection = ScanSelection::new(ScanKind::Build, false);
        assert_eq!(selection.confirm(), SelectionState::Idle);
        assert_eq!(selection.started(), SelectionState::Idle);
    }

    #[tokio::test]
    async fn selecting_queues_a_confirmation_and_accept_runs_the_scan() {
        let mut api = MockBackendApi::new();
        api.expect_trigger_structure_scan().times(1).returning(|_| {
            Ok(StructureScanReport {
                scanned_files: 8,
                violations: Vec::new(),
            })
        });
        let service = service_over(api);

        let outcome = service
            .select(ScanKind::Structure, project(), None)
            .await;
        assert_eq!(outcome.state, SelectionState::Selected);
        assert!(outcome.decision_queued.is_some());

        let queue = service.executor.decision_queue();
        let confirmation = queue.current().await.unwrap();
        assert_eq!(confirmation.kind, DecisionKind::Confirm);
        assert_eq!(confirmation.title, "Run Structure Scan?");

        queue.accept().await.unwrap().unwrap();
        assert_eq!(
            service.state(ScanKind::Structure).await,
            SelectionState::Completed
        );
        let status = service
            .executor
            .status_store()
            .status(ScanKind::Structure)
            .await;
        assert_eq!(status.progress, 100);
        assert!(status.last_run.is_some());
    }

    #[tokio::test]
    async fn rejecting_the_confirmation_returns_the_selection_to_idle() {
        let service = service_over(MockBackendApi::new());
        service.select(ScanKind::Build, project(), None).await;

        let queue = service.executor.decision_queue();
        queue.reject().await.unwrap().unwrap();
        assert_eq!(
            service.state(ScanKind::Build).await,
            SelectionState::Idle
        );
        // The scan never ran.
        let status = service
            .executor
            .status_store()
            .status(ScanKind::Build)
            .await;
        assert_eq!(status.last_run, None);
    }

    #[tokio::test]
    async fn context_scoped_selection_waits_for_a_context() {
        let context_id = ContextId::new();
        let mut api = MockBackendApi::new();
        api.expect_context_detail().times(1).returning(move |id| {
            Ok(ContextDetail {
                context: Context {
                    id,
                    project_id: ProjectId::new(),
                    name: "auth".to_string(),
                    group_id: None,
                    file_count: 1,
                    updated_at: Utc::now(),
                },
                files: vec!["src/app/page.tsx".to_string()],
            })
        });
        api.expect_project_structure().times(1).returning(|_| {
            Ok(TreeNode {
                name: "src".to_string(),
                path: "src".to_string(),
                kind: TreeNodeKind::Directory,
                children: Vec::new(),
            })
        });
        let service = service_over(api);

        let outcome =
            service.select(ScanKind::Vision, project(), None).await;
        assert_eq!(outcome.state, SelectionState::AwaitingContext);
        assert_eq!(outcome.decision_queued, None);

        let outcome = service
            .select(ScanKind::Vision, project(), Some(context_id))
            .await;
        assert_eq!(outcome.state, SelectionState::Selected);
        assert!(outcome.decision_queued.is_some());

        let queue = service.executor.decision_queue();
        queue.accept().await.unwrap().unwrap();
        assert_eq!(
            service.state(ScanKind::Vision).await,
            SelectionState::Completed
        );
        // The executor's own vision decision is now current.
        assert_eq!(
            queue.current().await.unwrap().title,
            "Vision analysis complete"
        );
    }

    #[tokio::test]
    async fn deselecting_makes_the_stale_confirmation_a_no_op() {
        let service = service_over(MockBackendApi::new());
        service.select(ScanKind::Structure, project(), None).await;
        // Toggle back off while the confirmation is still queued.
        let outcome =
            service.select(ScanKind::Structure, project(), None).await;
        assert_eq!(outcome.state, SelectionState::Idle);

        let queue = service.executor.decision_queue();
        queue.accept().await.unwrap().unwrap();
        assert!(queue.is_empty().await);
        let status = service
            .executor
            .status_store()
            .status(ScanKind::Structure)
            .await;
        assert_eq!(status.last_run, None);
    }

    #[tokio::test]
    async fn failed_run_marks_the_selection_failed_but_consumes_the_confirmation()
    {
        let mut api = MockBackendApi::new();
        api.expect_trigger_structure_scan().times(1).returning(|_| {
            Err(crate::error::BlueprintError::Http {
                status: 500,
                message: "scanner crashed".to_string(),
            })
        });
        let service = service_over(api);
        service.select(ScanKind::Structure, project(), None).await;

        let queue = service.executor.decision_queue();
        queue.accept().await.unwrap().unwrap();
        assert!(queue.is_empty().await);
        assert_eq!(
            service.state(ScanKind::Structure).await,
            SelectionState::Failed
        );
        let status = service
            .executor
            .status_store()
            .status(ScanKind::Structure)
            .await;
        assert!(status.has_error);
    }
}
