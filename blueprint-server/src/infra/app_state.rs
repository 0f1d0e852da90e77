use std::fmt;
use std::sync::Arc;

use blueprint_core::{ScanExecutor, SelectionService};
use blueprint_model::Project;

use crate::infra::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub executor: Arc<ScanExecutor>,
    pub selection: Arc<SelectionService>,
    /// The session's active project, fixed at startup.
    pub project: Project,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("project", &self.project.name)
            .finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(config: Arc<Config>, executor: Arc<ScanExecutor>) -> Self {
        let project = config.project();
        let selection =
            Arc::new(SelectionService::new(Arc::clone(&executor)));
        AppState {
            config,
            executor,
            selection,
            project,
        }
    }
}
