use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use blueprint_model::{NewTestScenario, ScanKind, TreeNode};

use super::{ScanHandler, ScanInput, ScanOutcome, route_for_page_file};
use crate::client::BackendApi;
use crate::error::Result;
use crate::status::ProgressSink;

/// Proposes smoke-test scenarios for routes that have no coverage yet.
pub struct TestGenerationScan {
    api: Arc<dyn BackendApi>,
}

impl TestGenerationScan {
    pub fn new(api: Arc<dyn BackendApi>) -> Self {
        TestGenerationScan { api }
    }
}

fn page_routes(tree: &TreeNode) -> Vec<String> {
    fn collect(node: &TreeNode, routes: &mut Vec<String>) {
        if let Some(route) = route_for_page_file(&node.path) {
            routes.push(route);
        }
        for child in &node.children {
            collect(child, routes);
        }
    }
    let mut routes = Vec::new();
    collect(tree, &mut routes);
    routes.sort();
    routes.dedup();
    routes
}

#[async_trait]
impl ScanHandler for TestGenerationScan {
    fn kind(&self) -> ScanKind {
        ScanKind::TestGeneration
    }

    async fn run(
        &self,
        input: &ScanInput,
        progress: &ProgressSink,
    ) -> Result<ScanOutcome> {
        progress
            .update_with_message(10, "loading existing scenarios")
            .await;
        let existing = self.api.test_scenarios(input.project.id).await?;
        let covered: HashSet<String> = existing
            .iter()
            .filter_map(|scenario| scenario.route.clone())
            .collect();

        progress.update_with_message(40, "walking project tree").await;
        let tree =
            self.api.project_structure(&input.project.path).await?;

        let proposals: Vec<NewTestScenario> = page_routes(&tree)
            .into_iter()
            .filter(|route| !covered.contains(route))
            .map(|route| NewTestScenario {
                project_id: input.project.id,
                name: format!("Smoke test {route}"),
                steps: vec![
                    format!("Navigate to {route}"),
                    "Wait for the page to settle".to_string(),
                    "Capture a screenshot and compare".to_string(),
                ],
                route: Some(route),
            })
            .collect();

        progress
            .update_with_message(
                90,
                format!("{} scenario(s) proposed", proposals.len()),
            )
            .await;
        Ok(ScanOutcome::TestGeneration(proposals))
    }
}
