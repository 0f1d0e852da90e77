//! Backend API seam.
//!
//! Every network call the engine makes goes through [`BackendApi`], so
//! handlers and decision callbacks can be exercised against a mock. The
//! [`BackendClient`] implementation talks JSON over reqwest to the
//! dashboard's same-origin API routes.

use async_trait::async_trait;
use blueprint_model::{
    BlueprintEvent, Context, ContextDetail, ContextGroup, ContextId,
    NewBlueprintEvent, NewTestScenario, ProjectId, ScenarioExecution,
    ScreenshotCapture, StructureScanReport, TestScenario, TreeNode,
    UnusedCodeFrame, UnusedCodeReport,
};
use futures::stream::BoxStream;
use futures_util::StreamExt;
use serde::de::DeserializeOwned;
use serde_json::json;
use url::Url;
use uuid::Uuid;

use crate::error::{BlueprintError, Result};
use crate::requirement::RequirementFile;

/// Frames from the streaming unused-code endpoint, in arrival order.
pub type UnusedCodeStream = BoxStream<'static, Result<UnusedCodeFrame>>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BackendApi: Send + Sync {
    /// `POST /api/project/structure`
    async fn project_structure(&self, project_path: &str) -> Result<TreeNode>;

    /// `POST /api/blueprint/events`
    async fn record_event(&self, event: &NewBlueprintEvent) -> Result<()>;

    /// `GET /api/blueprint/events` filtered by event titles.
    async fn events_for_titles(
        &self,
        project_id: ProjectId,
        titles: &[String],
    ) -> Result<Vec<BlueprintEvent>>;

    /// `POST /api/structure-scan/trigger`
    async fn trigger_structure_scan(
        &self,
        project_path: &str,
    ) -> Result<StructureScanReport>;

    /// `POST /api/structure-scan/save`
    async fn save_structure_requirement(
        &self,
        requirement: &RequirementFile,
    ) -> Result<()>;

    /// `POST /api/tester/screenshot`
    async fn capture_screenshot(
        &self,
        project_id: ProjectId,
        route: &str,
    ) -> Result<ScreenshotCapture>;

    /// `POST /api/unused-code`, streamed NDJSON frames.
    async fn unused_code_scan(
        &self,
        project_path: &str,
    ) -> Result<UnusedCodeStream>;

    /// `POST /api/unused-code/save-report`
    async fn save_unused_report(
        &self,
        project_id: ProjectId,
        report: &UnusedCodeReport,
    ) -> Result<()>;

    /// `POST /api/claude-code/requirement`
    async fn write_requirement(
        &self,
        requirement: &RequirementFile,
    ) -> Result<()>;

    /// `GET /api/contexts`
    async fn contexts(&self, project_id: ProjectId) -> Result<Vec<Context>>;

    /// `GET /api/contexts/detail`
    async fn context_detail(
        &self,
        context_id: ContextId,
    ) -> Result<ContextDetail>;

    /// `POST /api/contexts`
    async fn create_context(
        &self,
        project_id: ProjectId,
        name: &str,
        files: &[String],
    ) -> Result<Context>;

    /// `PUT /api/contexts`
    async fn update_context(
        &self,
        context_id: ContextId,
        name: &str,
        files: &[String],
    ) -> Result<Context>;

    /// `GET /api/context-groups`
    async fn context_groups(
        &self,
        project_id: ProjectId,
    ) -> Result<Vec<ContextGroup>>;

    /// `GET /api/test-scenarios`
    async fn test_scenarios(
        &self,
        project_id: ProjectId,
    ) -> Result<Vec<TestScenario>>;

    /// `POST /api/test-scenarios`
    async fn create_test_scenario(
        &self,
        scenario: &NewTestScenario,
    ) -> Result<TestScenario>;

    /// `POST /api/test-scenarios/execute`
    async fn execute_test_scenario(
        &self,
        scenario_id: Uuid,
    ) -> Result<ScenarioExecution>;
}

/// Reqwest-backed [`BackendApi`] implementation.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: Url,
}

impl BackendClient {
    pub fn new(base_url: Url) -> Self {
        BackendClient {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        BackendClient { http, base_url }
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url.join(path).map_err(|err| {
            BlueprintError::Validation(format!(
                "invalid endpoint {path}: {err}"
            ))
        })
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let message = response.text().await.unwrap_or_default();
            Err(BlueprintError::Http {
                status: status.as_u16(),
                message,
            })
        }
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T> {
        let response =
            self.http.post(self.endpoint(path)?).json(body).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn post_unit(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<()> {
        let response =
            self.http.post(self.endpoint(path)?).json(body).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let response = self
            .http
            .get(self.endpoint(path)?)
            .query(query)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }
}

/// Decodes one NDJSON line into a frame. Blank lines are skipped upstream.
fn decode_frame(line: &str) -> Result<UnusedCodeFrame> {
    Ok(serde_json::from_str(line)?)
}

#[async_trait]
impl BackendApi for BackendClient {
    async fn project_structure(&self, project_path: &str) -> Result<TreeNode> {
        self.post_json(
            "/api/project/structure",
            &json!({ "projectPath": project_path }),
        )
        .await
    }

    async fn record_event(&self, event: &NewBlueprintEvent) -> Result<()> {
        self.post_unit(
            "/api/blueprint/events",
            &json!({
                "projectId": event.project_id,
                "title": event.title,
            }),
        )
        .await
    }

    async fn events_for_titles(
        &self,
        project_id: ProjectId,
        titles: &[String],
    ) -> Result<Vec<BlueprintEvent>> {
        self.get_json(
            "/api/blueprint/events",
            &[
                ("projectId", project_id.to_string()),
                ("titles", titles.join(",")),
            ],
        )
        .await
    }

    async fn trigger_structure_scan(
        &self,
        project_path: &str,
    ) -> Result<StructureScanReport> {
        self.post_json(
            "/api/structure-scan/trigger",
            &json!({ "projectPath": project_path }),
        )
        .await
    }

    async fn save_structure_requirement(
        &self,
        requirement: &RequirementFile,
    ) -> Result<()> {
        self.post_unit(
            "/api/structure-scan/save",
            &serde_json::to_value(requirement)?,
        )
        .await
    }

    async fn capture_screenshot(
        &self,
        project_id: ProjectId,
        route: &str,
    ) -> Result<ScreenshotCapture> {
        self.post_json(
            "/api/tester/screenshot",
            &json!({ "projectId": project_id, "route": route }),
        )
        .await
    }

    async fn unused_code_scan(
        &self,
        project_path: &str,
    ) -> Result<UnusedCodeStream> {
        let response = self
            .http
            .post(self.endpoint("/api/unused-code")?)
            .json(&json!({ "projectPath": project_path }))
            .send()
            .await?;
        let response = Self::check(response).await?;
        let mut bytes = response.bytes_stream();

        let stream = async_stream::try_stream! {
            let mut buffer: Vec<u8> = Vec::new();
            while let Some(chunk) = bytes.next().await {
                let chunk = chunk?;
                buffer.extend_from_slice(&chunk);
                while let Some(newline) =
                    buffer.iter().position(|byte| *byte == b'\n')
                {
                    let line: Vec<u8> = buffer.drain(..=newline).collect();
                    let text = String::from_utf8_lossy(&line);
                    let text = text.trim();
                    if text.is_empty() {
                        continue;
                    }
                    yield decode_frame(text)?;
                }
            }
            let text = String::from_utf8_lossy(&buffer);
            let text = text.trim();
            if !text.is_empty() {
                yield decode_frame(text)?;
            }
        };

        Ok(Box::pin(stream))
    }

    async fn save_unused_report(
        &self,
        project_id: ProjectId,
        report: &UnusedCodeReport,
    ) -> Result<()> {
        self.post_unit(
            "/api/unused-code/save-report",
            &json!({ "projectId": project_id, "report": report }),
        )
        .await
    }

    async fn write_requirement(
        &self,
        requirement: &RequirementFile,
    ) -> Result<()> {
        self.post_unit(
            "/api/claude-code/requirement",
            &serde_json::to_value(requirement)?,
        )
        .await
    }

    async fn contexts(&self, project_id: ProjectId) -> Result<Vec<Context>> {
        self.get_json(
            "/api/contexts",
            &[("projectId", project_id.to_string())],
        )
        .await
    }

    async fn context_detail(
        &self,
        context_id: ContextId,
    ) -> Result<ContextDetail> {
        self.get_json(
            "/api/contexts/detail",
            &[("contextId", context_id.to_string())],
        )
        .await
    }

    async fn create_context(
        &self,
        project_id: ProjectId,
        name: &str,
        files: &[String],
    ) -> Result<Context> {
        self.post_json(
            "/api/contexts",
            &json!({
                "projectId": project_id,
                "name": name,
                "files": files,
            }),
        )
        .await
    }

    async fn update_context(
        &self,
        context_id: ContextId,
        name: &str,
        files: &[String],
    ) -> Result<Context> {
        let response = self
            .http
            .put(self.endpoint("/api/contexts")?)
            .json(&json!({
                "contextId": context_id,
                "name": name,
                "files": files,
            }))
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn context_groups(
        &self,
        project_id: ProjectId,
    ) -> Result<Vec<ContextGroup>> {
        self.get_json(
            "/api/context-groups",
            &[("projectId", project_id.to_string())],
        )
        .await
    }

    async fn test_scenarios(
        &self,
        project_id: ProjectId,
    ) -> Result<Vec<TestScenario>> {
        self.get_json(
            "/api/test-scenarios",
            &[("projectId", project_id.to_string())],
        )
        .await
    }

    async fn create_test_scenario(
        &self,
        scenario: &NewTestScenario,
    ) -> Result<TestScenario> {
        self.post_json(
            "/api/test-scenarios",
            &serde_json::to_value(scenario)?,
        )
        .await
    }

    async fn execute_test_scenario(
        &self,
        scenario_id: Uuid,
    ) -> Result<ScenarioExecution> {
        self.post_json(
            "/api/test-scenarios/execute",
            &json!({ "scenarioId": scenario_id }),
        )
        .await
    }
}
