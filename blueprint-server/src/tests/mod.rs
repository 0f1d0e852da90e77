//! HTTP surface tests over a stubbed backend.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use blueprint_core::{
    BackendApi, RequirementFile, Result as CoreResult, ScanExecutor,
    UnusedCodeStream,
};
use blueprint_model::{
    BlueprintEvent, Context, ContextDetail, ContextGroup, ContextId,
    NewBlueprintEvent, NewTestScenario, ProjectId, ScenarioExecution,
    ScenarioExecutionStatus, ScreenshotCapture, StructureScanReport,
    StructureViolation, TestScenario, TreeNode, TreeNodeKind,
    UnusedCodeFrame, UnusedCodeReport,
};
use blueprint_model::ScanKind;
use chrono::Utc;
use futures_util::StreamExt;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use crate::infra::app_state::AppState;
use crate::infra::config::{
    BackendConfig, Config, ProjectConfig, ServerConfig,
};
use crate::routes;

/// Backend stub with a configurable structure-scan result.
struct StubBackend {
    violations: usize,
}

#[async_trait]
impl BackendApi for StubBackend {
    async fn project_structure(
        &self,
        _project_path: &str,
    ) -> CoreResult<TreeNode> {
        Ok(TreeNode {
            name: "src".to_string(),
            path: "src".to_string(),
            kind: TreeNodeKind::Directory,
            children: Vec::new(),
        })
    }

    async fn record_event(
        &self,
        _event: &NewBlueprintEvent,
    ) -> CoreResult<()> {
        Ok(())
    }

    async fn events_for_titles(
        &self,
        _project_id: ProjectId,
        _titles: &[String],
    ) -> CoreResult<Vec<BlueprintEvent>> {
        Ok(Vec::new())
    }

    async fn trigger_structure_scan(
        &self,
        _project_path: &str,
    ) -> CoreResult<StructureScanReport> {
        Ok(StructureScanReport {
            scanned_files: 20,
            violations: (0..self.violations)
                .map(|index| StructureViolation {
                    rule: "no-deep-imports".to_string(),
                    file: format!("src/file_{index}.ts"),
                    detail: "crosses module boundary".to_string(),
                    severity: blueprint_model::Severity::Warning,
                })
                .collect(),
        })
    }

    async fn save_structure_requirement(
        &self,
        _requirement: &RequirementFile,
    ) -> CoreResult<()> {
        Ok(())
    }

    async fn capture_screenshot(
        &self,
        _project_id: ProjectId,
        route: &str,
    ) -> CoreResult<ScreenshotCapture> {
        Ok(ScreenshotCapture {
            route: route.to_string(),
            image_path: format!("/tmp/screens{route}.png"),
            captured_at: Utc::now(),
        })
    }

    async fn unused_code_scan(
        &self,
        _project_path: &str,
    ) -> CoreResult<UnusedCodeStream> {
        let frames: Vec<CoreResult<UnusedCodeFrame>> =
            vec![Ok(UnusedCodeFrame::Complete {
                report: UnusedCodeReport {
                    scanned_files: 10,
                    items: Vec::new(),
                },
            })];
        let stream: UnusedCodeStream =
            Box::pin(futures_util::stream::iter(frames));
        Ok(stream)
    }

    async fn save_unused_report(
        &self,
        _project_id: ProjectId,
        _report: &UnusedCodeReport,
    ) -> CoreResult<()> {
        Ok(())
    }

    async fn write_requirement(
        &self,
        _requirement: &RequirementFile,
    ) -> CoreResult<()> {
        Ok(())
    }

    async fn contexts(
        &self,
        _project_id: ProjectId,
    ) -> CoreResult<Vec<Context>> {
        Ok(Vec::new())
    }

    async fn context_detail(
        &self,
        context_id: ContextId,
    ) -> CoreResult<ContextDetail> {
        Ok(ContextDetail {
            context: Context {
                id: context_id,
                project_id: ProjectId::new(),
                name: "auth".to_string(),
                group_id: None,
                file_count: 1,
                updated_at: Utc::now(),
            },
            files: vec!["src/app/page.tsx".to_string()],
        })
    }

    async fn create_context(
        &self,
        project_id: ProjectId,
        name: &str,
        files: &[String],
    ) -> CoreResult<Context> {
        Ok(Context {
            id: ContextId::new(),
            project_id,
            name: name.to_string(),
            group_id: None,
            file_count: files.len(),
            updated_at: Utc::now(),
        })
    }

    async fn update_context(
        &self,
        context_id: ContextId,
        name: &str,
        files: &[String],
    ) -> CoreResult<Context> {
        Ok(Context {
            id: context_id,
            project_id: ProjectId::new(),
            name: name.to_string(),
            group_id: None,
            file_count: files.len(),
            updated_at: Utc::now(),
        })
    }

    async fn context_groups(
        &self,
        _project_id: ProjectId,
    ) -> CoreResult<Vec<ContextGroup>> {
        Ok(Vec::new())
    }

    async fn test_scenarios(
        &self,
        _project_id: ProjectId,
    ) -> CoreResult<Vec<TestScenario>> {
        Ok(Vec::new())
    }

    async fn create_test_scenario(
        &self,
        scenario: &NewTestScenario,
    ) -> CoreResult<TestScenario> {
        Ok(TestScenario {
            id: Uuid::new_v4(),
            project_id: scenario.project_id,
            name: scenario.name.clone(),
            steps: scenario.steps.clone(),
            route: scenario.route.clone(),
        })
    }

    async fn execute_test_scenario(
        &self,
        scenario_id: Uuid,
    ) -> CoreResult<ScenarioExecution> {
        Ok(ScenarioExecution {
            scenario_id,
            status: ScenarioExecutionStatus::Passed,
            screenshot: None,
            diff_path: None,
        })
    }
}

fn test_config(framework: Option<&str>) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        backend: BackendConfig {
            base_url: "http://localhost:3000".to_string(),
        },
        project: ProjectConfig {
            id: None,
            name: "demo".to_string(),
            path: "/srv/demo".to_string(),
            framework: framework.map(str::to_string),
        },
    }
}

fn app(violations: usize, framework: Option<&str>) -> Router {
    let api: Arc<dyn BackendApi> = Arc::new(StubBackend { violations });
    let executor = Arc::new(ScanExecutor::standard(api));
    let state =
        AppState::new(Arc::new(test_config(framework)), executor);
    routes::create_api_router().with_state(state)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn health_reports_success() {
    let response = app(0, None).oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "success");
}

#[tokio::test]
async fn unknown_scan_kind_is_a_404() {
    let response = app(0, None)
        .oneshot(post("/api/v1/scans/telemetry/start"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn statuses_cover_every_scan_kind() {
    let response =
        app(0, None).oneshot(get("/api/v1/scans/status")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["statuses"].as_array().unwrap().len(), 7);
}

#[tokio::test]
async fn structure_scan_flows_into_the_decision_queue() {
    let app = app(12, None);

    let response = app
        .clone()
        .oneshot(post("/api/v1/scans/structure/start"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["data"]["decision_queued"].is_string());

    let response = app
        .clone()
        .oneshot(get("/api/v1/decisions/current"))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["current"]["count"], 12);
    assert_eq!(body["data"]["current"]["severity"], "warning");

    let response = app
        .clone()
        .oneshot(post("/api/v1/decisions/accept"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["consumed"]["count"], 12);
    assert!(body["data"]["current"].is_null());
}

#[tokio::test]
async fn clean_structure_scan_queues_nothing() {
    let app = app(0, None);
    let response = app
        .clone()
        .oneshot(post("/api/v1/scans/structure/start"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["data"]["decision_queued"].is_null());

    let response =
        app.oneshot(get("/api/v1/decisions/current")).await.unwrap();
    let body = body_json(response).await;
    assert!(body["data"]["current"].is_null());
}

#[tokio::test]
async fn unused_scan_on_non_nextjs_project_is_rejected_verbatim() {
    let response = app(0, Some("vite"))
        .oneshot(post("/api/v1/scans/unused-code/start"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(
        body["error"],
        "Unused code scan only supports Next.js projects"
    );
}

#[tokio::test]
async fn accept_on_an_empty_queue_is_a_no_op() {
    let response = app(0, None)
        .oneshot(post("/api/v1/decisions/accept"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["data"]["consumed"].is_null());
}

#[tokio::test]
async fn context_scoped_scan_without_context_is_a_bad_request() {
    let response = app(0, Some("nextjs"))
        .oneshot(post("/api/v1/scans/vision/start"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn progress_stream_emits_ordered_scan_progress_events() {
    let api: Arc<dyn BackendApi> = Arc::new(StubBackend { violations: 0 });
    let executor = Arc::new(ScanExecutor::standard(api));
    let state = AppState::new(
        Arc::new(test_config(None)),
        Arc::clone(&executor),
    );
    let app = routes::create_api_router().with_state(state);

    // Subscribe before the scan so every frame lands in the stream.
    let response =
        app.oneshot(get("/api/v1/scans/progress")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get(axum::http::header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(content_type.starts_with("text/event-stream"));

    let project = test_config(None).project();
    executor.execute(ScanKind::Build, project, None).await.unwrap();

    let mut body = response.into_body().into_data_stream();
    let raw = tokio::time::timeout(Duration::from_secs(5), async {
        // The build check paces four progress frames, one per step.
        let mut raw = String::new();
        while raw.matches("event: scan-progress").count() < 4 {
            let chunk = body.next().await.expect("stream ended").unwrap();
            raw.push_str(std::str::from_utf8(&chunk).unwrap());
        }
        raw
    })
    .await
    .expect("progress events never arrived");

    let ids: Vec<u64> = raw
        .lines()
        .filter_map(|line| line.strip_prefix("id: "))
        .map(|id| id.parse().unwrap())
        .collect();
    assert!(ids.len() >= 4);
    assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));

    let frame: Value = raw
        .lines()
        .find_map(|line| line.strip_prefix("data: "))
        .map(|data| serde_json::from_str(data).unwrap())
        .unwrap();
    assert_eq!(frame["kind"], "build");
    assert!(frame["run_id"].is_string());
    assert!(frame["sequence"].is_u64());
    assert!(frame["progress"].as_u64().unwrap() <= 100);
}

#[tokio::test]
async fn selecting_a_scan_queues_a_confirmation_and_accept_runs_it() {
    let app = app(0, None);

    let response = app
        .clone()
        .oneshot(post("/api/v1/scans/build/select"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["state"], "selected");
    assert!(body["data"]["decision_queued"].is_string());

    let response = app
        .clone()
        .oneshot(get("/api/v1/decisions/current"))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["current"]["title"], "Run Build Check?");

    let response = app
        .clone()
        .oneshot(post("/api/v1/decisions/accept"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["consumed"]["title"], "Run Build Check?");
    // The scan ran; its outcome notification is now current.
    assert_eq!(body["data"]["current"]["title"], "Build check completed");

    let response = app
        .clone()
        .oneshot(get("/api/v1/scans/build/status"))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["progress"], 100);
    assert!(body["data"]["last_run"].is_string());

    let response =
        app.oneshot(get("/api/v1/scans/selection")).await.unwrap();
    let body = body_json(response).await;
    let build = body["data"]["selections"]
        .as_array()
        .unwrap()
        .iter()
        .find(|selection| selection["kind"] == "build")
        .cloned()
        .unwrap();
    assert_eq!(build["state"], "completed");
}

#[tokio::test]
async fn rejecting_the_confirmation_leaves_the_selection_idle() {
    let app = app(12, None);
    app.clone()
        .oneshot(post("/api/v1/scans/structure/select"))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(post("/api/v1/decisions/reject"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get("/api/v1/scans/selection"))
        .await
        .unwrap();
    let body = body_json(response).await;
    let structure = body["data"]["selections"]
        .as_array()
        .unwrap()
        .iter()
        .find(|selection| selection["kind"] == "structure")
        .cloned()
        .unwrap();
    assert_eq!(structure["state"], "idle");

    // The scan never ran.
    let response = app
        .oneshot(get("/api/v1/scans/structure/status"))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert!(body["data"]["last_run"].is_null());
}

#[tokio::test]
async fn context_scoped_selection_waits_for_a_context() {
    let app = app(0, Some("nextjs"));

    let response = app
        .clone()
        .oneshot(post("/api/v1/scans/vision/select"))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["state"], "awaiting-context");
    assert!(body["data"]["decision_queued"].is_null());

    let context_id = Uuid::new_v4();
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/scans/vision/select")
        .header("content-type", "application/json")
        .body(Body::from(format!(r#"{{"context_id":"{context_id}"}}"#)))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["state"], "selected");
    assert!(body["data"]["decision_queued"].is_string());

    let response = app
        .oneshot(get("/api/v1/decisions/current"))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(
        body["data"]["current"]["title"],
        "Run Vision Analysis?"
    );
}

#[tokio::test]
async fn last_runs_start_empty_and_fill_after_a_scan() {
    let app = app(0, None);
    let response = app
        .clone()
        .oneshot(get("/api/v1/events/last-runs"))
        .await
        .unwrap();
    let body = body_json(response).await;
    let runs = body["data"]["last_runs"].as_array().unwrap().clone();
    assert_eq!(runs.len(), 7);
    assert!(runs.iter().all(|run| run["days_ago"].is_null()));

    app.clone()
        .oneshot(post("/api/v1/scans/structure/start"))
        .await
        .unwrap();
    let response =
        app.oneshot(get("/api/v1/events/last-runs")).await.unwrap();
    let body = body_json(response).await;
    let structure = body["data"]["last_runs"]
        .as_array()
        .unwrap()
        .iter()
        .find(|run| run["kind"] == "structure")
        .cloned()
        .unwrap();
    assert_eq!(structure["days_ago"], 0);
}
