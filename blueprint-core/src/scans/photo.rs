use std::sync::Arc;

use async_trait::async_trait;
use blueprint_model::ScanKind;

use super::{ScanHandler, ScanInput, ScanOutcome, route_for_page_file};
use crate::client::BackendApi;
use crate::error::{BlueprintError, Result};
use crate::status::ProgressSink;

/// Screenshot capture for every route the selected context touches.
pub struct PhotoScan {
    api: Arc<dyn BackendApi>,
}

impl PhotoScan {
    pub fn new(api: Arc<dyn BackendApi>) -> Self {
        PhotoScan { api }
    }
}

#[async_trait]
impl ScanHandler for PhotoScan {
    fn kind(&self) -> ScanKind {
        ScanKind::Photo
    }

    async fn run(
        &self,
        input: &ScanInput,
        progress: &ProgressSink,
    ) -> Result<ScanOutcome> {
        let context = input.context.as_ref().ok_or_else(|| {
            BlueprintError::Validation(
                "photo scan requires a context".to_string(),
            )
        })?;

        let mut routes: Vec<String> = context
            .files
            .iter()
            .filter_map(|file| route_for_page_file(file))
            .collect();
        routes.sort();
        routes.dedup();
        if routes.is_empty() {
            routes.push("/".to_string());
        }

        let mut captures = Vec::with_capacity(routes.len());
        for (index, route) in routes.iter().enumerate() {
            progress
                .update_with_message(
                    (((index + 1) * 100) / routes.len()).min(100) as u8,
                    format!("capturing {route}"),
                )
                .await;
            let capture = self
                .api
                .capture_screenshot(input.project.id, route)
                .await?;
            captures.push(capture);
        }
        Ok(ScanOutcome::Photo(captures))
    }
}
