//! Per-scan status bookkeeping and progress fan-out.
//!
//! Status is keyed per [`ScanKind`]; two different scans may run
//! concurrently, each owning its own slot, but starting a kind that is
//! already running is rejected instead of silently resetting the first
//! run's bookkeeping.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use blueprint_model::{ScanKind, ScanProgressEvent, ScanRunId, ScanStatus};
use chrono::{DateTime, Utc};
use tokio::sync::{RwLock, broadcast};
use tracing::debug;

use crate::error::{BlueprintError, Result};

const PROGRESS_BROADCAST_CAPACITY: usize = 256;

#[derive(Debug)]
pub struct StatusStore {
    statuses: RwLock<HashMap<ScanKind, ScanStatus>>,
    progress_tx: broadcast::Sender<ScanProgressEvent>,
    sequence: AtomicU64,
}

impl Default for StatusStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusStore {
    pub fn new() -> Self {
        let (progress_tx, _) = broadcast::channel(PROGRESS_BROADCAST_CAPACITY);
        let statuses = ScanKind::ALL
            .into_iter()
            .map(|kind| (kind, ScanStatus::idle(kind)))
            .collect();
        StatusStore {
            statuses: RwLock::new(statuses),
            progress_tx,
            sequence: AtomicU64::new(0),
        }
    }

    pub async fn status(&self, kind: ScanKind) -> ScanStatus {
        let statuses = self.statuses.read().await;
        statuses
            .get(&kind)
            .cloned()
            .unwrap_or_else(|| ScanStatus::idle(kind))
    }

    pub async fn snapshot(&self) -> Vec<ScanStatus> {
        let statuses = self.statuses.read().await;
        let mut all: Vec<ScanStatus> = ScanKind::ALL
            .into_iter()
            .filter_map(|kind| statuses.get(&kind).cloned())
            .collect();
        all.sort_by_key(|status| status.kind);
        all
    }

    /// Marks a scan running and hands back the run id for progress frames.
    pub async fn start_scan(&self, kind: ScanKind) -> Result<ScanRunId> {
        let mut statuses = self.statuses.write().await;
        let status =
            statuses.entry(kind).or_insert_with(|| ScanStatus::idle(kind));
        if status.is_running {
            return Err(BlueprintError::AlreadyRunning(kind));
        }
        status.is_running = true;
        status.progress = 0;
        status.has_error = false;
        status.error_message = None;
        let run_id = ScanRunId::new();
        debug!(%kind, %run_id, "scan started");
        Ok(run_id)
    }

    /// Progress is clamped to 100 but not forced monotonic; implementations
    /// report by convention.
    pub async fn update_progress(
        &self,
        kind: ScanKind,
        run_id: ScanRunId,
        progress: u8,
        message: Option<String>,
    ) {
        let progress = progress.min(100);
        {
            let mut statuses = self.statuses.write().await;
            if let Some(status) = statuses.get_mut(&kind) {
                if !status.is_running {
                    return;
                }
                status.progress = progress;
            }
        }
        let event = ScanProgressEvent {
            run_id,
            kind,
            sequence: self.sequence.fetch_add(1, Ordering::Relaxed) + 1,
            progress,
            message,
            emitted_at: Utc::now(),
        };
        // Nobody listening is fine; frames are advisory.
        let _ = self.progress_tx.send(event);
    }

    pub async fn complete_scan(&self, kind: ScanKind) -> DateTime<Utc> {
        let now = Utc::now();
        let mut statuses = self.statuses.write().await;
        if let Some(status) = statuses.get_mut(&kind) {
            status.is_running = false;
            status.progress = 100;
            status.has_error = false;
            status.error_message = None;
            status.last_run = Some(now);
        }
        now
    }

    pub async fn fail_scan(&self, kind: ScanKind, message: impl Into<String>) {
        let mut statuses = self.statuses.write().await;
        if let Some(status) = statuses.get_mut(&kind) {
            status.is_running = false;
            status.has_error = true;
            status.error_message = Some(message.into());
        }
    }

    /// Manual-retry entry: clears the error banner state before re-execute.
    pub async fn clear_error(&self, kind: ScanKind) {
        let mut statuses = self.statuses.write().await;
        if let Some(status) = statuses.get_mut(&kind) {
            status.has_error = false;
            status.error_message = None;
        }
    }

    /// Hydration path: only moves `last_run` forward, never backwards.
    pub async fn record_last_run(
        &self,
        kind: ScanKind,
        at: DateTime<Utc>,
    ) {
        let mut statuses = self.statuses.write().await;
        if let Some(status) = statuses.get_mut(&kind) {
            match status.last_run {
                Some(existing) if existing >= at => {}
                _ => status.last_run = Some(at),
            }
        }
    }

    pub async fn days_since_last_run(&self, kind: ScanKind) -> Option<i64> {
        self.status(kind).await.days_since_last_run(Utc::now())
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ScanProgressEvent> {
        self.progress_tx.subscribe()
    }
}

/// Handle a running scan uses to push progress frames for its own run.
#[derive(Debug, Clone)]
pub struct ProgressSink {
    store: Arc<StatusStore>,
    kind: ScanKind,
    run_id: ScanRunId,
}

impl ProgressSink {
    pub fn new(store: Arc<StatusStore>, kind: ScanKind, run_id: ScanRunId) -> Self {
        ProgressSink {
            store,
            kind,
            run_id,
        }
    }

    pub async fn update(&self, progress: u8) {
        self.store
            .update_progress(self.kind, self.run_id, progress, None)
            .await;
    }

    pub async fn update_with_message(
        &self,
        progress: u8,
        message: impl Into<String>,
    ) {
        self.store
            .update_progress(
                self.kind,
                self.run_id,
                progress,
                Some(message.into()),
            )
            .await;
    }

    pub fn run_id(&self) -> ScanRunId {
        self.run_id
    }
}
