use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::ids::ScanRunId;

/// The closed set of scans the dashboard can dispatch.
///
/// The wire ids (`structure`, `vision`, ...) match what the dashboard and
/// the audit log use; parsing an unknown id fails at this boundary instead
/// of silently dispatching nothing.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum ScanKind {
    Structure,
    Vision,
    Contexts,
    Build,
    Photo,
    UnusedCode,
    TestGeneration,
}

impl ScanKind {
    pub const ALL: [ScanKind; 7] = [
        ScanKind::Structure,
        ScanKind::Vision,
        ScanKind::Contexts,
        ScanKind::Build,
        ScanKind::Photo,
        ScanKind::UnusedCode,
        ScanKind::TestGeneration,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScanKind::Structure => "structure",
            ScanKind::Vision => "vision",
            ScanKind::Contexts => "contexts",
            ScanKind::Build => "build",
            ScanKind::Photo => "photo",
            ScanKind::UnusedCode => "unused-code",
            ScanKind::TestGeneration => "test-generation",
        }
    }
}

impl FromStr for ScanKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "structure" => Ok(ScanKind::Structure),
            "vision" => Ok(ScanKind::Vision),
            "contexts" => Ok(ScanKind::Contexts),
            "build" => Ok(ScanKind::Build),
            "photo" => Ok(ScanKind::Photo),
            "unused-code" => Ok(ScanKind::UnusedCode),
            "test-generation" => Ok(ScanKind::TestGeneration),
            other => Err(ModelError::UnknownScanKind(other.to_string())),
        }
    }
}

impl std::fmt::Display for ScanKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-kind bookkeeping mutated by the executor lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanStatus {
    pub kind: ScanKind,
    pub last_run: Option<DateTime<Utc>>,
    pub is_running: bool,
    pub progress: u8,
    pub has_error: bool,
    pub error_message: Option<String>,
}

impl ScanStatus {
    pub fn idle(kind: ScanKind) -> Self {
        ScanStatus {
            kind,
            last_run: None,
            is_running: false,
            progress: 0,
            has_error: false,
            error_message: None,
        }
    }

    /// Whole days elapsed since the last completed run, `None` if never run.
    pub fn days_since_last_run(&self, now: DateTime<Utc>) -> Option<i64> {
        self.last_run
            .map(|last| (now - last).num_days().max(0))
    }
}

/// One frame of scan progress, broadcast to observers in sequence order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanProgressEvent {
    pub run_id: ScanRunId,
    pub kind: ScanKind,
    pub sequence: u64,
    pub progress: u8,
    pub message: Option<String>,
    pub emitted_at: DateTime<Utc>,
}
