use serde::{Deserialize, Serialize};

/// One NDJSON frame from the streaming `POST /api/unused-code` endpoint.
///
/// The backend emits `progress` frames while walking the project, exactly one
/// terminal `complete` or `error` frame, then closes the stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum UnusedCodeFrame {
    Progress {
        percent: u8,
        #[serde(default)]
        message: Option<String>,
    },
    Complete {
        report: UnusedCodeReport,
    },
    Error {
        error: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnusedItem {
    pub file: String,
    pub symbol: String,
    #[serde(default)]
    pub line: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnusedCodeReport {
    pub scanned_files: usize,
    pub items: Vec<UnusedItem>,
}
