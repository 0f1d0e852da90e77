use serde::{Deserialize, Serialize};

use crate::ids::DecisionId;
use crate::scan::ScanKind;

/// How serious a finding is; drives the dashboard's decision styling.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Explicit decision variant.
///
/// `Confirm` carries accept/reject semantics; `Notify` renders a single
/// dismiss action that maps to reject. The original dashboard inferred this
/// by substring-matching on type names, which this tag replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionKind {
    Confirm,
    Notify,
}

/// Read-only projection of a queued decision, safe to serialize to clients.
///
/// The callbacks live with the queue in `blueprint-core`; this view is what
/// the HTTP surface exposes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionView {
    pub id: DecisionId,
    pub kind: DecisionKind,
    pub scan: ScanKind,
    pub title: String,
    pub description: String,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}
