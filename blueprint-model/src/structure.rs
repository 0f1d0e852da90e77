use serde::{Deserialize, Serialize};

use crate::decision::Severity;

/// A single structure-rule violation from `POST /api/structure-scan/trigger`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureViolation {
    pub rule: String,
    pub file: String,
    pub detail: String,
    pub severity: Severity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureScanReport {
    pub scanned_files: usize,
    pub violations: Vec<StructureViolation>,
}

impl StructureScanReport {
    pub fn violation_count(&self) -> usize {
        self.violations.len()
    }
}
