//! Static scan registry.
//!
//! The dashboard's original registry resolved scan ids to dynamically
//! imported modules at runtime; a typo'd id silently dispatched nothing.
//! Here the table is a compile-time array keyed by [`ScanKind`], and the
//! audit-log `event_title`s double as the reverse index used when hydrating
//! "last run" timestamps from the backend event log.

use blueprint_model::ScanKind;

/// Static metadata for one scan kind. Immutable for the whole session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanDescriptor {
    pub kind: ScanKind,
    pub label: &'static str,
    /// Title written to the audit-event log when a decision for this scan
    /// is accepted. Scans without a title are not audited.
    pub event_title: Option<&'static str>,
    /// Whether the scan must be scoped to a user-curated context.
    pub context_needed: bool,
}

const DESCRIPTORS: [ScanDescriptor; 7] = [
    ScanDescriptor {
        kind: ScanKind::Structure,
        label: "Structure Scan",
        event_title: Some("Structure Scan"),
        context_needed: false,
    },
    ScanDescriptor {
        kind: ScanKind::Vision,
        label: "Vision Analysis",
        event_title: Some("Vision Analysis"),
        context_needed: true,
    },
    ScanDescriptor {
        kind: ScanKind::Contexts,
        label: "Context Review",
        event_title: Some("Context Review"),
        context_needed: false,
    },
    ScanDescriptor {
        kind: ScanKind::Build,
        label: "Build Check",
        event_title: Some("Build Check"),
        context_needed: false,
    },
    ScanDescriptor {
        kind: ScanKind::Photo,
        label: "Photo Capture",
        event_title: Some("Photo Capture"),
        context_needed: true,
    },
    ScanDescriptor {
        kind: ScanKind::UnusedCode,
        label: "Unused Code Scan",
        event_title: Some("Unused Code Scan"),
        context_needed: false,
    },
    ScanDescriptor {
        kind: ScanKind::TestGeneration,
        label: "Test Generation",
        event_title: Some("Test Generation"),
        context_needed: false,
    },
];

#[derive(Debug, Clone, Copy, Default)]
pub struct ScanRegistry;

impl ScanRegistry {
    pub fn new() -> Self {
        ScanRegistry
    }

    pub fn get(&self, kind: ScanKind) -> &'static ScanDescriptor {
        match kind {
            ScanKind::Structure => &DESCRIPTORS[0],
            ScanKind::Vision => &DESCRIPTORS[1],
            ScanKind::Contexts => &DESCRIPTORS[2],
            ScanKind::Build => &DESCRIPTORS[3],
            ScanKind::Photo => &DESCRIPTORS[4],
            ScanKind::UnusedCode => &DESCRIPTORS[5],
            ScanKind::TestGeneration => &DESCRIPTORS[6],
        }
    }

    pub fn descriptors(&self) -> &'static [ScanDescriptor] {
        &DESCRIPTORS
    }

    /// Reverse lookup used by event-log hydration.
    pub fn kind_for_event_title(&self, title: &str) -> Option<ScanKind> {
        DESCRIPTORS
            .iter()
            .find(|descriptor| descriptor.event_title == Some(title))
            .map(|descriptor| descriptor.kind)
    }

    pub fn known_event_titles(&self) -> Vec<&'static str> {
        DESCRIPTORS
            .iter()
            .filter_map(|descriptor| descriptor.event_title)
            .collect()
    }
}
