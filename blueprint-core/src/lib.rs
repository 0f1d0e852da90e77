//! Core library for Blueprint: scan dispatch, status tracking, the decision
//! queue, and the backend API client the handlers talk through.
#![allow(missing_docs)]

pub mod client;
pub mod decision;
pub mod error;
pub mod events;
pub mod executor;
pub mod registry;
pub mod requirement;
pub mod scans;
pub mod selection;
pub mod status;

pub use client::{BackendApi, BackendClient, UnusedCodeStream};
pub use decision::{Decision, DecisionCallback, DecisionQueue, callback};
pub use error::{BlueprintError, Result};
pub use executor::{ScanExecutor, ScanReport};
pub use registry::{ScanDescriptor, ScanRegistry};
pub use requirement::RequirementFile;
pub use scans::{HandlerSet, ScanHandler, ScanInput, ScanOutcome};
pub use selection::{
    ScanSelection, SelectOutcome, SelectionService, SelectionState,
    SelectionView,
};
pub use status::{ProgressSink, StatusStore};
