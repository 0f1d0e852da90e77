//! HTTP surface for the Blueprint scan-orchestration service.

pub mod errors;
pub mod handlers;
pub mod infra;
pub mod routes;

#[cfg(test)]
mod tests;

pub use infra::app_state::AppState;
pub use infra::config::{Config, ConfigLoadError, ConfigLoader};
