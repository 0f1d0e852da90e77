use thiserror::Error;

/// Errors produced by model constructors and validation routines.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unknown scan kind: {0}")]
    UnknownScanKind(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
