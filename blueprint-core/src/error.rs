use blueprint_model::ScanKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BlueprintError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("http status {status}: {message}")]
    Http { status: u16, message: String },

    #[error("validation error: {0}")]
    Validation(String),

    #[error("callback error: {0}")]
    Callback(String),

    #[error("scan already running: {0}")]
    AlreadyRunning(ScanKind),

    // Displays the bare message so the failure surfaces verbatim in
    // status banners and API error fields.
    #[error("{0}")]
    ScanFailed(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BlueprintError {
    /// Message suitable for `ScanStatus::error_message` and API error fields.
    pub fn surface_message(&self) -> String {
        self.to_string()
    }
}

pub type Result<T> = std::result::Result<T, BlueprintError>;
