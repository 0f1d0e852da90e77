use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use blueprint_core::BlueprintError;
use blueprint_model::ApiResponse;

/// HTTP projection of engine errors.
#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    message: String,
}

impl HttpError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        HttpError {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

impl From<BlueprintError> for HttpError {
    fn from(error: BlueprintError) -> Self {
        let status = match &error {
            BlueprintError::NotFound(_) => StatusCode::NOT_FOUND,
            BlueprintError::Validation(_) => StatusCode::BAD_REQUEST,
            BlueprintError::AlreadyRunning(_) => StatusCode::CONFLICT,
            BlueprintError::ScanFailed(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            BlueprintError::Network(_) | BlueprintError::Http { .. } => {
                StatusCode::BAD_GATEWAY
            }
            BlueprintError::Callback(_)
            | BlueprintError::Serialization(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        HttpError {
            status,
            message: error.surface_message(),
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> axum::response::Response {
        let payload = Json(ApiResponse::<()>::error(self.message));
        (self.status, payload).into_response()
    }
}
