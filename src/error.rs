use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

pub type Result<T> = anyhow::Result<T>;

#[derive(Error, Debug)]
pub enum HookError {
    #[error("Missing X-Hub-Signature header")]
    MissingSignature,
    #[error("Invalid webhook signature")]
    InvalidSignature,
    #[error("Invalid JSON payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),
    #[error(transparent)]
    Platform(#[from] PlatformError),
}

impl HookError {
    pub fn kind(&self) -> &'static str {
        match self {
            HookError::MissingSignature | HookError::InvalidSignature => "authentication",
            HookError::InvalidPayload(_) => "validation",
            HookError::Platform(_) => "platform",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            HookError::MissingSignature | HookError::InvalidSignature => StatusCode::UNAUTHORIZED,
            HookError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            HookError::Platform(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for HookError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = json!({
            "error": {
                "kind": self.kind(),
                "message": self.to_string(),
            }
        });

        (status, Json(body)).into_response()
    }
}

/// Failures reported by the release platform or the settings store.
#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("Request to platform failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Platform answered {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Duplicate app release for {source_name} at {commit}")]
    DuplicateRelease { source_name: String, commit: String },
    #[error("{0}")]
    Rejected(String),
}
