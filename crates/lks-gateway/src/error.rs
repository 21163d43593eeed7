use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Failure of a single outbound call to the upstream API.
#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("upstream request timed out: {0}")]
    Timeout(#[source] reqwest::Error),
    #[error("upstream connection failed: {0}")]
    Connect(#[source] reqwest::Error),
    #[error("upstream response could not be decoded: {0}")]
    Decode(String),
    #[error("upstream request failed: {0}")]
    Request(#[source] reqwest::Error),
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err)
        } else if err.is_connect() {
            Self::Connect(err)
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Request(err)
        }
    }
}

impl From<serde_json::Error> for UpstreamError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Error responses produced by the gateway, rendered as `{"error": ...}`.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Email already exists")]
    EmailExists,
    #[error("API Gateway unreachable")]
    GatewayUnreachable,
    #[error("Failed connect to API")]
    CreateFailed,
    #[error("API unreachable")]
    ApiUnreachable,
    #[error("{0}")]
    Storage(#[from] lks_storage::StorageError),
    #[error("Failed to update user")]
    UpdateFailed(StatusCode),
    #[error("Unexpected empty response")]
    UnexpectedResponse(StatusCode),
    #[error("Missing form field: {0}")]
    MissingField(&'static str),
    #[error("{message}")]
    InvalidForm { status: StatusCode, message: String },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::EmailExists => StatusCode::CONFLICT,
            Self::GatewayUnreachable | Self::CreateFailed | Self::ApiUnreachable | Self::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::UpdateFailed(status) | Self::UnexpectedResponse(status) => *status,
            Self::MissingField(_) => StatusCode::BAD_REQUEST,
            Self::InvalidForm { status, .. } => *status,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
