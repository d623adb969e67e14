use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use folio_provider::ProviderError;
use serde::{Deserialize, Serialize};

/// JSON error payload returned by every endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// An endpoint failure, rendered as `ErrorResponse` with its status code.
#[derive(Debug, Clone)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorResponse {
                error: error.into(),
                details: None,
            },
        }
    }

    pub fn internal(error: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, error)
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.body.details = Some(details.into());
        self
    }

    /// Map a provider failure. `failure` is the message used for transport
    /// errors, e.g. "Failed to create session".
    pub fn from_provider(err: ProviderError, failure: &str) -> Self {
        match err {
            ProviderError::Configuration(message) => Self::internal(message),
            ProviderError::Api { provider, status, body } => {
                let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
                Self::new(status, format!("{} API error: {}", provider, status.as_u16()))
                    .with_details(body)
            }
            ProviderError::Transport(cause) => Self::internal(failure).with_details(cause),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &ErrorResponse {
        &self.body
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
