use thiserror::Error;
use tracing::warn;

/// Failure of a single outbound provider call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// A required secret or setting is missing; no request was sent.
    #[error("{0}")]
    Configuration(String),

    /// The provider answered with a non-success status.
    #[error("{provider} API error: {status}")]
    Api {
        provider: &'static str,
        status: u16,
        body: String,
    },

    /// Network failure, unreadable or malformed response body.
    #[error("{0}")]
    Transport(String),
}

impl ProviderError {
    /// Build a transport error from a reqwest failure, keeping the source chain
    /// so "error sending request" carries the underlying cause.
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        let mut message = err.to_string();
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        Self::Transport(message)
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

/// Environment variable read by a provider
#[derive(Debug, Clone)]
pub struct EnvVar {
    pub name: &'static str,
    pub description: &'static str,
    pub required: bool,
}

impl EnvVar {
    pub fn required(name: &'static str, description: &'static str) -> Self {
        Self { name, description, required: true }
    }

    pub fn optional(name: &'static str, description: &'static str) -> Self {
        Self { name, description, required: false }
    }

    pub fn is_set(&self) -> bool {
        std::env::var(self.name)
            .map(|v| !v.trim().is_empty())
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone)]
pub struct ProviderInfo {
    pub name: &'static str,
    pub display_name: &'static str,
    pub env_vars: Vec<EnvVar>,
}

impl ProviderInfo {
    /// Required variables that are not present in the process environment.
    pub fn missing_env_vars(&self) -> Vec<&'static str> {
        self.env_vars
            .iter()
            .filter(|v| v.required && !v.is_set())
            .map(|v| v.name)
            .collect()
    }
}

/// Return the response on a success status, otherwise an `Api` error carrying
/// the status and the raw body text.
pub(crate) async fn ensure_success(
    response: reqwest::Response,
    provider: &'static str,
) -> Result<reqwest::Response, ProviderError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => {
            warn!("{} returned {} with an unreadable body: {}", provider, status, e);
            format!("<unreadable response body: {}>", e)
        }
    };
    Err(ProviderError::Api { provider, status, body })
}

/// Read an env var, treating empty values as unset.
pub(crate) fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
