use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::credential::{CredentialBackend, CredentialError, CredentialOperation, SessionCredential};

pub const SESSION_PATH: &str = "/api/chatkit/session";
pub const REFRESH_PATH: &str = "/api/chatkit/refresh";

#[derive(Serialize)]
struct RefreshBody<'a> {
    token: &'a str,
}

#[derive(Deserialize)]
struct ClientSecretBody {
    client_secret: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
    #[serde(default)]
    details: Option<String>,
}

/// Credential backend that calls the site's own session endpoints, the way
/// the browser widget does.
pub struct HttpCredentialBackend {
    base_url: String,
    http: reqwest::Client,
}

impl HttpCredentialBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    async fn post(
        &self,
        operation: CredentialOperation,
        request: reqwest::RequestBuilder,
    ) -> Result<SessionCredential, CredentialError> {
        let transport = |message: String| CredentialError::Transport { operation, message };

        let response = request
            .send()
            .await
            .map_err(|e| transport(e.to_string()))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| transport(e.to_string()))?;

        if !status.is_success() {
            let (message, details) = match serde_json::from_str::<ErrorBody>(&body) {
                Ok(err) => (err.error, err.details),
                Err(_) => (body, None),
            };
            error!("{}: {} ({})", operation, message, status);
            return Err(CredentialError::Rejected {
                operation,
                status: status.as_u16(),
                message,
                details,
            });
        }

        let ClientSecretBody { client_secret } =
            serde_json::from_str(&body).map_err(|e| transport(e.to_string()))?;
        Ok(SessionCredential::new(client_secret))
    }
}

#[async_trait]
impl CredentialBackend for HttpCredentialBackend {
    async fn create_session(&self) -> Result<SessionCredential, CredentialError> {
        debug!("Creating new session...");
        let request = self
            .http
            .post(format!("{}{}", self.base_url, SESSION_PATH))
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        self.post(CredentialOperation::Create, request).await
    }

    async fn refresh_session(
        &self,
        existing: &SessionCredential,
    ) -> Result<SessionCredential, CredentialError> {
        debug!("Refreshing token...");
        let request = self
            .http
            .post(format!("{}{}", self.base_url, REFRESH_PATH))
            .json(&RefreshBody {
                token: existing.expose(),
            });
        self.post(CredentialOperation::Refresh, request).await
    }
}
