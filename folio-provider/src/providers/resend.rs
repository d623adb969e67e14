// providers/resend.rs
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::logging::{log_provider_error, ErrorLogSettings};
use crate::provider::{ensure_success, env_non_empty, EnvVar, ProviderError, ProviderInfo};

pub const DEFAULT_BASE_URL: &str = "https://api.resend.com";
/// Value shipped in sample env files; treated as unset.
pub const PLACEHOLDER_API_KEY: &str = "your_resend_api_key_here";

const PROVIDER_NAME: &str = "Resend";

#[derive(Clone)]
pub struct ResendConfig {
    api_key: Option<String>,
    base_url: String,
    error_log: ErrorLogSettings,
}

impl fmt::Debug for ResendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResendConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl ResendConfig {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key: api_key.filter(|k| {
                let k = k.trim();
                !k.is_empty() && k != PLACEHOLDER_API_KEY
            }),
            base_url: DEFAULT_BASE_URL.to_string(),
            error_log: ErrorLogSettings::default(),
        }
    }

    pub fn from_env() -> Self {
        let mut config = Self::new(env_non_empty("RESEND_API_KEY"));
        if let Some(url) = env_non_empty("RESEND_BASE_URL") {
            config = config.with_base_url(url);
        }
        config.with_error_log(ErrorLogSettings::from_env())
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_error_log(mut self, settings: ErrorLogSettings) -> Self {
        self.error_log = settings;
        self
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn emails_url(&self) -> String {
        format!("{}/emails", self.base_url)
    }
}

/// Body of `POST /emails`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: Vec<String>,
    pub reply_to: String,
    pub subject: String,
    pub html: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SendReceipt {
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResendErrorBody {
    message: String,
}

/// Extract the human readable `message` from a Resend error body, falling back
/// to the raw text.
pub fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ResendErrorBody>(body)
        .map(|b| b.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

/// Transactional email client.
pub struct ResendClient {
    config: ResendConfig,
    http: reqwest::Client,
}

impl ResendClient {
    pub fn new(config: ResendConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(ResendConfig::from_env())
    }

    pub fn config(&self) -> &ResendConfig {
        &self.config
    }

    pub async fn send(&self, email: &OutgoingEmail) -> Result<SendReceipt, ProviderError> {
        let Some(api_key) = self.config.api_key.as_deref() else {
            error!("RESEND_API_KEY is not configured");
            return Err(ProviderError::Configuration(
                "RESEND_API_KEY not configured".to_string(),
            ));
        };

        let result = async {
            let response = self
                .http
                .post(self.config.emails_url())
                .bearer_auth(api_key)
                .json(email)
                .send()
                .await
                .map_err(ProviderError::from_reqwest)?;

            let response = ensure_success(response, PROVIDER_NAME).await?;
            let body = response.text().await.map_err(ProviderError::from_reqwest)?;
            serde_json::from_str::<SendReceipt>(&body)
                .map_err(|e| ProviderError::Transport(format!("invalid send response: {}", e)))
        }
        .await;

        match &result {
            Ok(receipt) => info!("Email sent: {:?}", receipt.id),
            Err(e) => {
                error!("Resend error: {}", e);
                log_provider_error(&self.config.error_log, email, e, "resend", "send");
            }
        }
        result
    }

    pub fn info() -> ProviderInfo {
        ProviderInfo {
            name: "resend",
            display_name: "Resend",
            env_vars: vec![
                EnvVar::required("RESEND_API_KEY", "Resend API key for the contact form"),
                EnvVar::optional(
                    "RESEND_BASE_URL",
                    "Resend API base URL (default: https://api.resend.com)",
                ),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_key_is_not_configured() {
        assert!(!ResendConfig::new(Some(PLACEHOLDER_API_KEY.into())).is_configured());
        assert!(!ResendConfig::new(Some("".into())).is_configured());
        assert!(!ResendConfig::new(None).is_configured());
        assert!(ResendConfig::new(Some("re_123".into())).is_configured());
    }

    #[test]
    fn error_message_prefers_json_message() {
        let body = r#"{"statusCode":422,"message":"Invalid `to` field","name":"validation_error"}"#;
        assert_eq!(api_error_message(body), "Invalid `to` field");
        assert_eq!(api_error_message(" gateway timeout \n"), "gateway timeout");
    }

    #[tokio::test]
    async fn send_without_key_is_configuration_error() {
        let client = ResendClient::new(ResendConfig::new(None).with_base_url("http://127.0.0.1:9"));
        let email = OutgoingEmail {
            from: "Portfolio <noreply@example.com>".into(),
            to: vec!["owner@example.com".into()],
            reply_to: "visitor@example.com".into(),
            subject: "hi".into(),
            html: "<p>hi</p>".into(),
        };
        assert!(client.send(&email).await.unwrap_err().is_configuration());
    }
}
