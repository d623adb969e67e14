// providers/chatkit.rs
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::logging::{log_provider_error, ErrorLogSettings};
use crate::provider::{ensure_success, env_non_empty, EnvVar, ProviderError, ProviderInfo};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_WORKFLOW_ID: &str = "wf_69164cb6b4c88190a251d7eed0c7219e06196a28825722ba";
pub const BETA_HEADER: &str = "OpenAI-Beta";
pub const BETA_HEADER_VALUE: &str = "chatkit_beta=v1";
pub const USER_LABEL_PREFIX: &str = "portfolio-user-";
pub const MISSING_API_KEY: &str = "OPENAI_API_KEY not configured";

const PROVIDER_NAME: &str = "OpenAI";

/// How the per-session `user` label is generated.
///
/// The label only tags the session for the provider; it is not an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UserLabel {
    /// `portfolio-user-<unix millis>`, may collide under concurrent opens
    #[default]
    Timestamp,
    /// `portfolio-user-<uuid v4>`
    Random,
}

impl UserLabel {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "timestamp" => Some(Self::Timestamp),
            "uuid" | "random" => Some(Self::Random),
            _ => None,
        }
    }

    pub fn generate(self) -> String {
        match self {
            Self::Timestamp => format!(
                "{}{}",
                USER_LABEL_PREFIX,
                chrono::Utc::now().timestamp_millis()
            ),
            Self::Random => format!("{}{}", USER_LABEL_PREFIX, Uuid::new_v4()),
        }
    }
}

#[derive(Clone)]
pub struct ChatKitConfig {
    api_key: Option<String>,
    base_url: String,
    workflow_id: String,
    user_label: UserLabel,
    error_log: ErrorLogSettings,
}

impl fmt::Debug for ChatKitConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatKitConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("workflow_id", &self.workflow_id)
            .field("user_label", &self.user_label)
            .finish()
    }
}

impl ChatKitConfig {
    /// A missing key is accepted here; every session call then fails with a
    /// configuration error before touching the network.
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: DEFAULT_BASE_URL.to_string(),
            workflow_id: DEFAULT_WORKFLOW_ID.to_string(),
            user_label: UserLabel::default(),
            error_log: ErrorLogSettings::default(),
        }
    }

    pub fn from_env() -> Self {
        let mut config = Self::new(env_non_empty("OPENAI_API_KEY"));
        if let Some(url) = env_non_empty("OPENAI_BASE_URL") {
            config = config.with_base_url(url);
        }
        if let Some(id) = env_non_empty("CHATKIT_WORKFLOW_ID") {
            config = config.with_workflow_id(id);
        }
        if let Some(label) = env_non_empty("CHATKIT_USER_LABEL") {
            match UserLabel::parse(&label) {
                Some(label) => config = config.with_user_label(label),
                None => error!("Ignoring unknown CHATKIT_USER_LABEL value: {}", label),
            }
        }
        config.with_error_log(ErrorLogSettings::from_env())
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_workflow_id(mut self, id: impl Into<String>) -> Self {
        self.workflow_id = id.into();
        self
    }

    pub fn with_user_label(mut self, label: UserLabel) -> Self {
        self.user_label = label;
        self
    }

    pub fn with_error_log(mut self, settings: ErrorLogSettings) -> Self {
        self.error_log = settings;
        self
    }

    pub fn sessions_url(&self) -> String {
        format!("{}/chatkit/sessions", self.base_url)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowRef {
    pub id: String,
}

/// Body of `POST /chatkit/sessions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRequest {
    pub workflow: WorkflowRef,
    pub user: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionResponse {
    pub client_secret: String,
    #[serde(default)]
    pub expires_at: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionOperation {
    Create,
    Refresh,
}

impl SessionOperation {
    fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Refresh => "refresh",
        }
    }
}

/// Client for the hosted chat-assistant session endpoint.
pub struct ChatKitClient {
    config: ChatKitConfig,
    http: reqwest::Client,
}

impl ChatKitClient {
    pub fn new(config: ChatKitConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    pub fn from_env() -> Self {
        Self::new(ChatKitConfig::from_env())
    }

    pub fn config(&self) -> &ChatKitConfig {
        &self.config
    }

    /// Issue a brand-new session credential.
    pub async fn create_session(&self) -> Result<SessionResponse, ProviderError> {
        self.issue(SessionOperation::Create).await
    }

    /// Renew an expiring credential.
    ///
    /// The provider renews by issuing a fresh session: the outbound request is
    /// the same as [`ChatKitClient::create_session`] and `existing` is not sent.
    pub async fn refresh_session(&self, existing: &str) -> Result<SessionResponse, ProviderError> {
        debug!("Refreshing session credential ({} chars)", existing.len());
        self.issue(SessionOperation::Refresh).await
    }

    pub fn session_request(&self) -> SessionRequest {
        SessionRequest {
            workflow: WorkflowRef {
                id: self.config.workflow_id.clone(),
            },
            user: self.config.user_label.generate(),
        }
    }

    async fn issue(&self, operation: SessionOperation) -> Result<SessionResponse, ProviderError> {
        let Some(api_key) = self.config.api_key.as_deref() else {
            error!("{}", MISSING_API_KEY);
            return Err(ProviderError::Configuration(MISSING_API_KEY.to_string()));
        };

        let request = self.session_request();
        let result = self.send(api_key, &request).await;

        match &result {
            Ok(_) => info!("ChatKit session {} succeeded for {}", operation.as_str(), request.user),
            Err(e) => {
                error!("ChatKit session {} failed: {}", operation.as_str(), e);
                log_provider_error(&self.config.error_log, &request, e, "chatkit", operation.as_str());
            }
        }
        result
    }

    async fn send(&self, api_key: &str, request: &SessionRequest) -> Result<SessionResponse, ProviderError> {
        let response = self
            .http
            .post(self.config.sessions_url())
            .bearer_auth(api_key)
            .header(BETA_HEADER, BETA_HEADER_VALUE)
            .json(request)
            .send()
            .await
            .map_err(ProviderError::from_reqwest)?;

        let response = ensure_success(response, PROVIDER_NAME).await?;
        let body = response.text().await.map_err(ProviderError::from_reqwest)?;

        serde_json::from_str::<SessionResponse>(&body)
            .map_err(|e| ProviderError::Transport(format!("invalid session response: {}", e)))
    }

    pub fn info() -> ProviderInfo {
        ProviderInfo {
            name: "chatkit",
            display_name: "OpenAI ChatKit",
            env_vars: vec![
                EnvVar::required("OPENAI_API_KEY", "OpenAI API key used to issue ChatKit sessions"),
                EnvVar::optional(
                    "OPENAI_BASE_URL",
                    "OpenAI API base URL (default: https://api.openai.com/v1)",
                ),
                EnvVar::optional("CHATKIT_WORKFLOW_ID", "ChatKit workflow to run"),
                EnvVar::optional(
                    "CHATKIT_USER_LABEL",
                    "Session user label: timestamp (default) or uuid",
                ),
            ],
        }
    }
}
