use serde::{Deserialize, Serialize};

/// Success body of both chat session endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSecretResponse {
    pub client_secret: String,
}

/// The token is optional: the provider renews by issuing a new session, so a
/// body without it still gets one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshRequest {
    #[serde(default)]
    pub token: Option<String>,
}
