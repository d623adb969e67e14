use std::fmt;

use async_trait::async_trait;
use folio_provider::ProviderError;
use thiserror::Error;

/// Opaque `client_secret` issued by the chat provider.
///
/// Lives only in the memory of one mounted widget. `Debug` never prints it.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionCredential(String);

impl SessionCredential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionCredential(<redacted>, {} chars)", self.0.len())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialOperation {
    Create,
    Refresh,
}

impl fmt::Display for CredentialOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => f.write_str("Failed to create session"),
            Self::Refresh => f.write_str("Failed to refresh token"),
        }
    }
}

#[derive(Debug, Error)]
pub enum CredentialError {
    /// The session endpoint answered with an error payload.
    #[error("{operation}: {message}")]
    Rejected {
        operation: CredentialOperation,
        status: u16,
        message: String,
        details: Option<String>,
    },

    /// The provider call failed (direct backend).
    #[error("{operation}: {source}")]
    Provider {
        operation: CredentialOperation,
        source: ProviderError,
    },

    #[error("{operation}: {message}")]
    Transport {
        operation: CredentialOperation,
        message: String,
    },
}

impl CredentialError {
    pub fn operation(&self) -> CredentialOperation {
        match self {
            Self::Rejected { operation, .. }
            | Self::Provider { operation, .. }
            | Self::Transport { operation, .. } => *operation,
        }
    }
}

/// The callback contract the embedded chat widget calls whenever it needs a
/// credential.
#[async_trait]
pub trait CredentialBackend: Send + Sync {
    async fn create_session(&self) -> Result<SessionCredential, CredentialError>;

    async fn refresh_session(
        &self,
        existing: &SessionCredential,
    ) -> Result<SessionCredential, CredentialError>;

    /// `None` on first use, otherwise the credential the widget considers
    /// close to expiry.
    async fn client_secret(
        &self,
        existing: Option<&SessionCredential>,
    ) -> Result<SessionCredential, CredentialError> {
        match existing {
            Some(credential) => self.refresh_session(credential).await,
            None => self.create_session().await,
        }
    }
}
