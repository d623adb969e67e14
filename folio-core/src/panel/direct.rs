use async_trait::async_trait;
use folio_provider::ChatKitClient;

use super::credential::{CredentialBackend, CredentialError, CredentialOperation, SessionCredential};

/// Server-side backend: talk to the provider without going through HTTP
/// endpoints of our own.
#[async_trait]
impl CredentialBackend for ChatKitClient {
    async fn create_session(&self) -> Result<SessionCredential, CredentialError> {
        ChatKitClient::create_session(self)
            .await
            .map(|session| SessionCredential::new(session.client_secret))
            .map_err(|source| CredentialError::Provider {
                operation: CredentialOperation::Create,
                source,
            })
    }

    async fn refresh_session(
        &self,
        existing: &SessionCredential,
    ) -> Result<SessionCredential, CredentialError> {
        ChatKitClient::refresh_session(self, existing.expose())
            .await
            .map(|session| SessionCredential::new(session.client_secret))
            .map_err(|source| CredentialError::Provider {
                operation: CredentialOperation::Refresh,
                source,
            })
    }
}
