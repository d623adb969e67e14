use std::sync::Arc;

use tracing::{debug, info, warn};

use super::credential::{CredentialBackend, CredentialError, SessionCredential};
use super::lifecycle::{MountId, WidgetMount};

/// Open/closed state of the floating chat overlay.
pub enum PanelState {
    Closed,
    Open(WidgetMount),
}

/// A credential fetch issued on behalf of one mount.
///
/// Awaiting [`CredentialRequest::send`] does not borrow the panel, so the
/// panel can be closed while the request is in flight.
pub struct CredentialRequest<B: ?Sized> {
    mount: MountId,
    existing: Option<SessionCredential>,
    backend: Arc<B>,
}

impl<B: CredentialBackend + ?Sized> CredentialRequest<B> {
    pub fn mount(&self) -> MountId {
        self.mount
    }

    pub fn is_refresh(&self) -> bool {
        self.existing.is_some()
    }

    pub async fn send(self) -> CredentialOutcome {
        let result = self.backend.client_secret(self.existing.as_ref()).await;
        CredentialOutcome {
            mount: self.mount,
            result,
        }
    }
}

pub struct CredentialOutcome {
    pub mount: MountId,
    pub result: Result<SessionCredential, CredentialError>,
}

/// What happened to an outcome handed back to the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Stored as the mount's current credential.
    Stored,
    /// The mount it was issued for is gone; the result was dropped.
    Discarded,
}

/// Chat Panel Controller.
///
/// Owns the open/closed state and hands the widget's credential requests to
/// the backend. Nothing carries over from one mount to the next.
pub struct ChatPanel<B: ?Sized> {
    backend: Arc<B>,
    state: PanelState,
    next_mount: u64,
}

impl<B: CredentialBackend + ?Sized> ChatPanel<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            state: PanelState::Closed,
            next_mount: 0,
        }
    }

    pub fn state(&self) -> &PanelState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, PanelState::Open(_))
    }

    pub fn mount(&self) -> Option<&WidgetMount> {
        match &self.state {
            PanelState::Open(mount) => Some(mount),
            PanelState::Closed => None,
        }
    }

    pub fn credential(&self) -> Option<&SessionCredential> {
        self.mount().and_then(WidgetMount::credential)
    }

    /// `Closed -> Open`: mounts the widget and returns its first credential
    /// request, which always asks for a fresh session. `None` if already open.
    pub fn open(&mut self) -> Option<CredentialRequest<B>> {
        if self.is_open() {
            debug!("Chat panel already open");
            return None;
        }

        self.next_mount += 1;
        let id = MountId(self.next_mount);
        self.state = PanelState::Open(WidgetMount::new(id));
        info!("[mount {}] Chat panel opened", id.0);

        Some(CredentialRequest {
            mount: id,
            existing: None,
            backend: self.backend.clone(),
        })
    }

    /// `Open -> Closed`: unmounts the widget. In-flight requests are not
    /// aborted; their outcomes are discarded on delivery.
    pub fn close(&mut self) {
        if let PanelState::Open(mount) = std::mem::replace(&mut self.state, PanelState::Closed) {
            info!("[mount {}] Chat panel closed", mount.id().0);
        }
    }

    /// The widget asks for a credential while open. Carries the current
    /// credential when there is one, which routes to a refresh.
    pub fn request_credential(&self) -> Option<CredentialRequest<B>> {
        let mount = self.mount()?;
        Some(CredentialRequest {
            mount: mount.id(),
            existing: mount.credential().cloned(),
            backend: self.backend.clone(),
        })
    }

    /// Hand a finished request back. Errors for the current mount are
    /// propagated unchanged; anything for a stale mount is dropped.
    pub fn deliver(&mut self, outcome: CredentialOutcome) -> Result<Delivery, CredentialError> {
        let current = match &mut self.state {
            PanelState::Open(mount) if mount.id() == outcome.mount => mount,
            _ => {
                debug!("[mount {}] Discarding credential result for unmounted widget", outcome.mount.0);
                return Ok(Delivery::Discarded);
            }
        };

        match outcome.result {
            Ok(credential) => {
                current.store(credential);
                Ok(Delivery::Stored)
            }
            Err(e) => {
                warn!("[mount {}] {}", outcome.mount.0, e);
                Err(e)
            }
        }
    }

    /// Send a request and deliver its outcome in one step.
    pub async fn fulfil(&mut self, request: CredentialRequest<B>) -> Result<Delivery, CredentialError> {
        let outcome = request.send().await;
        self.deliver(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::credential::CredentialOperation;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockBackend {
        creates: AtomicUsize,
        refreshes: AtomicUsize,
        fail_refresh: AtomicBool,
        refreshed_with: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl CredentialBackend for MockBackend {
        async fn create_session(&self) -> Result<SessionCredential, CredentialError> {
            let n = self.creates.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(SessionCredential::new(format!("session-{}", n)))
        }

        async fn refresh_session(
            &self,
            existing: &SessionCredential,
        ) -> Result<SessionCredential, CredentialError> {
            self.refreshed_with.lock().unwrap().push(existing.expose().to_string());
            if self.fail_refresh.load(Ordering::SeqCst) {
                return Err(CredentialError::Rejected {
                    operation: CredentialOperation::Refresh,
                    status: 401,
                    message: "OpenAI API error: 401".into(),
                    details: None,
                });
            }
            let n = self.refreshes.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(SessionCredential::new(format!("renewed-{}", n)))
        }
    }

    fn panel() -> (ChatPanel<MockBackend>, Arc<MockBackend>) {
        let backend = Arc::new(MockBackend::default());
        (ChatPanel::new(backend.clone()), backend)
    }

    #[tokio::test]
    async fn starts_closed_without_network() {
        let (panel, backend) = panel();
        assert!(!panel.is_open());
        assert!(panel.credential().is_none());
        assert!(panel.request_credential().is_none());
        assert_eq!(backend.creates.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn open_issues_fresh_session() {
        let (mut panel, backend) = panel();
        let request = panel.open().unwrap();
        assert!(!request.is_refresh());

        assert_eq!(panel.fulfil(request).await.unwrap(), Delivery::Stored);
        assert_eq!(panel.credential().unwrap().expose(), "session-1");
        assert_eq!(backend.creates.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn open_when_open_is_noop() {
        let (mut panel, _) = panel();
        let first = panel.open().unwrap();
        assert!(panel.open().is_none());
        assert_eq!(panel.mount().unwrap().id(), first.mount());
    }

    #[tokio::test]
    async fn reopening_never_reuses_credential() {
        let (mut panel, backend) = panel();

        let request = panel.open().unwrap();
        panel.fulfil(request).await.unwrap();
        let first_mount = panel.mount().unwrap().id();
        panel.close();
        assert!(panel.credential().is_none());

        let request = panel.open().unwrap();
        assert!(!request.is_refresh());
        panel.fulfil(request).await.unwrap();

        assert_eq!(backend.creates.load(Ordering::SeqCst), 2);
        assert_eq!(backend.refreshes.load(Ordering::SeqCst), 0);
        assert_eq!(panel.credential().unwrap().expose(), "session-2");
        assert_ne!(panel.mount().unwrap().id(), first_mount);
    }

    #[tokio::test]
    async fn result_arriving_after_close_is_discarded() {
        let (mut panel, _) = panel();
        let request = panel.open().unwrap();
        panel.close();

        let outcome = request.send().await;
        assert_eq!(panel.deliver(outcome).unwrap(), Delivery::Discarded);
        assert!(!panel.is_open());
    }

    #[tokio::test]
    async fn stale_result_does_not_leak_into_new_mount() {
        let (mut panel, _) = panel();
        let stale = panel.open().unwrap();
        panel.close();
        let fresh = panel.open().unwrap();

        let stale_outcome = stale.send().await;
        assert_eq!(panel.deliver(stale_outcome).unwrap(), Delivery::Discarded);
        assert!(panel.credential().is_none());

        panel.fulfil(fresh).await.unwrap();
        assert_eq!(panel.credential().unwrap().expose(), "session-2");
    }

    #[tokio::test]
    async fn stale_failure_is_swallowed() {
        let (mut panel, backend) = panel();
        let request = panel.open().unwrap();
        panel.fulfil(request).await.unwrap();

        backend.fail_refresh.store(true, Ordering::SeqCst);
        let refresh = panel.request_credential().unwrap();
        panel.close();

        assert_eq!(panel.fulfil(refresh).await.unwrap(), Delivery::Discarded);
    }

    #[tokio::test]
    async fn refresh_replaces_credential_repeatedly() {
        let (mut panel, backend) = panel();
        let request = panel.open().unwrap();
        panel.fulfil(request).await.unwrap();

        for expected in ["renewed-1", "renewed-2", "renewed-3"] {
            let request = panel.request_credential().unwrap();
            assert!(request.is_refresh());
            panel.fulfil(request).await.unwrap();
            assert_eq!(panel.credential().unwrap().expose(), expected);
        }

        assert_eq!(
            *backend.refreshed_with.lock().unwrap(),
            vec!["session-1", "renewed-1", "renewed-2"]
        );
        assert_eq!(panel.mount().unwrap().renewals(), 3);
        assert_eq!(backend.creates.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn refresh_failure_propagates_and_keeps_state() {
        let (mut panel, backend) = panel();
        let request = panel.open().unwrap();
        panel.fulfil(request).await.unwrap();

        backend.fail_refresh.store(true, Ordering::SeqCst);
        let request = panel.request_credential().unwrap();
        let err = panel.fulfil(request).await.unwrap_err();

        assert_eq!(err.operation(), CredentialOperation::Refresh);
        assert!(panel.is_open());
        assert_eq!(panel.credential().unwrap().expose(), "session-1");
    }

    #[tokio::test]
    async fn request_without_credential_creates() {
        let (mut panel, backend) = panel();
        let first = panel.open().unwrap();
        // the widget retries before the first request came back
        let retry = panel.request_credential().unwrap();
        assert!(!retry.is_refresh());

        panel.fulfil(first).await.unwrap();
        panel.fulfil(retry).await.unwrap();
        assert_eq!(backend.creates.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn close_when_closed_is_noop() {
        let (mut panel, _) = panel();
        panel.close();
        assert!(!panel.is_open());
    }
}
