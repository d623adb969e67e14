use std::time::Instant;

use tracing::debug;

use super::credential::SessionCredential;

/// Identifies one mount of the chat widget. Every `Closed -> Open` transition
/// gets a new id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MountId(pub(crate) u64);

impl MountId {
    pub fn get(self) -> u64 {
        self.0
    }
}

/// In-memory state of a mounted widget. Dropping it is the unmount.
pub struct WidgetMount {
    id: MountId,
    credential: Option<SessionCredential>,
    renewals: u32,
    mounted_at: Instant,
}

impl WidgetMount {
    pub(crate) fn new(id: MountId) -> Self {
        debug!("[mount {}] Chat widget mounted", id.0);
        Self {
            id,
            credential: None,
            renewals: 0,
            mounted_at: Instant::now(),
        }
    }

    pub fn id(&self) -> MountId {
        self.id
    }

    pub fn credential(&self) -> Option<&SessionCredential> {
        self.credential.as_ref()
    }

    /// Number of times the credential was replaced after the first issue.
    pub fn renewals(&self) -> u32 {
        self.renewals
    }

    pub(crate) fn store(&mut self, credential: SessionCredential) {
        if self.credential.replace(credential).is_some() {
            self.renewals = self.renewals.saturating_add(1);
        }
    }
}

impl Drop for WidgetMount {
    fn drop(&mut self) {
        debug!(
            "[mount {}] Chat widget unmounted after {:?}, discarding credential (held: {}, renewals: {})",
            self.id.0,
            self.mounted_at.elapsed(),
            self.credential.is_some(),
            self.renewals
        );
    }
}
