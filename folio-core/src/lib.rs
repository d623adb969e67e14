pub mod contact;
pub mod logging;
pub mod panel;

pub use contact::{ContactConfig, ContactError, ContactMailer, ContactMessage};
pub use logging::{init_tracing, LogFormat, LoggingConfig};
pub use panel::{
    ChatPanel, CredentialBackend, CredentialError, CredentialOperation, CredentialOutcome,
    CredentialRequest, Delivery, HttpCredentialBackend, MountId, PanelState, SessionCredential,
    WidgetMount,
};
