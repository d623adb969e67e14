//! Client-side lifecycle of the embedded chat widget.
//!
//! [`ChatPanel`] is the open/closed state machine. While open it mounts a
//! [`WidgetMount`] that holds the session credential in memory; the widget
//! obtains credentials through the [`CredentialBackend`] callback, either over
//! HTTP ([`HttpCredentialBackend`]) or straight from the provider client.

mod controller;
mod credential;
mod direct;
mod http_backend;
mod lifecycle;

pub use controller::{ChatPanel, CredentialOutcome, CredentialRequest, Delivery, PanelState};
pub use credential::{CredentialBackend, CredentialError, CredentialOperation, SessionCredential};
pub use http_backend::{HttpCredentialBackend, REFRESH_PATH, SESSION_PATH};
pub use lifecycle::{MountId, WidgetMount};
