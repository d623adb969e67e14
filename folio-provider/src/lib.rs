pub mod logging;
pub mod provider;
pub mod providers;

pub use logging::{log_provider_error, ErrorLogSettings};
pub use provider::{EnvVar, ProviderError, ProviderInfo};
pub use providers::{
    ChatKitClient, ChatKitConfig, OutgoingEmail, ResendClient, ResendConfig, SendReceipt,
    SessionRequest, SessionResponse, UserLabel, WorkflowRef,
};
