pub mod chatkit;
pub mod resend;

pub use chatkit::{ChatKitClient, ChatKitConfig, SessionRequest, SessionResponse, UserLabel, WorkflowRef};
pub use resend::{OutgoingEmail, ResendClient, ResendConfig, SendReceipt};
