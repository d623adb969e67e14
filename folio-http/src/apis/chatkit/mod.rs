pub mod types;
pub mod handler;

pub use types::{ClientSecretResponse, RefreshRequest};
pub use handler::{handle_create_session, handle_refresh_session};
