pub mod http;
pub mod apis;
pub mod error;

pub use error::{ApiError, ErrorResponse};
pub use http::{build_router, start_server, ServerConfig, ServerError, ServerState};
