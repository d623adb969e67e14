use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    routing::post,
    Router,
};
use folio_core::ContactMailer;
use folio_provider::ChatKitClient;
use thiserror::Error;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, TraceLayer};
use tracing::{error, info};

use crate::apis::{chatkit, contact};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid server configuration: {0}")]
    Config(String),
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },
    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origin allowed by CORS. `None` allows any origin.
    pub allowed_origin: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            allowed_origin: None,
        }
    }
}

impl ServerConfig {
    /// `FOLIO_HTTP_HOST`, `FOLIO_HTTP_PORT`, `FOLIO_ALLOWED_ORIGIN`
    pub fn from_env() -> Result<Self, ServerError> {
        let mut config = Self::default();
        if let Ok(host) = std::env::var("FOLIO_HTTP_HOST") {
            config.host = host;
        }
        if let Ok(port) = std::env::var("FOLIO_HTTP_PORT") {
            config.port = port
                .parse::<u16>()
                .map_err(|_| ServerError::Config(format!("FOLIO_HTTP_PORT is not a valid port: {}", port)))?;
        }
        config.allowed_origin = std::env::var("FOLIO_ALLOWED_ORIGIN")
            .ok()
            .filter(|v| !v.trim().is_empty());
        Ok(config)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ServerError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ServerError::Config(format!("invalid address {}:{}: {}", self.host, self.port, e)))
    }

    pub fn cors_layer(&self) -> Result<CorsLayer, ServerError> {
        let origin = match &self.allowed_origin {
            Some(origin) => AllowOrigin::exact(
                HeaderValue::from_str(origin)
                    .map_err(|_| ServerError::Config(format!("invalid FOLIO_ALLOWED_ORIGIN: {}", origin)))?,
            ),
            None => AllowOrigin::from(Any),
        };
        Ok(CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::POST])
            .allow_headers([header::CONTENT_TYPE]))
    }
}

/// Shared, immutable state handed to every handler.
#[derive(Clone)]
pub struct ServerState {
    pub chatkit: Arc<ChatKitClient>,
    pub contact: Arc<ContactMailer>,
}

impl ServerState {
    pub fn new(chatkit: ChatKitClient, contact: ContactMailer) -> Self {
        Self {
            chatkit: Arc::new(chatkit),
            contact: Arc::new(contact),
        }
    }

    pub fn from_env() -> Self {
        Self::new(ChatKitClient::from_env(), ContactMailer::from_env())
    }
}

pub fn build_router(state: ServerState) -> Router {
    Router::new()
        .route("/api/chatkit/session", post(chatkit::handle_create_session))
        .route("/api/chatkit/refresh", post(chatkit::handle_refresh_session))
        .route("/api/contact", post(contact::handle_contact))
        .with_state(state)
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
}

pub async fn start_server(config: ServerConfig, state: ServerState) -> Result<(), ServerError> {
    let addr = config.socket_addr()?;
    let router = build_router(state).layer(config.cors_layer()?);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    let local = listener.local_addr()?;
    info!("🚀 Server listening on http://{}", local);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
