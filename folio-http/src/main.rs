use folio_core::{init_tracing, LoggingConfig};
use folio_http::{start_server, ServerConfig, ServerState};
use folio_provider::{ChatKitClient, ResendClient};
use tracing::warn;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _log_guard = init_tracing(&LoggingConfig::from_env())?;

    for info in [ChatKitClient::info(), ResendClient::info()] {
        for name in info.missing_env_vars() {
            warn!("{}: {} is not set, its endpoints will answer with a configuration error", info.display_name, name);
        }
    }

    let config = ServerConfig::from_env()?;
    let state = ServerState::from_env();
    start_server(config, state).await?;
    Ok(())
}
