use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use crate::provider::ProviderError;

/// Where and whether failed provider requests are written to disk.
///
/// Configuration via environment variables:
/// - `FOLIO_PROVIDER_LOGGING_ENABLED`: set to "true" to enable (default: false)
/// - `FOLIO_PROVIDER_LOGGING_FOLDER`: directory for dumps (default: `.folio/logs/`)
#[derive(Debug, Clone)]
pub struct ErrorLogSettings {
    pub enabled: bool,
    pub folder: PathBuf,
}

impl Default for ErrorLogSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            folder: PathBuf::from(".folio/logs/"),
        }
    }
}

impl ErrorLogSettings {
    pub fn from_env() -> Self {
        let enabled = std::env::var("FOLIO_PROVIDER_LOGGING_ENABLED")
            .map(|v| v.to_lowercase() == "true")
            .unwrap_or(false);

        let folder = std::env::var("FOLIO_PROVIDER_LOGGING_FOLDER")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(".folio/logs/"));

        Self { enabled, folder }
    }

    pub fn in_folder(folder: impl AsRef<Path>) -> Self {
        Self {
            enabled: true,
            folder: folder.as_ref().to_path_buf(),
        }
    }
}

/// Log a failed provider request to a file for debugging.
///
/// Only the request body is written; credentials travel in headers and never
/// reach the dump. Returns the path of the written file.
pub fn log_provider_error<T: Serialize>(
    settings: &ErrorLogSettings,
    request: &T,
    error: &ProviderError,
    provider_name: &str,
    operation: &str,
) -> Option<PathBuf> {
    if !settings.enabled {
        return None;
    }

    if let Err(e) = std::fs::create_dir_all(&settings.folder) {
        warn!("Failed to create provider error log directory: {}", e);
        return None;
    }

    let timestamp = chrono::Utc::now();
    let filename = format!(
        "{}_{}_{}_{}.log",
        provider_name,
        operation,
        timestamp.format("%Y%m%d_%H%M%S"),
        timestamp.format("%3f")
    );
    let log_path = settings.folder.join(filename);

    let mut log_content = String::new();

    log_content.push_str("=== Provider Request Error Log ===\n");
    log_content.push_str(&format!("Timestamp: {}\n", timestamp.to_rfc3339()));
    log_content.push_str(&format!("Provider: {}\n", provider_name));
    log_content.push_str(&format!("Operation: {}\n", operation));

    log_content.push_str("\n=== REQUEST ===\n");
    match serde_json::to_string_pretty(request) {
        Ok(json) => log_content.push_str(&json),
        Err(e) => log_content.push_str(&format!("Failed to serialize request: {}", e)),
    }
    log_content.push('\n');

    log_content.push_str("\n=== ERROR ===\n");
    log_content.push_str(&format!("{}\n", error));
    if let ProviderError::Api { body, .. } = error {
        log_content.push_str("\n=== RESPONSE BODY ===\n");
        log_content.push_str(body);
        log_content.push('\n');
    }

    match std::fs::write(&log_path, log_content) {
        Ok(()) => {
            info!("Provider error logged to: {}", log_path.display());
            Some(log_path)
        }
        Err(e) => {
            warn!("Failed to write provider error log to {}: {}", log_path.display(), e);
            None
        }
    }
}
