use axum::{body::Bytes, extract::State, Json};
use tracing::{error, info};
use uuid::Uuid;

use super::types::{ClientSecretResponse, RefreshRequest};
use crate::{ApiError, ServerState};

const CREATE_FAILED: &str = "Failed to create session";
const REFRESH_FAILED: &str = "Failed to refresh token";

/// Issue a fresh chat session credential.
pub async fn handle_create_session(
    State(state): State<ServerState>,
) -> Result<Json<ClientSecretResponse>, ApiError> {
    let request_id = Uuid::new_v4();
    info!("[{}] POST /api/chatkit/session", request_id);

    let session = state.chatkit.create_session().await.map_err(|e| {
        error!("[{}] Session creation error: {}", request_id, e);
        ApiError::from_provider(e, CREATE_FAILED)
    })?;

    info!("[{}] Session created successfully", request_id);
    Ok(Json(ClientSecretResponse {
        client_secret: session.client_secret,
    }))
}

/// Renew an expiring credential. The provider renews by issuing a new
/// session, so the outbound call matches `handle_create_session`.
pub async fn handle_refresh_session(
    State(state): State<ServerState>,
    body: Bytes,
) -> Result<Json<ClientSecretResponse>, ApiError> {
    let request_id = Uuid::new_v4();
    info!("[{}] POST /api/chatkit/refresh", request_id);

    // Content-Type is not checked; only unparseable JSON is rejected.
    let request: RefreshRequest = serde_json::from_slice(&body).map_err(|e| {
        error!("[{}] Invalid refresh body: {}", request_id, e);
        ApiError::internal(REFRESH_FAILED).with_details(e.to_string())
    })?;

    let session = state
        .chatkit
        .refresh_session(request.token.as_deref().unwrap_or_default())
        .await
        .map_err(|e| {
            error!("[{}] Token refresh error: {}", request_id, e);
            ApiError::from_provider(e, REFRESH_FAILED)
        })?;

    info!("[{}] Token refreshed successfully", request_id);
    Ok(Json(ClientSecretResponse {
        client_secret: session.client_secret,
    }))
}
