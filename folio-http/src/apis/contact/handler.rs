use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use folio_core::{ContactError, ContactMessage};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use crate::{ApiError, ServerState};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactResponse {
    pub success: bool,
    pub id: String,
}

impl From<ContactError> for ApiError {
    fn from(err: ContactError) -> Self {
        let status = match err {
            ContactError::MissingFields => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        ApiError::new(status, err.to_string())
    }
}

/// Forward a contact form submission to the site owner.
pub async fn handle_contact(
    State(state): State<ServerState>,
    body: Bytes,
) -> Result<Json<ContactResponse>, ApiError> {
    let request_id = Uuid::new_v4();
    info!("[{}] POST /api/contact", request_id);

    let message: ContactMessage = serde_json::from_slice(&body).map_err(|e| {
        error!("[{}] Invalid contact body: {}", request_id, e);
        ApiError::from(ContactError::Unexpected(e.to_string()))
    })?;

    let id = state.contact.send(&message).await.map_err(|e| {
        if let ContactError::Unexpected(cause) = &e {
            error!("[{}] Error sending email: {}", request_id, cause);
        }
        ApiError::from(e)
    })?;

    Ok(Json(ContactResponse { success: true, id }))
}
