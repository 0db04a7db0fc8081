use axum::{Json, extract::State, http::HeaderMap, response::IntoResponse};
use tracing::info;

use crate::error::ApiError;
use crate::session::AppState;

/// Bulk reset. Requires an exact match against the configured admin token;
/// when no token is configured the endpoint is effectively disabled.
pub async fn clear(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let supplied = headers.get("x-admin-token").and_then(|v| v.to_str().ok());

    match (state.admin_token.as_deref(), supplied) {
        (Some(expected), Some(token)) if token == expected => {}
        _ => return Err(ApiError::Unauthorized("Unauthorized")),
    }

    state.db.clear_all()?;
    info!("Admin reset: messages, summaries and participants cleared");

    Ok(Json(serde_json::json!({ "status": "cleared" })))
}
