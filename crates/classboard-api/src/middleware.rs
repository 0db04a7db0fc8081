use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, Validation, decode};

use classboard_types::api::Claims;

use crate::error::ApiError;
use crate::session::AppState;

/// Extract and validate the session token from the Authorization header,
/// making the claimed username available to handlers via extensions.
/// The secret comes from shared state, never from ambient globals.
pub async fn require_identity(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::Unauthorized("Not joined"))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(ApiError::Unauthorized("Not joined"))?;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(state.session_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| ApiError::Unauthorized("Not joined"))?;

    req.extensions_mut().insert(token_data.claims);
    Ok(next.run(req).await)
}
