use std::sync::Arc;

use axum::{extract::State, response::IntoResponse};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};

use classboard_db::Database;
use classboard_db::models::ClaimOutcome;
use classboard_types::api::{Claims, JoinRequest, JoinResponse};

use crate::error::{ApiError, Json};
use crate::summarizer::SummarizationService;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub session_secret: String,
    pub summarizer: Option<Arc<dyn SummarizationService>>,
    pub admin_token: Option<String>,
}

/// A held username is released once its holder has been quiet this long,
/// so names can be reused across class days without permanent squatting.
/// Session tokens expire on the same clock.
pub const CLAIM_WINDOW_HOURS: i64 = 8;

pub async fn join(
    State(state): State<AppState>,
    Json(req): Json<JoinRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let username =
        validate_username(&req.username).ok_or(ApiError::InvalidInput("Invalid username"))?;

    let outcome = state
        .db
        .claim_participant(username, Utc::now(), Duration::hours(CLAIM_WINDOW_HOURS))?;

    if let ClaimOutcome::Taken = outcome {
        return Err(ApiError::Conflict("Username already taken"));
    }

    let token = create_token(&state.session_secret, username)?;

    Ok(Json(JoinResponse {
        username: username.to_string(),
        token,
    }))
}

/// Trim and bounds-check a claimed username; 2–24 characters.
pub fn validate_username(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    let len = trimmed.chars().count();
    if (2..=24).contains(&len) { Some(trimmed) } else { None }
}

fn create_token(secret: &str, username: &str) -> anyhow::Result<String> {
    let claims = Claims {
        sub: username.to_string(),
        exp: (Utc::now() + Duration::hours(CLAIM_WINDOW_HOURS)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}
