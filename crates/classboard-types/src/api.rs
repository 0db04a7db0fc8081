use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// -- Session claims --

/// Signed-token claims shared between classboard-api (session issue) and
/// the identity middleware. Canonical definition lives here in
/// classboard-types to eliminate duplication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

// -- Session --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JoinRequest {
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct JoinResponse {
    pub username: String,
    pub token: String,
}

// -- Messages --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MessageBody {
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageDto {
    pub id: i64,
    pub username: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct MessageList {
    pub messages: Vec<MessageDto>,
}

// -- Summaries --

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub summary: String,
    pub created_at: DateTime<Utc>,
}

/// `summary` is null until the first summarize call succeeds; `created_at`
/// is omitted entirely in that case.
#[derive(Debug, Serialize)]
pub struct LatestSummaryResponse {
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}
