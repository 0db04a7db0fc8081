//! Database row types — these map directly to SQLite rows.
//! Distinct from classboard-types API models to keep the DB layer independent.

use chrono::{DateTime, Utc};

pub struct ParticipantRow {
    pub id: i64,
    pub username: String,
    pub last_seen: DateTime<Utc>,
}

pub struct MessageRow {
    pub id: i64,
    pub username: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

pub struct SummaryRow {
    pub id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Outcome of a username claim.
pub enum ClaimOutcome {
    /// Fresh participant, or an expired holder whose `last_seen` was refreshed.
    Claimed,
    /// Another holder was seen within the release window.
    Taken,
}
