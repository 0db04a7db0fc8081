use axum::{
    Extension, Json,
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::Deserialize;
use tracing::{error, info};

use classboard_db::models::MessageRow;
use classboard_types::api::{Claims, LatestSummaryResponse, SummaryResponse};

use crate::documents::{self, DocumentFormat};
use crate::error::ApiError;
use crate::session::AppState;

const SUMMARY_PROMPT: &str = "You are assisting a teacher. Summarize the following class chat into \
     clear bullet points, grouping related questions, highlighting key answers, and listing \
     actionable follow-ups if any. Be concise and neutral.";

/// One transcript line per message, ascending creation order.
pub fn build_transcript(messages: &[MessageRow]) -> String {
    messages
        .iter()
        .map(|m| {
            format!(
                "[{}] {}: {}",
                m.created_at.format("%Y-%m-%d %H:%M"),
                m.username,
                m.content
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub async fn summarize(
    State(state): State<AppState>,
    Extension(_claims): Extension<Claims>,
) -> Result<Json<SummaryResponse>, ApiError> {
    let Some(service) = state.summarizer.clone() else {
        return Err(ApiError::ServiceUnavailable("Summarization is not configured"));
    };

    let db = state.clone();
    let rows = tokio::task::spawn_blocking(move || db.db.list_messages())
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(anyhow::anyhow!("task join error"))
        })??;

    if rows.is_empty() {
        return Err(ApiError::InvalidInput("No messages to summarize"));
    }

    let prompt = format!("{SUMMARY_PROMPT}\n\n{}", build_transcript(&rows));

    // The store lock is released here; nothing is held across the upstream call.
    let text = service
        .summarize(&prompt)
        .await
        .map_err(|e| ApiError::Upstream(e.to_string()))?;

    let row = state.db.insert_summary(&text, Utc::now())?;
    info!("Stored summary {} covering {} messages", row.id, rows.len());

    Ok(Json(SummaryResponse {
        summary: row.content,
        created_at: row.created_at,
    }))
}

pub async fn latest(State(state): State<AppState>) -> Result<Json<LatestSummaryResponse>, ApiError> {
    let response = match state.db.latest_summary()? {
        Some(row) => LatestSummaryResponse {
            summary: Some(row.content),
            created_at: Some(row.created_at),
        },
        None => LatestSummaryResponse {
            summary: None,
            created_at: None,
        },
    };
    Ok(Json(response))
}

#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    #[serde(rename = "type")]
    format: Option<String>,
}

pub async fn download(
    State(state): State<AppState>,
    Query(query): Query<DownloadQuery>,
) -> Result<Response, ApiError> {
    let format = DocumentFormat::parse(query.format.as_deref());

    let row = state
        .db
        .latest_summary()?
        .ok_or(ApiError::NotFound("No summary available"))?;

    let bytes = documents::render(format, &row.content)?;

    let headers = [
        (header::CONTENT_TYPE, format.media_type().to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", format.file_name()),
        ),
    ];

    Ok((headers, bytes).into_response())
}
