use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use tracing::error;

use classboard_db::models::MessageRow;
use classboard_types::api::{Claims, MessageBody, MessageDto, MessageList};

use crate::error::{ApiError, Json};
use crate::session::AppState;

fn to_dto(row: MessageRow) -> MessageDto {
    MessageDto {
        id: row.id,
        username: row.username,
        content: row.content,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

/// Unrestricted read; ascending creation order.
pub async fn list_messages(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    // Run the blocking DB query off the async runtime
    let db = state.clone();
    let rows = tokio::task::spawn_blocking(move || db.db.list_messages())
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(anyhow::anyhow!("task join error"))
        })??;

    Ok(Json(MessageList {
        messages: rows.into_iter().map(to_dto).collect(),
    }))
}

pub async fn create_message(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<MessageBody>,
) -> Result<impl IntoResponse, ApiError> {
    let content = body.content.trim();
    if content.is_empty() {
        return Err(ApiError::InvalidInput("Content required"));
    }

    let row = state.db.insert_message(&claims.sub, content, Utc::now())?;

    Ok((StatusCode::CREATED, Json(to_dto(row))))
}

pub async fn update_message(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<MessageBody>,
) -> Result<impl IntoResponse, ApiError> {
    let row = state
        .db
        .get_message(id)?
        .ok_or(ApiError::NotFound("Message not found"))?;

    if row.username != claims.sub {
        return Err(ApiError::Forbidden);
    }

    let content = body.content.trim();
    if content.is_empty() {
        return Err(ApiError::InvalidInput("Content required"));
    }

    let now = Utc::now();
    state.db.update_message(id, content, now)?;

    Ok(Json(MessageDto {
        id,
        username: row.username,
        content: content.to_string(),
        created_at: row.created_at,
        updated_at: Some(now),
    }))
}

pub async fn delete_message(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let row = state
        .db
        .get_message(id)?
        .ok_or(ApiError::NotFound("Message not found"))?;

    if row.username != claims.sub {
        return Err(ApiError::Forbidden);
    }

    state.db.delete_message(id)?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use classboard_db::Database;

    use crate::session::AppStateInner;

    fn test_state() -> AppState {
        Arc::new(AppStateInner {
            db: Database::open_in_memory().unwrap(),
            session_secret: "test-secret".into(),
            summarizer: None,
            admin_token: None,
        })
    }

    fn identity(username: &str) -> Claims {
        Claims {
            sub: username.to_string(),
            exp: usize::MAX,
        }
    }

    fn body(content: &str) -> Json<MessageBody> {
        Json(MessageBody {
            content: content.to_string(),
        })
    }

    #[tokio::test]
    async fn only_the_owner_may_edit() {
        let state = test_state();
        let msg = state.db.insert_message("alice", "hi", Utc::now()).unwrap();

        let result = update_message(
            State(state.clone()),
            Path(msg.id),
            Extension(identity("bob")),
            body("hijacked"),
        )
        .await;
        assert!(matches!(result, Err(ApiError::Forbidden)));

        // content untouched
        let row = state.db.get_message(msg.id).unwrap().unwrap();
        assert_eq!(row.content, "hi");
        assert!(row.updated_at.is_none());
    }

    #[tokio::test]
    async fn only_the_owner_may_delete() {
        let state = test_state();
        let msg = state.db.insert_message("alice", "hi", Utc::now()).unwrap();

        let result = delete_message(
            State(state.clone()),
            Path(msg.id),
            Extension(identity("bob")),
        )
        .await;
        assert!(matches!(result, Err(ApiError::Forbidden)));
        assert!(state.db.get_message(msg.id).unwrap().is_some());
    }

    #[tokio::test]
    async fn missing_message_is_not_found() {
        let state = test_state();

        let edited = update_message(
            State(state.clone()),
            Path(999),
            Extension(identity("alice")),
            body("anything"),
        )
        .await;
        assert!(matches!(edited, Err(ApiError::NotFound(_))));

        let deleted =
            delete_message(State(state.clone()), Path(999), Extension(identity("alice"))).await;
        assert!(matches!(deleted, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn owner_edits_and_deletes() {
        let state = test_state();
        let msg = state.db.insert_message("alice", "hi", Utc::now()).unwrap();

        let edited = update_message(
            State(state.clone()),
            Path(msg.id),
            Extension(identity("alice")),
            body("hello"),
        )
        .await;
        assert!(edited.is_ok());

        let row = state.db.get_message(msg.id).unwrap().unwrap();
        assert_eq!(row.content, "hello");
        assert!(row.updated_at.is_some());

        let deleted = delete_message(
            State(state.clone()),
            Path(msg.id),
            Extension(identity("alice")),
        )
        .await;
        assert!(deleted.is_ok());
        assert!(state.db.get_message(msg.id).unwrap().is_none());
    }

    #[tokio::test]
    async fn blank_edits_are_rejected() {
        let state = test_state();
        let msg = state.db.insert_message("alice", "hi", Utc::now()).unwrap();

        let result = update_message(
            State(state.clone()),
            Path(msg.id),
            Extension(identity("alice")),
            body("   "),
        )
        .await;
        assert!(matches!(result, Err(ApiError::InvalidInput(_))));
    }
}
