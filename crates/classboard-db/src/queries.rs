use crate::Database;
use crate::models::{ClaimOutcome, MessageRow, ParticipantRow, SummaryRow};
use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use rusqlite::Connection;

impl Database {
    // -- Participants --

    /// Claim a username: insert it, or refresh `last_seen` if the previous
    /// holder's window has lapsed. The whole check-then-write runs in one
    /// transaction, and the UNIQUE COLLATE NOCASE constraint backstops the
    /// check if a concurrent insert slips between the two statements.
    pub fn claim_participant(
        &self,
        username: &str,
        now: DateTime<Utc>,
        window: Duration,
    ) -> Result<ClaimOutcome> {
        self.with_conn(|conn| {
            let tx = conn.unchecked_transaction()?;

            let existing = query_participant(&tx, username)?;

            if let Some(row) = existing {
                if now - row.last_seen < window {
                    return Ok(ClaimOutcome::Taken);
                }
                tx.execute(
                    "UPDATE participants SET last_seen = ?1 WHERE id = ?2",
                    rusqlite::params![now, row.id],
                )?;
                tx.commit()?;
                return Ok(ClaimOutcome::Claimed);
            }

            match tx.execute(
                "INSERT INTO participants (username, last_seen) VALUES (?1, ?2)",
                rusqlite::params![username, now],
            ) {
                Ok(_) => {}
                Err(rusqlite::Error::SqliteFailure(e, _))
                    if e.code == rusqlite::ErrorCode::ConstraintViolation =>
                {
                    return Ok(ClaimOutcome::Taken);
                }
                Err(e) => return Err(e.into()),
            }

            tx.commit()?;
            Ok(ClaimOutcome::Claimed)
        })
    }

    pub fn get_participant(&self, username: &str) -> Result<Option<ParticipantRow>> {
        self.with_conn(|conn| query_participant(conn, username))
    }

    // -- Messages --

    pub fn insert_message(
        &self,
        username: &str,
        content: &str,
        now: DateTime<Utc>,
    ) -> Result<MessageRow> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO messages (username, content, created_at) VALUES (?1, ?2, ?3)",
                rusqlite::params![username, content, now],
            )?;
            Ok(MessageRow {
                id: conn.last_insert_rowid(),
                username: username.to_string(),
                content: content.to_string(),
                created_at: now,
                updated_at: None,
            })
        })
    }

    pub fn get_message(&self, id: i64) -> Result<Option<MessageRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, username, content, created_at, updated_at FROM messages WHERE id = ?1",
            )?;
            stmt.query_row([id], map_message_row).optional()
        })
    }

    pub fn list_messages(&self) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, username, content, created_at, updated_at
                 FROM messages
                 ORDER BY created_at ASC, id ASC",
            )?;
            let rows = stmt
                .query_map([], map_message_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn update_message(&self, id: i64, content: &str, now: DateTime<Utc>) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE messages SET content = ?1, updated_at = ?2 WHERE id = ?3",
                rusqlite::params![content, now, id],
            )?;
            Ok(())
        })
    }

    pub fn delete_message(&self, id: i64) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM messages WHERE id = ?1", [id])?;
            Ok(())
        })
    }

    // -- Summaries --

    pub fn insert_summary(&self, content: &str, now: DateTime<Utc>) -> Result<SummaryRow> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO summaries (content, created_at) VALUES (?1, ?2)",
                rusqlite::params![content, now],
            )?;
            Ok(SummaryRow {
                id: conn.last_insert_rowid(),
                content: content.to_string(),
                created_at: now,
            })
        })
    }

    pub fn latest_summary(&self) -> Result<Option<SummaryRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, content, created_at FROM summaries
                 ORDER BY created_at DESC, id DESC LIMIT 1",
            )?;
            stmt.query_row([], |row| {
                Ok(SummaryRow {
                    id: row.get(0)?,
                    content: row.get(1)?,
                    created_at: row.get(2)?,
                })
            })
            .optional()
        })
    }

    // -- Admin --

    /// Wipe messages, summaries and participants in a single transaction.
    pub fn clear_all(&self) -> Result<()> {
        self.with_conn(|conn| {
            let tx = conn.unchecked_transaction()?;
            tx.execute("DELETE FROM messages", [])?;
            tx.execute("DELETE FROM summaries", [])?;
            tx.execute("DELETE FROM participants", [])?;
            tx.commit()?;
            Ok(())
        })
    }
}

fn query_participant(conn: &Connection, username: &str) -> Result<Option<ParticipantRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, username, last_seen FROM participants WHERE username = ?1 COLLATE NOCASE",
    )?;
    stmt.query_row([username], |row| {
        Ok(ParticipantRow {
            id: row.get(0)?,
            username: row.get(1)?,
            last_seen: row.get(2)?,
        })
    })
    .optional()
}

fn map_message_row(row: &rusqlite::Row<'_>) -> std::result::Result<MessageRow, rusqlite::Error> {
    Ok(MessageRow {
        id: row.get(0)?,
        username: row.get(1)?,
        content: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window() -> Duration {
        Duration::hours(8)
    }

    #[test]
    fn claim_then_conflict_within_window() {
        let db = Database::open_in_memory().unwrap();
        let t0 = Utc::now();

        assert!(matches!(
            db.claim_participant("alice", t0, window()).unwrap(),
            ClaimOutcome::Claimed
        ));
        assert!(matches!(
            db.claim_participant("alice", t0 + Duration::minutes(5), window()).unwrap(),
            ClaimOutcome::Taken
        ));
    }

    #[test]
    fn claim_conflict_is_case_insensitive() {
        let db = Database::open_in_memory().unwrap();
        let t0 = Utc::now();

        db.claim_participant("Alice", t0, window()).unwrap();
        assert!(matches!(
            db.claim_participant("ALICE", t0, window()).unwrap(),
            ClaimOutcome::Taken
        ));
        assert!(matches!(
            db.claim_participant("alice", t0, window()).unwrap(),
            ClaimOutcome::Taken
        ));
    }

    #[test]
    fn expired_claim_is_released() {
        let db = Database::open_in_memory().unwrap();
        let t0 = Utc::now();

        db.claim_participant("alice", t0, window()).unwrap();

        let t1 = t0 + Duration::hours(9);
        assert!(matches!(
            db.claim_participant("alice", t1, window()).unwrap(),
            ClaimOutcome::Claimed
        ));

        // last_seen was refreshed, so the window restarts from t1
        let row = db.get_participant("alice").unwrap().unwrap();
        assert_eq!(row.last_seen, t1);
        assert!(matches!(
            db.claim_participant("alice", t1 + Duration::hours(1), window()).unwrap(),
            ClaimOutcome::Taken
        ));
    }

    #[test]
    fn messages_list_in_creation_order() {
        let db = Database::open_in_memory().unwrap();
        let t0 = Utc::now();

        db.insert_message("bob", "second", t0 + Duration::seconds(10)).unwrap();
        db.insert_message("alice", "first", t0).unwrap();
        db.insert_message("carol", "third", t0 + Duration::seconds(20)).unwrap();

        let contents: Vec<String> = db
            .list_messages()
            .unwrap()
            .into_iter()
            .map(|m| m.content)
            .collect();
        assert_eq!(contents, vec!["first", "second", "third"]);
    }

    #[test]
    fn update_sets_updated_at() {
        let db = Database::open_in_memory().unwrap();
        let t0 = Utc::now();

        let msg = db.insert_message("alice", "hi", t0).unwrap();
        assert!(msg.updated_at.is_none());

        let t1 = t0 + Duration::seconds(30);
        db.update_message(msg.id, "hello", t1).unwrap();

        let row = db.get_message(msg.id).unwrap().unwrap();
        assert_eq!(row.content, "hello");
        assert_eq!(row.updated_at, Some(t1));
        assert_eq!(row.created_at, t0);
    }

    #[test]
    fn delete_removes_message() {
        let db = Database::open_in_memory().unwrap();
        let msg = db.insert_message("alice", "hi", Utc::now()).unwrap();

        db.delete_message(msg.id).unwrap();
        assert!(db.get_message(msg.id).unwrap().is_none());
        assert!(db.list_messages().unwrap().is_empty());
    }

    #[test]
    fn latest_summary_is_most_recent() {
        let db = Database::open_in_memory().unwrap();
        let t0 = Utc::now();

        assert!(db.latest_summary().unwrap().is_none());

        db.insert_summary("old", t0).unwrap();
        db.insert_summary("new", t0 + Duration::minutes(1)).unwrap();

        let latest = db.latest_summary().unwrap().unwrap();
        assert_eq!(latest.content, "new");
    }

    #[test]
    fn clear_all_empties_every_table() {
        let db = Database::open_in_memory().unwrap();
        let t0 = Utc::now();

        db.claim_participant("alice", t0, window()).unwrap();
        db.insert_message("alice", "hi", t0).unwrap();
        db.insert_summary("summary", t0).unwrap();

        db.clear_all().unwrap();

        assert!(db.list_messages().unwrap().is_empty());
        assert!(db.latest_summary().unwrap().is_none());
        assert!(db.get_participant("alice").unwrap().is_none());
        // username is free to claim again immediately
        assert!(matches!(
            db.claim_participant("alice", t0, window()).unwrap(),
            ClaimOutcome::Claimed
        ));
    }
}
