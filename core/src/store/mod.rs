//! SQLite persistence layer.
//!
//! RULE: Only the store talks to the database.
//! Domain code calls store methods; it never executes SQL directly.
//! Multi-step mutations run inside [`StudyStore::in_transaction`].

use rusqlite::{params, types::Type, Connection, Row};
use serde::de::DeserializeOwned;

use crate::{
    error::{StudyError, StudyResult},
    event::EventLogEntry,
};

mod achievement;
mod content;
mod goal;
mod progress;
mod user;

pub struct StudyStore {
    conn: Connection,
    path: Option<String>, // None for :memory:, Some(path) for file
}

impl StudyStore {
    pub fn open(path: &str) -> StudyResult<Self> {
        if path == ":memory:" {
            return Self::in_memory();
        }
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only matters for real files; shared-memory URIs ignore it.
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self {
            conn,
            path: Some(path.to_string()),
        })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> StudyResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn, path: None })
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Apply all schema migrations in order. Safe to run on every start.
    pub fn migrate(&self) -> StudyResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_foundation.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/002_progress.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/003_goals.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/004_achievements.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/005_event_log.sql"))?;
        Ok(())
    }

    /// Run `f` in one transaction: committed if it returns `Ok`, rolled back
    /// otherwise. Not reentrant; `f` must not call this again.
    pub fn in_transaction<T>(&self, f: impl FnOnce(&Self) -> StudyResult<T>) -> StudyResult<T> {
        let tx = self.conn.unchecked_transaction()?;
        let out = f(self)?;
        tx.commit()?;
        Ok(out)
    }

    // ── Event log ──────────────────────────────────────────────

    pub fn append_event(&self, entry: &EventLogEntry) -> StudyResult<()> {
        self.conn.execute(
            "INSERT INTO event_log (user_id, event_type, payload, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                entry.user_id,
                entry.event_type,
                serde_json::to_string(&entry.event)?,
                entry.created_at,
            ],
        )?;
        Ok(())
    }

    /// Most recent entries first.
    pub fn events_for_user(&self, user_id: &str, limit: u32) -> StudyResult<Vec<EventLogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, event_type, payload, created_at
             FROM event_log WHERE user_id = ?1
             ORDER BY id DESC LIMIT ?2",
        )?;
        let entries = stmt
            .query_map(params![user_id, limit], |row| {
                Ok(EventLogEntry {
                    id: Some(row.get(0)?),
                    user_id: row.get(1)?,
                    event_type: row.get(2)?,
                    event: json_column(row, 3)?,
                    created_at: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }
}

/// Decode a JSON text column, surfacing bad JSON as a conversion failure.
fn json_column<T: DeserializeOwned>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Map a UNIQUE violation to a domain conflict; pass everything else through.
fn conflict_on_unique(err: rusqlite::Error, message: &str) -> StudyError {
    match &err {
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
        {
            StudyError::Conflict(message.to_string())
        }
        _ => StudyError::Database(err),
    }
}
