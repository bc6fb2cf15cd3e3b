use super::StudyStore;
use crate::{
    error::StudyResult,
    progress::{ProgressRecord, ProgressSummary},
};
use rusqlite::{params, OptionalExtension, Row};

const PROGRESS_COLUMNS: &str = "p.id, p.user_id, p.content_id, p.progress_percentage, p.completed,
                                p.time_spent_minutes, p.completed_at, p.created_at, p.updated_at,
                                p.rewarded";

impl StudyStore {
    // ── Progress ──────────────────────────────────────────────────

    pub fn progress_for(
        &self,
        user_id: &str,
        content_id: &str,
    ) -> StudyResult<Option<ProgressRecord>> {
        let sql = format!(
            "SELECT {PROGRESS_COLUMNS} FROM user_progress p
             WHERE p.user_id = ?1 AND p.content_id = ?2"
        );
        Ok(self
            .conn
            .query_row(&sql, params![user_id, content_id], progress_from_row)
            .optional()?)
    }

    pub fn insert_progress(&self, p: &ProgressRecord) -> StudyResult<()> {
        self.conn.execute(
            "INSERT INTO user_progress (
                id, user_id, content_id, progress_percentage, completed,
                time_spent_minutes, completed_at, created_at, updated_at, rewarded
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                &p.id,
                &p.user_id,
                &p.content_id,
                p.progress_percentage,
                p.completed,
                p.time_spent_minutes,
                &p.completed_at,
                &p.created_at,
                &p.updated_at,
                p.rewarded,
            ],
        )?;
        Ok(())
    }

    /// Overwrite the mutable columns of an existing row, keyed by `p.id`.
    pub fn update_progress(&self, p: &ProgressRecord) -> StudyResult<()> {
        self.conn.execute(
            "UPDATE user_progress
             SET progress_percentage = ?1, completed = ?2, time_spent_minutes = ?3,
                 completed_at = ?4, updated_at = ?5, rewarded = ?6
             WHERE id = ?7",
            params![
                p.progress_percentage,
                p.completed,
                p.time_spent_minutes,
                &p.completed_at,
                &p.updated_at,
                p.rewarded,
                &p.id,
            ],
        )?;
        Ok(())
    }

    /// A learner's progress rows with content title and subject, most
    /// recently touched first.
    pub fn progress_for_user(&self, user_id: &str) -> StudyResult<Vec<ProgressSummary>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PROGRESS_COLUMNS}, c.title, c.subject
             FROM user_progress p
             JOIN content c ON c.id = p.content_id
             WHERE p.user_id = ?1
             ORDER BY p.updated_at DESC, p.id ASC"
        ))?;
        let rows = stmt.query_map(params![user_id], |row| {
            Ok(ProgressSummary {
                record: progress_from_row(row)?,
                title: row.get(10)?,
                subject: row.get(11)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}

fn progress_from_row(row: &Row<'_>) -> rusqlite::Result<ProgressRecord> {
    Ok(ProgressRecord {
        id: row.get(0)?,
        user_id: row.get(1)?,
        content_id: row.get(2)?,
        progress_percentage: row.get(3)?,
        completed: row.get::<_, i32>(4)? != 0,
        time_spent_minutes: row.get(5)?,
        completed_at: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
        rewarded: row.get::<_, i32>(9)? != 0,
    })
}
