use super::StudyStore;
use crate::{achievements::Achievement, error::StudyResult};
use rusqlite::params;

impl StudyStore {
    // ── Achievements ──────────────────────────────────────────────

    /// Insert unless this user already holds this achievement type.
    /// Returns true only when a row was written.
    pub fn insert_achievement_if_absent(&self, a: &Achievement) -> StudyResult<bool> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO achievements (
                id, user_id, achievement_type, title, description, points_awarded, earned_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                &a.id,
                &a.user_id,
                &a.achievement_type,
                &a.title,
                &a.description,
                a.points_awarded,
                &a.earned_at,
            ],
        )?;
        Ok(inserted == 1)
    }

    /// Most recently earned first.
    pub fn achievements_for_user(&self, user_id: &str) -> StudyResult<Vec<Achievement>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, achievement_type, title, description, points_awarded, earned_at
             FROM achievements WHERE user_id = ?1
             ORDER BY earned_at DESC, rowid DESC",
        )?;
        let rows = stmt.query_map(params![user_id], |row| {
            Ok(Achievement {
                id: row.get(0)?,
                user_id: row.get(1)?,
                achievement_type: row.get(2)?,
                title: row.get(3)?,
                description: row.get(4)?,
                points_awarded: row.get(5)?,
                earned_at: row.get(6)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
