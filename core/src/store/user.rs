use super::{conflict_on_unique, json_column, StudyStore};
use crate::{
    account::UserRecord,
    achievements::LearnerStats,
    error::StudyResult,
    leaderboard::{LeaderboardEntry, LeaderboardKind},
    types::Points,
};
use chrono::NaiveDate;
use rusqlite::{params, types::Type, OptionalExtension, Row};

const USER_COLUMNS: &str = "id, username, password_hash, grade_level, subjects, joined_date,
                            current_streak, total_points, last_active_date";

impl StudyStore {
    // ── Users ─────────────────────────────────────────────────────

    pub fn insert_user(&self, user: &UserRecord) -> StudyResult<()> {
        self.conn
            .execute(
                "INSERT INTO users (
                    id, username, password_hash, grade_level, subjects, joined_date,
                    current_streak, total_points, last_active_date
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    &user.id,
                    &user.username,
                    &user.password_hash,
                    &user.grade_level,
                    serde_json::to_string(&user.subjects)?,
                    &user.joined_date,
                    user.current_streak,
                    user.total_points,
                    user.last_active_date.map(|d| d.to_string()),
                ],
            )
            .map_err(|e| conflict_on_unique(e, "Username already exists"))?;
        Ok(())
    }

    pub fn username_exists(&self, username: &str) -> StudyResult<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM users WHERE username = ?1",
                params![username],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    pub fn user_by_id(&self, user_id: &str) -> StudyResult<Option<UserRecord>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1");
        Ok(self
            .conn
            .query_row(&sql, params![user_id], user_from_row)
            .optional()?)
    }

    pub fn user_by_username(&self, username: &str) -> StudyResult<Option<UserRecord>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1");
        Ok(self
            .conn
            .query_row(&sql, params![username], user_from_row)
            .optional()?)
    }

    pub fn add_points(&self, user_id: &str, delta: Points) -> StudyResult<()> {
        self.conn.execute(
            "UPDATE users SET total_points = total_points + ?1 WHERE id = ?2",
            params![delta, user_id],
        )?;
        Ok(())
    }

    pub fn set_streak(&self, user_id: &str, streak: i64, active_on: NaiveDate) -> StudyResult<()> {
        self.conn.execute(
            "UPDATE users SET current_streak = ?1, last_active_date = ?2 WHERE id = ?3",
            params![streak, active_on.to_string(), user_id],
        )?;
        Ok(())
    }

    /// Streak, points and completed-content count, or `None` for an unknown user.
    pub fn learner_stats(&self, user_id: &str) -> StudyResult<Option<LearnerStats>> {
        Ok(self
            .conn
            .query_row(
                "SELECT u.current_streak, u.total_points,
                        (SELECT COUNT(*) FROM user_progress p
                         WHERE p.user_id = u.id AND p.completed = 1)
                 FROM users u WHERE u.id = ?1",
                params![user_id],
                |row| {
                    Ok(LearnerStats {
                        current_streak: row.get(0)?,
                        total_points: row.get(1)?,
                        completed_content: row.get(2)?,
                    })
                },
            )
            .optional()?)
    }

    pub fn leaderboard(
        &self,
        kind: LeaderboardKind,
        limit: u32,
    ) -> StudyResult<Vec<LeaderboardEntry>> {
        let order = match kind {
            LeaderboardKind::Points => "total_points DESC, current_streak DESC",
            LeaderboardKind::Streak => "current_streak DESC, total_points DESC",
        };
        let mut stmt = self.conn.prepare(&format!(
            "SELECT username, total_points, current_streak FROM users
             ORDER BY {order}, username ASC LIMIT ?1"
        ))?;
        let rows = stmt.query_map(params![limit], |row| {
            Ok(LeaderboardEntry {
                username: row.get(0)?,
                total_points: row.get(1)?,
                current_streak: row.get(2)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRecord> {
    let last_active_date = row
        .get::<_, Option<String>>(8)?
        .map(|s| {
            s.parse::<NaiveDate>()
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(8, Type::Text, Box::new(e)))
        })
        .transpose()?;
    Ok(UserRecord {
        id: row.get(0)?,
        username: row.get(1)?,
        password_hash: row.get(2)?,
        grade_level: row.get(3)?,
        subjects: json_column(row, 4)?,
        joined_date: row.get(5)?,
        current_streak: row.get(6)?,
        total_points: row.get(7)?,
        last_active_date,
    })
}
