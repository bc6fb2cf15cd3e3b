use super::StudyStore;
use crate::{
    error::StudyResult,
    goals::{Goal, GoalType},
};
use rusqlite::{params, types::ToSql, params_from_iter, OptionalExtension, Row};

const GOAL_COLUMNS: &str = "id, user_id, title, description, target_value, current_value,
                            completed, goal_type, created_at, updated_at, rewarded";

impl StudyStore {
    // ── Goals ─────────────────────────────────────────────────────

    pub fn insert_goal(&self, g: &Goal) -> StudyResult<()> {
        self.conn.execute(
            "INSERT INTO goals (
                id, user_id, title, description, target_value, current_value,
                completed, goal_type, created_at, updated_at, rewarded
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                &g.id,
                &g.user_id,
                &g.title,
                &g.description,
                g.target_value,
                g.current_value,
                g.completed,
                g.goal_type,
                &g.created_at,
                &g.updated_at,
                g.rewarded,
            ],
        )?;
        Ok(())
    }

    pub fn goal_by_id(&self, goal_id: &str) -> StudyResult<Option<Goal>> {
        let sql = format!("SELECT {GOAL_COLUMNS} FROM goals WHERE id = ?1");
        Ok(self
            .conn
            .query_row(&sql, params![goal_id], goal_from_row)
            .optional()?)
    }

    /// Newest first, optionally restricted to one goal type.
    pub fn goals_for_user(
        &self,
        user_id: &str,
        goal_type: Option<GoalType>,
    ) -> StudyResult<Vec<Goal>> {
        let mut sql = format!("SELECT {GOAL_COLUMNS} FROM goals WHERE user_id = ?");
        let mut args: Vec<&dyn ToSql> = vec![&user_id];
        if let Some(goal_type) = &goal_type {
            sql.push_str(" AND goal_type = ?");
            args.push(goal_type);
        }
        sql.push_str(" ORDER BY created_at DESC, id ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(args), goal_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Returns false when no goal has this id. `rewarded` only ever moves
    /// from 0 to 1.
    pub fn update_goal_progress(
        &self,
        goal_id: &str,
        current_value: i64,
        completed: bool,
        rewarded: bool,
        updated_at: &str,
    ) -> StudyResult<bool> {
        let changed = self.conn.execute(
            "UPDATE goals
             SET current_value = ?1, completed = ?2, rewarded = MAX(rewarded, ?3), updated_at = ?4
             WHERE id = ?5",
            params![current_value, completed, rewarded, updated_at, goal_id],
        )?;
        Ok(changed > 0)
    }

    /// Returns false when no goal has this id.
    pub fn delete_goal(&self, goal_id: &str) -> StudyResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM goals WHERE id = ?1", params![goal_id])?;
        Ok(changed > 0)
    }
}

fn goal_from_row(row: &Row<'_>) -> rusqlite::Result<Goal> {
    Ok(Goal {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        target_value: row.get(4)?,
        current_value: row.get(5)?,
        completed: row.get::<_, i32>(6)? != 0,
        goal_type: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
        rewarded: row.get::<_, i32>(10)? != 0,
    })
}
