use super::StudyStore;
use crate::{
    config::CatalogEntry,
    content::{ContentFilter, ContentItem},
    error::StudyResult,
};
use rusqlite::{params, params_from_iter, types::ToSql, OptionalExtension, Row};

const CONTENT_COLUMNS: &str = "id, title, subject, content_type, difficulty, duration_minutes,
                               description, thumbnail_url, created_at";

impl StudyStore {
    // ── Content ───────────────────────────────────────────────────

    /// Insert catalog items that are not already present. Returns how many
    /// rows were new.
    pub fn seed_content(&self, entries: &[CatalogEntry], created_at: &str) -> StudyResult<usize> {
        let mut stmt = self.conn.prepare(
            "INSERT OR IGNORE INTO content (
                id, title, subject, content_type, difficulty, duration_minutes,
                description, thumbnail_url, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )?;
        let mut inserted = 0;
        for e in entries {
            inserted += stmt.execute(params![
                &e.id,
                &e.title,
                &e.subject,
                e.content_type,
                e.difficulty,
                e.duration_minutes,
                &e.description,
                &e.thumbnail_url,
                created_at,
            ])?;
        }
        Ok(inserted)
    }

    pub fn list_content(&self, filter: &ContentFilter) -> StudyResult<Vec<ContentItem>> {
        let mut sql = format!("SELECT {CONTENT_COLUMNS} FROM content WHERE 1=1");
        let mut args: Vec<&dyn ToSql> = Vec::new();
        if let Some(subject) = &filter.subject {
            sql.push_str(" AND subject = ?");
            args.push(subject);
        }
        if let Some(difficulty) = &filter.difficulty {
            sql.push_str(" AND difficulty = ?");
            args.push(difficulty);
        }
        if let Some(content_type) = &filter.content_type {
            sql.push_str(" AND content_type = ?");
            args.push(content_type);
        }
        sql.push_str(" ORDER BY created_at DESC, title ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(args), content_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn content_by_id(&self, content_id: &str) -> StudyResult<Option<ContentItem>> {
        let sql = format!("SELECT {CONTENT_COLUMNS} FROM content WHERE id = ?1");
        Ok(self
            .conn
            .query_row(&sql, params![content_id], content_from_row)
            .optional()?)
    }

    /// All content in any of `subjects`, unordered.
    pub fn content_for_subjects(&self, subjects: &[String]) -> StudyResult<Vec<ContentItem>> {
        if subjects.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; subjects.len()].join(", ");
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CONTENT_COLUMNS} FROM content WHERE subject IN ({placeholders})"
        ))?;
        let rows = stmt.query_map(params_from_iter(subjects), content_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}

fn content_from_row(row: &Row<'_>) -> rusqlite::Result<ContentItem> {
    Ok(ContentItem {
        id: row.get(0)?,
        title: row.get(1)?,
        subject: row.get(2)?,
        content_type: row.get(3)?,
        difficulty: row.get(4)?,
        duration_minutes: row.get(5)?,
        description: row.get(6)?,
        thumbnail_url: row.get(7)?,
        created_at: row.get(8)?,
    })
}
