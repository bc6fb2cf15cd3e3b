//! Progress tracking, completion points and daily streaks.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    error::{StudyError, StudyResult},
    types::{ContentId, Points, UserId},
};

/// Points credited the first time a piece of content is completed.
pub const COMPLETION_POINTS: Points = 50;

/// A progress report for one piece of content.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressUpdate {
    pub content_id:          ContentId,
    pub progress_percentage: u8,
    pub time_spent_minutes:  u32,
    pub completed:           bool,
}

impl ProgressUpdate {
    pub fn new(
        content_id: &str,
        progress_percentage: i64,
        time_spent_minutes: Option<i64>,
        completed: bool,
    ) -> StudyResult<Self> {
        let progress_percentage = u8::try_from(progress_percentage)
            .ok()
            .filter(|p| *p <= 100)
            .ok_or_else(|| {
                StudyError::validation("Progress percentage must be between 0 and 100")
            })?;
        let time_spent_minutes = u32::try_from(time_spent_minutes.unwrap_or(0))
            .map_err(|_| StudyError::validation("Time spent must not be negative"))?;
        Ok(Self {
            content_id: content_id.to_string(),
            progress_percentage,
            time_spent_minutes,
            completed,
        })
    }
}

/// A stored progress row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProgressRecord {
    pub id:                  String,
    pub user_id:             UserId,
    pub content_id:          ContentId,
    pub progress_percentage: u8,
    pub completed:           bool,
    pub time_spent_minutes:  u32,
    pub completed_at:        Option<String>,
    pub created_at:          String,
    pub updated_at:          String,
    /// Whether completion points were ever credited for this row.
    #[serde(skip)]
    pub rewarded:            bool,
}

/// A progress row joined with its content, for dashboards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProgressSummary {
    #[serde(flatten)]
    pub record:  ProgressRecord,
    pub title:   String,
    pub subject: String,
}

/// Result of recording progress.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressOutcome {
    pub progress_id:         String,
    pub progress_percentage: u8,
    pub completed:           bool,
    pub points_awarded:      Points,
    pub current_streak:      i64,
    /// True when a new row was inserted rather than updated.
    #[serde(skip)]
    pub created:             bool,
}

/// Points owed for this update given the previous row, if any.
/// Completion pays once per (user, content) no matter how often it toggles.
pub fn completion_reward(previous: Option<&ProgressRecord>, update: &ProgressUpdate) -> Points {
    let already_rewarded = previous.map(|p| p.rewarded).unwrap_or(false);
    if update.completed && !already_rewarded {
        COMPLETION_POINTS
    } else {
        0
    }
}

/// Streak after activity on `today`.
///
/// Activity on consecutive days extends the streak; a second activity on the
/// same day leaves it alone; any gap restarts it at one.
pub fn next_streak(last_active: Option<NaiveDate>, current: i64, today: NaiveDate) -> i64 {
    match last_active {
        Some(day) if day == today => current.max(1),
        Some(day) if day.succ_opt() == Some(today) => current + 1,
        _ => 1,
    }
}
