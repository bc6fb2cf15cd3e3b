//! The activity ledger.
//!
//! RULE: every change to a learner's points goes through an event.
//! The store appends the event in the same transaction as the change,
//! so the ledger and `users.total_points` never disagree.

use crate::types::{ContentId, GoalId, Points, UserId};
use serde::{Deserialize, Serialize};

/// Every event recorded against a learner.
/// Variants are only ever added; stored payloads must keep decoding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StudyEvent {
    UserRegistered {
        username: String,
    },

    // ── Progress ───────────────────────────────────
    ProgressRecorded {
        content_id: ContentId,
        progress_percentage: u8,
        time_spent_minutes: u32,
    },
    ContentCompleted {
        content_id: ContentId,
    },
    StreakUpdated {
        streak: i64,
    },

    // ── Points and achievements ───────────────────
    PointsAwarded {
        points: Points,
        reason: String,
    },
    AchievementEarned {
        achievement_type: String,
        title: String,
        points: Points,
    },

    // ── Goals ──────────────────────────────────────
    GoalCreated {
        goal_id: GoalId,
        title: String,
    },
    GoalCompleted {
        goal_id: GoalId,
    },
    GoalDeleted {
        goal_id: GoalId,
    },
}

impl StudyEvent {
    /// Stable name for the `event_type` column.
    pub fn type_name(&self) -> &'static str {
        match self {
            StudyEvent::UserRegistered { .. }    => "user_registered",
            StudyEvent::ProgressRecorded { .. }  => "progress_recorded",
            StudyEvent::ContentCompleted { .. }  => "content_completed",
            StudyEvent::StreakUpdated { .. }     => "streak_updated",
            StudyEvent::PointsAwarded { .. }     => "points_awarded",
            StudyEvent::AchievementEarned { .. } => "achievement_earned",
            StudyEvent::GoalCreated { .. }       => "goal_created",
            StudyEvent::GoalCompleted { .. }     => "goal_completed",
            StudyEvent::GoalDeleted { .. }       => "goal_deleted",
        }
    }
}

/// One row of `event_log`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventLogEntry {
    pub id:         Option<i64>,
    pub user_id:    UserId,
    pub event_type: String,
    pub event:      StudyEvent,
    pub created_at: String,
}

impl EventLogEntry {
    pub fn new(user_id: &str, event: StudyEvent, created_at: String) -> Self {
        Self {
            id: None,
            user_id: user_id.to_string(),
            event_type: event.type_name().to_string(),
            event,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_is_tagged_with_type_name() {
        let event = StudyEvent::PointsAwarded {
            points: 50,
            reason: "content_completed".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], event.type_name());
        assert_eq!(json["points"], 50);
    }

    #[test]
    fn entry_copies_type_name() {
        let entry = EventLogEntry::new(
            "u1",
            StudyEvent::GoalDeleted { goal_id: "g1".into() },
            "2024-01-01T00:00:00.000Z".into(),
        );
        assert_eq!(entry.event_type, "goal_deleted");
        assert!(entry.id.is_none());
    }
}
