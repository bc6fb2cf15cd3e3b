//! Learner goals and daily goal suggestions.

use serde::{Deserialize, Serialize};

use crate::{
    error::{StudyError, StudyResult},
    types::{text_enum, GoalId, Points, UserId},
};

/// Points credited when a goal becomes completed.
pub const GOAL_COMPLETION_POINTS: Points = 25;

text_enum! {
    GoalType ("goal type") {
        Daily => "daily",
        Weekly => "weekly",
        Monthly => "monthly",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Goal {
    pub id:            GoalId,
    pub user_id:       UserId,
    pub title:         String,
    pub description:   String,
    pub target_value:  i64,
    pub current_value: i64,
    pub completed:     bool,
    pub goal_type:     GoalType,
    pub created_at:    String,
    pub updated_at:    String,
    #[serde(skip)]
    pub rewarded:      bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewGoal {
    pub user_id:      UserId,
    pub title:        String,
    pub description:  String,
    pub target_value: i64,
    pub goal_type:    GoalType,
}

impl NewGoal {
    /// Validate raw request fields. Any missing field yields the same message.
    pub fn new(
        user_id: Option<&str>,
        title: Option<&str>,
        description: Option<&str>,
        target_value: Option<i64>,
        goal_type: Option<&str>,
    ) -> StudyResult<Self> {
        let required = || StudyError::validation("All fields are required");
        let present = |v: Option<&str>| {
            v.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
        };

        let user_id = present(user_id).ok_or_else(required)?;
        let title = present(title).ok_or_else(required)?;
        let target_value = target_value.filter(|v| *v != 0).ok_or_else(required)?;
        let goal_type: GoalType = present(goal_type).ok_or_else(required)?.parse()?;
        if target_value < 0 {
            return Err(StudyError::validation("Target value must be positive"));
        }
        Ok(Self {
            user_id,
            title,
            description: description.unwrap_or_default().to_string(),
            target_value,
            goal_type,
        })
    }
}

/// A progress report on an existing goal. `completed` is taken as sent;
/// reaching the target does not complete a goal on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoalUpdate {
    pub current_value: i64,
    pub completed:     bool,
}

impl GoalUpdate {
    /// Points due for this update. Paid the first time a goal is marked
    /// completed and never again for the same goal.
    pub fn reward(&self, goal: &Goal) -> Points {
        if self.completed && !goal.rewarded {
            GOAL_COMPLETION_POINTS
        } else {
            0
        }
    }
}

/// A goal template offered to a learner; not stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GoalSuggestion {
    pub title:        String,
    pub description:  String,
    pub target_value: i64,
    pub goal_type:    GoalType,
}

/// One video goal per subject, then the two general goals.
pub fn suggestions_for(subjects: &[String]) -> Vec<GoalSuggestion> {
    let mut out: Vec<GoalSuggestion> = subjects
        .iter()
        .map(|subject| GoalSuggestion {
            title: format!("Watch 2 {subject} videos"),
            description: format!("Complete 2 educational videos in {subject}"),
            target_value: 2,
            goal_type: GoalType::Daily,
        })
        .collect();
    out.push(GoalSuggestion {
        title: "Study for 30 minutes".into(),
        description: "Spend 30 minutes on any learning activity".into(),
        target_value: 30,
        goal_type: GoalType::Daily,
    });
    out.push(GoalSuggestion {
        title: "Complete 1 quiz".into(),
        description: "Take and complete one quiz in any subject".into(),
        target_value: 1,
        goal_type: GoalType::Daily,
    });
    out
}
