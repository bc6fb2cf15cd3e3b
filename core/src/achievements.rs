//! Threshold achievements.
//!
//! Each metric has a ladder of tiers. A check awards only the highest tier
//! the learner currently stands on, so a 30-day streak earns `streak_30`
//! but not `streak_7`. Stats are read once, before any award in the same
//! check. Each (user, achievement_type) pair is awarded at most once; the
//! store enforces this with a unique key.

use serde::{Deserialize, Serialize};

use crate::types::{Points, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    CurrentStreak,
    TotalPoints,
    CompletedContent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AchievementRule {
    pub achievement_type: &'static str,
    pub metric:           Metric,
    pub threshold:        i64,
    pub title:            &'static str,
    pub description:      &'static str,
    pub points:           Points,
}

pub const RULES: [AchievementRule; 6] = [
    AchievementRule {
        achievement_type: "streak_7",
        metric: Metric::CurrentStreak,
        threshold: 7,
        title: "Week Warrior",
        description: "Maintained a 7-day learning streak!",
        points: 100,
    },
    AchievementRule {
        achievement_type: "streak_30",
        metric: Metric::CurrentStreak,
        threshold: 30,
        title: "Month Master",
        description: "Maintained a 30-day learning streak!",
        points: 500,
    },
    AchievementRule {
        achievement_type: "points_1000",
        metric: Metric::TotalPoints,
        threshold: 1000,
        title: "Point Collector",
        description: "Earned 1,000 points!",
        points: 0,
    },
    AchievementRule {
        achievement_type: "points_5000",
        metric: Metric::TotalPoints,
        threshold: 5000,
        title: "Point Master",
        description: "Earned 5,000 points!",
        points: 0,
    },
    AchievementRule {
        achievement_type: "complete_10",
        metric: Metric::CompletedContent,
        threshold: 10,
        title: "Learning Explorer",
        description: "Completed 10 learning activities!",
        points: 50,
    },
    AchievementRule {
        achievement_type: "complete_50",
        metric: Metric::CompletedContent,
        threshold: 50,
        title: "Learning Champion",
        description: "Completed 50 learning activities!",
        points: 200,
    },
];

/// The numbers achievement rules look at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LearnerStats {
    pub current_streak:    i64,
    pub total_points:      Points,
    pub completed_content: i64,
}

impl LearnerStats {
    pub fn value(&self, metric: Metric) -> i64 {
        match metric {
            Metric::CurrentStreak    => self.current_streak,
            Metric::TotalPoints      => self.total_points,
            Metric::CompletedContent => self.completed_content,
        }
    }
}

/// For each metric, the highest tier the stats meet. Table order.
pub fn reached_rules(stats: LearnerStats) -> impl Iterator<Item = &'static AchievementRule> {
    let meets = move |rule: &AchievementRule| stats.value(rule.metric) >= rule.threshold;
    RULES.iter().filter(move |rule| {
        meets(*rule)
            && !RULES.iter().any(|higher| {
                higher.metric == rule.metric && higher.threshold > rule.threshold && meets(higher)
            })
    })
}

/// An earned achievement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Achievement {
    pub id:               String,
    pub user_id:          UserId,
    pub achievement_type: String,
    pub title:            String,
    pub description:      String,
    pub points_awarded:   Points,
    pub earned_at:        String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn types(stats: LearnerStats) -> Vec<&'static str> {
        reached_rules(stats).map(|r| r.achievement_type).collect()
    }

    #[test]
    fn nothing_below_thresholds() {
        let stats = LearnerStats { current_streak: 6, total_points: 999, completed_content: 9 };
        assert!(types(stats).is_empty());
    }

    #[test]
    fn exact_thresholds_qualify() {
        let stats = LearnerStats { current_streak: 7, total_points: 1000, completed_content: 10 };
        assert_eq!(types(stats), ["streak_7", "points_1000", "complete_10"]);
    }

    #[test]
    fn only_the_top_tier_of_each_ladder() {
        let stats = LearnerStats { current_streak: 30, total_points: 5000, completed_content: 50 };
        assert_eq!(types(stats), ["streak_30", "points_5000", "complete_50"]);

        let stats = LearnerStats { current_streak: 29, total_points: 4999, completed_content: 49 };
        assert_eq!(types(stats), ["streak_7", "points_1000", "complete_10"]);
    }

    #[test]
    fn achievement_types_are_unique() {
        let mut seen: Vec<_> = RULES.iter().map(|r| r.achievement_type).collect();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), RULES.len());
    }
}
