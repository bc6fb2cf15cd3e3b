//! Public leaderboards.

use serde::{Deserialize, Serialize};

use crate::types::Points;

pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaderboardKind {
    Points,
    Streak,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LeaderboardEntry {
    pub username:       String,
    pub total_points:   Points,
    pub current_streak: i64,
}

/// Requested row count, defaulted and clamped to `1..=MAX_LIMIT`.
pub fn clamp_limit(requested: Option<i64>) -> u32 {
    match requested {
        None => DEFAULT_LIMIT,
        Some(n) => n.clamp(1, MAX_LIMIT as i64) as u32,
    }
}
