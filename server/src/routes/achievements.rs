use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use studystream_core::leaderboard::{clamp_limit, LeaderboardKind};

use super::bad_query;
use crate::{auth::AuthUser, error::ApiError, state::AppState};

#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    limit: Option<i64>,
}

pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    auth.require_self(&user_id)?;
    let achievements = state.run(move |s| s.achievements(&user_id)).await?;
    Ok(Json(json!({ "achievements": achievements })))
}

pub async fn check(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    auth.require_self(&user_id)?;
    let awarded = state.run(move |s| s.check_achievements(&user_id)).await?;
    Ok(Json(json!({
        "message": "Achievement check completed",
        "awarded": awarded,
    })))
}

pub async fn leaderboard_points(
    state: State<AppState>,
    query: Result<Query<LimitQuery>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    leaderboard(state, query, LeaderboardKind::Points).await
}

pub async fn leaderboard_streak(
    state: State<AppState>,
    query: Result<Query<LimitQuery>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    leaderboard(state, query, LeaderboardKind::Streak).await
}

async fn leaderboard(
    State(state): State<AppState>,
    query: Result<Query<LimitQuery>, QueryRejection>,
    kind: LeaderboardKind,
) -> Result<Json<Value>, ApiError> {
    let Query(q) = query.map_err(bad_query)?;
    let limit = clamp_limit(q.limit);
    let leaderboard = state.run(move |s| s.leaderboard(kind, limit)).await?;
    Ok(Json(json!({ "leaderboard": leaderboard })))
}
