use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::bad_query;
use crate::{auth::AuthUser, error::ApiError, state::AppState};

const DEFAULT_ACTIVITY_LIMIT: u32 = 20;
const MAX_ACTIVITY_LIMIT: u32 = 200;

#[derive(Debug, Default, Deserialize)]
pub struct ActivityQuery {
    limit: Option<u32>,
}

pub async fn progress(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    auth.require_self(&user_id)?;
    let progress = state.run(move |s| s.progress(&user_id)).await?;
    Ok(Json(json!({ "progress": progress })))
}

pub async fn activity(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<String>,
    query: Result<Query<ActivityQuery>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(q) = query.map_err(bad_query)?;
    auth.require_self(&user_id)?;
    let limit = q
        .limit
        .unwrap_or(DEFAULT_ACTIVITY_LIMIT)
        .clamp(1, MAX_ACTIVITY_LIMIT);
    let activity = state.run(move |s| s.activity(&user_id, limit)).await?;
    Ok(Json(json!({ "activity": activity })))
}
