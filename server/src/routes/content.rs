use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use studystream_core::{content::ContentFilter, progress::ProgressUpdate, StudyError};

use super::{bad_json, bad_query};
use crate::{auth::AuthUser, error::ApiError, state::AppState};

#[derive(Debug, Default, Deserialize)]
pub struct ContentQuery {
    subject:    Option<String>,
    difficulty: Option<String>,
    #[serde(rename = "type")]
    kind:       Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressBody {
    user_id:             Option<String>,
    progress_percentage: Option<f64>,
    time_spent:          Option<f64>,
    completed:           Option<bool>,
}

pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<ContentQuery>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(q) = query.map_err(bad_query)?;
    let filter =
        ContentFilter::parse(q.subject.as_deref(), q.difficulty.as_deref(), q.kind.as_deref())
        .map_err(StudyError::from)?;
    let content = state.run(move |s| s.list_content(&filter)).await?;
    Ok(Json(json!({ "content": content })))
}

pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let content = state.run(move |s| s.content(&id)).await?;
    Ok(Json(json!({ "content": content })))
}

pub async fn recommendations(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    auth.require_self(&user_id)?;
    let recommendations = state.run(move |s| s.recommendations(&user_id)).await?;
    Ok(Json(json!({ "recommendations": recommendations })))
}

pub async fn record_progress(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(content_id): Path<String>,
    payload: Result<Json<ProgressBody>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(body) = payload.map_err(bad_json)?;
    let user_id = body.user_id.filter(|u| !u.is_empty());
    let (Some(user_id), Some(percentage)) = (user_id, body.progress_percentage) else {
        return Err(ApiError::BadRequest(
            "User ID and progress percentage are required".into(),
        ));
    };
    auth.require_self(&user_id)?;

    let update = ProgressUpdate::new(
        &content_id,
        percentage.round() as i64,
        body.time_spent.map(|t| t.round() as i64),
        body.completed.unwrap_or(false),
    )?;
    let outcome = state.run(move |s| s.record_progress(&user_id, update)).await?;

    let message = if outcome.created {
        "Progress recorded successfully"
    } else {
        "Progress updated successfully"
    };
    Ok(Json(json!({
        "message": message,
        "progressId": outcome.progress_id,
        "progressPercentage": outcome.progress_percentage,
        "completed": outcome.completed,
        "pointsAwarded": outcome.points_awarded,
        "currentStreak": outcome.current_streak,
    })))
}
