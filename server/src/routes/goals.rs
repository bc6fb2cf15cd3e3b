use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use studystream_core::{
    goals::{GoalType, GoalUpdate, NewGoal},
    StudyError,
};

use super::{bad_json, bad_query};
use crate::{auth::AuthUser, error::ApiError, state::AppState};

#[derive(Debug, Default, Deserialize)]
pub struct GoalQuery {
    #[serde(rename = "type")]
    goal_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGoalBody {
    user_id:      Option<String>,
    title:        Option<String>,
    description:  Option<String>,
    target_value: Option<i64>,
    goal_type:    Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGoalBody {
    current_value: Option<i64>,
    completed:     Option<bool>,
}

/// `GET /api/goals/{userId}`
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<String>,
    query: Result<Query<GoalQuery>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(q) = query.map_err(bad_query)?;
    auth.require_self(&user_id)?;
    let goal_type = q
        .goal_type
        .filter(|t| !t.is_empty())
        .map(|t| t.parse::<GoalType>())
        .transpose()
        .map_err(StudyError::from)?;
    let goals = state.run(move |s| s.goals(&user_id, goal_type)).await?;
    Ok(Json(json!({ "goals": goals })))
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    payload: Result<Json<CreateGoalBody>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(body) = payload.map_err(bad_json)?;
    let new = NewGoal::new(
        body.user_id.as_deref(),
        body.title.as_deref(),
        body.description.as_deref(),
        body.target_value,
        body.goal_type.as_deref(),
    )?;
    auth.require_self(&new.user_id)?;
    let goal = state.run(move |s| s.create_goal(new)).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Goal created successfully", "goal": goal })),
    ))
}

/// `PUT /api/goals/{goalId}`
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(goal_id): Path<String>,
    payload: Result<Json<UpdateGoalBody>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(body) = payload.map_err(bad_json)?;
    let current_value = body
        .current_value
        .ok_or_else(|| ApiError::BadRequest("Current value is required".into()))?;
    let update = GoalUpdate {
        current_value,
        completed: body.completed.unwrap_or(false),
    };

    let caller = auth.user_id().to_string();
    let goal = state
        .run(move |s| {
            let goal = s.goal(&goal_id)?;
            if goal.user_id != caller {
                return Ok(None);
            }
            s.update_goal(&goal_id, update).map(Some)
        })
        .await?
        .ok_or(ApiError::Forbidden)?;
    Ok(Json(json!({ "message": "Goal updated successfully", "goal": goal })))
}

/// `DELETE /api/goals/{goalId}`
pub async fn remove(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(goal_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let caller = auth.user_id().to_string();
    let deleted = state
        .run(move |s| {
            let goal = s.goal(&goal_id)?;
            if goal.user_id != caller {
                return Ok(false);
            }
            s.delete_goal(&goal_id).map(|_| true)
        })
        .await?;
    if !deleted {
        return Err(ApiError::Forbidden);
    }
    Ok(Json(json!({ "message": "Goal deleted successfully" })))
}

pub async fn suggestions(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    auth.require_self(&user_id)?;
    let suggestions = state.run(move |s| s.goal_suggestions(&user_id)).await?;
    Ok(Json(json!({ "suggestions": suggestions })))
}
