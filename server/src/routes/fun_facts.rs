use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use studystream_core::StudyError;

use crate::{error::ApiError, state::AppState};

pub async fn mascot(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let fact = state
        .run(|s| s.mascot_fact().ok_or_else(|| StudyError::not_found("Fun fact", "mascot")))
        .await?;
    Ok(Json(json!({ "fact": fact })))
}

pub async fn subject(
    State(state): State<AppState>,
    Path(subject): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let fact = state
        .run(move |s| {
            s.subject_fact(&subject)
                .ok_or_else(|| StudyError::not_found("Fun fact", &subject))
        })
        .await?;
    Ok(Json(json!({ "fact": fact })))
}
