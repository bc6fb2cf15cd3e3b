use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use studystream_core::{
    account::Registration,
    credentials::{hash_password, verify_password},
    StudyError,
};

use super::bad_json;
use crate::{auth::AuthUser, error::ApiError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<Registration>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(registration) = payload.map_err(bad_json)?;
    registration.validate()?;

    // Hash outside the service lock.
    let password = registration.password.clone();
    let cost = state.bcrypt_cost;
    let password_hash = state.blocking(move || hash_password(&password, cost)).await?;
    let session = state
        .run(move |s| s.register_with_hash(registration, password_hash))
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User created successfully",
            "token": session.token,
            "user": session.user,
        })),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginBody>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(body) = payload.map_err(bad_json)?;
    let LoginBody { username, password } = body;

    let candidate = password.clone();
    let user = state
        .run(move |s| s.login_account(&username, &candidate))
        .await?;
    let hash = user.password_hash.clone();
    if !state.blocking(move || verify_password(&password, &hash)).await? {
        log::debug!("Rejected password for {}", user.username);
        return Err(StudyError::InvalidCredentials.into());
    }
    let session = state.run(move |s| s.start_session(&user)).await?;
    Ok(Json(json!({
        "message": "Login successful",
        "token": session.token,
        "user": session.user,
    })))
}

pub async fn profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Value>, ApiError> {
    let user_id = auth.user_id().to_string();
    let user = state.run(move |s| s.profile(&user_id)).await?;
    Ok(Json(json!({ "user": user })))
}
