//! HTTP routes. Handlers translate JSON to service calls and back; all
//! rules live in the core crate.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::{Method, Uri},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use crate::{error::ApiError, state::AppState};

mod achievements;
mod auth;
mod content;
mod fun_facts;
mod goals;
mod users;

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        // Auth
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/profile", get(auth::profile))
        // Content and progress
        .route("/api/content", get(content::list))
        .route("/api/content/{id}", get(content::get_one))
        .route("/api/content/{id}/progress", post(content::record_progress))
        .route("/api/content/recommendations/{user_id}", get(content::recommendations))
        .route("/api/progress/{user_id}", get(users::progress))
        .route("/api/users/{user_id}/activity", get(users::activity))
        // Goals: `{id}` is a user id for GET and a goal id for PUT/DELETE.
        .route("/api/goals", post(goals::create))
        .route(
            "/api/goals/{id}",
            get(goals::list).put(goals::update).delete(goals::remove),
        )
        .route("/api/goals/suggestions/{user_id}", get(goals::suggestions))
        // Achievements
        .route("/api/achievements/{user_id}", get(achievements::list))
        .route("/api/achievements/check/{user_id}", post(achievements::check))
        .route("/api/achievements/leaderboard/points", get(achievements::leaderboard_points))
        .route("/api/achievements/leaderboard/streak", get(achievements::leaderboard_streak))
        // Fun facts
        .route("/api/fun-facts/mascot", get(fun_facts::mascot))
        .route("/api/fun-facts/{subject}", get(fun_facts::subject))
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "OK",
        "message": "StudyStream API is running",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

pub async fn not_found(method: Method, uri: Uri) -> ApiError {
    ApiError::RouteNotFound {
        method,
        path: uri.path().to_string(),
    }
}

fn bad_json(rejection: JsonRejection) -> ApiError {
    ApiError::BadRequest(rejection.body_text())
}

fn bad_query(rejection: QueryRejection) -> ApiError {
    ApiError::BadRequest(rejection.body_text())
}
