use axum::{
    extract::{Request, State},
    http::{Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use studystream_core::StudyError;
use thiserror::Error;

use crate::{config::Environment, state::AppState};

const MASKED_MESSAGE: &str = "Something went wrong";

/// Text of the error behind a 500, riding on the response until
/// [`internal_error_details`] decides whether to show it.
#[derive(Debug, Clone)]
struct InternalDetail(String);

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Study(#[from] StudyError),

    #[error("Access token required")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Not allowed to access another user's data")]
    Forbidden,

    #[error("{0}")]
    BadRequest(String),

    #[error("Cannot {method} {path}")]
    RouteNotFound { method: Method, path: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Study(e) => match e {
                StudyError::Validation(_)      => StatusCode::BAD_REQUEST,
                StudyError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                StudyError::InvalidToken(_)    => StatusCode::FORBIDDEN,
                StudyError::NotFound { .. }    => StatusCode::NOT_FOUND,
                StudyError::Conflict(_)        => StatusCode::CONFLICT,
                _                              => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::MissingToken          => StatusCode::UNAUTHORIZED,
            ApiError::InvalidToken          => StatusCode::FORBIDDEN,
            ApiError::Forbidden             => StatusCode::FORBIDDEN,
            ApiError::BadRequest(_)         => StatusCode::BAD_REQUEST,
            ApiError::RouteNotFound { .. }  => StatusCode::NOT_FOUND,
            ApiError::Internal(_)           => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::RouteNotFound { .. } => json!({
                "error": "Route not found",
                "message": self.to_string(),
            }),
            ApiError::Study(StudyError::InvalidToken(_)) => json!({ "error": "Invalid token" }),
            _ if status == StatusCode::INTERNAL_SERVER_ERROR => {
                log::error!("Error: {self}");
                let mut response = internal_error(MASKED_MESSAGE).into_response();
                response.extensions_mut().insert(InternalDetail(self.to_string()));
                return response;
            }
            _ => json!({ "error": self.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

fn internal_error(message: &str) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Internal server error", "message": message })),
    )
}

/// Middleware: in development, 500 bodies carry the underlying error text;
/// otherwise they keep the generic message.
pub async fn internal_error_details(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let mut response = next.run(req).await;
    let detail = response.extensions_mut().remove::<InternalDetail>();
    match detail {
        Some(InternalDetail(detail)) if state.environment == Environment::Development => {
            internal_error(&detail).into_response()
        }
        _ => response,
    }
}
