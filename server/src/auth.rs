//! Bearer-token authentication for handlers.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use studystream_core::{credentials::Claims, StudyError};

use crate::{error::ApiError, state::AppState};

/// The authenticated caller. Add as a handler argument to require a token.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    pub fn user_id(&self) -> &str {
        &self.0.sub
    }

    /// Callers may only act on their own records.
    pub fn require_self(&self, user_id: &str) -> Result<(), ApiError> {
        if self.0.sub == user_id {
            Ok(())
        } else {
            Err(ApiError::Forbidden)
        }
    }
}

fn bearer_token(parts: &Parts) -> Option<String> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then(|| token.to_string())
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(ApiError::MissingToken)?;
        let claims = state
            .run(move |service| service.authenticate(&token))
            .await
            .map_err(|e| match e {
                ApiError::Study(StudyError::InvalidToken(reason)) => {
                    log::debug!("Rejected token: {reason}");
                    ApiError::InvalidToken
                }
                other => other,
            })?;
        Ok(AuthUser(claims))
    }
}
