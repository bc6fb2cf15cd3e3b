use thiserror::Error;

use crate::types::UnknownVariant;

#[derive(Error, Debug)]
pub enum StudyError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Validation(String),

    #[error("{entity} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("{0}")]
    Conflict(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Password hashing failed: {0}")]
    Hashing(#[from] bcrypt::BcryptError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StudyError {
    pub fn validation(msg: impl Into<String>) -> Self {
        StudyError::Validation(msg.into())
    }

    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        StudyError::NotFound {
            entity,
            id: id.into(),
        }
    }
}

impl From<UnknownVariant> for StudyError {
    fn from(e: UnknownVariant) -> Self {
        StudyError::Validation(e.to_string())
    }
}

pub type StudyResult<T> = Result<T, StudyError>;
