//! Learner accounts: registration input, stored record and public profile.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    error::{StudyError, StudyResult},
    types::{Points, UserId},
};

/// A learner row as stored, including the password hash.
#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub id:               UserId,
    pub username:         String,
    pub password_hash:    String,
    pub grade_level:      String,
    pub subjects:         Vec<String>,
    pub joined_date:      String,
    pub current_streak:   i64,
    pub total_points:     Points,
    pub last_active_date: Option<NaiveDate>,
}

/// What the API shows about a learner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id:             UserId,
    pub username:       String,
    pub grade_level:    String,
    pub subjects:       Vec<String>,
    pub joined_date:    String,
    pub current_streak: i64,
    pub total_points:   Points,
}

impl From<&UserRecord> for UserProfile {
    fn from(u: &UserRecord) -> Self {
        Self {
            id: u.id.clone(),
            username: u.username.clone(),
            grade_level: u.grade_level.clone(),
            subjects: u.subjects.clone(),
            joined_date: u.joined_date.clone(),
            current_streak: u.current_streak,
            total_points: u.total_points,
        }
    }
}

/// Registration input. Missing and `null` fields both read as empty so
/// [`Registration::validate`] reports them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    #[serde(default, deserialize_with = "null_as_default")]
    pub username:    String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub password:    String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub grade_level: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub subjects:    Vec<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Registration {
    pub fn validate(&self) -> StudyResult<()> {
        let blank = |s: &str| s.trim().is_empty();
        if blank(&self.username)
            || self.password.is_empty()
            || blank(&self.grade_level)
            || self.subjects.iter().all(|s| blank(s))
        {
            return Err(StudyError::validation(
                "All fields are required and at least one subject must be selected",
            ));
        }
        Ok(())
    }

    /// Subjects with whitespace trimmed, blanks and duplicates removed,
    /// first occurrence order kept.
    pub fn normalized_subjects(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for s in self.subjects.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
            if !out.iter().any(|o| o == s) {
                out.push(s.to_string());
            }
        }
        out
    }
}

/// A freshly authenticated learner.
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub token: String,
    pub user:  UserProfile,
}
