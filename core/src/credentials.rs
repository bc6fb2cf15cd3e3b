//! Password hashing and bearer tokens.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::{
    error::{StudyError, StudyResult},
    types::UserId,
};

pub const DEFAULT_BCRYPT_COST: u32 = 10;
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24 * 7;

pub fn hash_password(password: &str, cost: u32) -> StudyResult<String> {
    Ok(bcrypt::hash(password, cost)?)
}

pub fn verify_password(password: &str, hash: &str) -> StudyResult<bool> {
    Ok(bcrypt::verify(password, hash)?)
}

/// Token payload. `sub` is the user id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub sub:      UserId,
    pub username: String,
    pub iat:      i64,
    pub exp:      i64,
}

/// Signs and checks HS256 tokens. Expiry is checked against the caller's
/// clock rather than the process wall time.
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl:      Duration,
}

impl TokenIssuer {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    pub fn issue(&self, user_id: &str, username: &str, now: DateTime<Utc>) -> StudyResult<String> {
        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| StudyError::Other(anyhow::anyhow!("token signing failed: {e}")))
    }

    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> StudyResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        let claims = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|e| StudyError::InvalidToken(e.to_string()))?
            .claims;
        if claims.exp <= now.timestamp() {
            return Err(StudyError::InvalidToken("token expired".into()));
        }
        Ok(claims)
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer").field("ttl", &self.ttl).finish_non_exhaustive()
    }
}
