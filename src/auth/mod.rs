pub mod directory;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::database::models::Role;

/// Authentication failures. Both token problems map to HTTP 401; the
/// distinction matters only for logging.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredential,

    #[error("credential expired")]
    Expired,

    #[error("token generation failed: {0}")]
    TokenGeneration(String),
}

/// JWT payload binding an employee id and role to an 8-hour session.
///
/// Verification only proves the token was signed by us; callers must still
/// re-resolve the live user row, since the role can change out-of-band via
/// a later login.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub employee_id: String,
    pub username: String,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(employee_id: String, username: String, role: Role, expiry_hours: i64) -> Self {
        let now = Utc::now();
        Self {
            employee_id,
            username,
            role,
            exp: (now + Duration::hours(expiry_hours)).timestamp(),
            iat: now.timestamp(),
        }
    }
}

/// Sign the claims with the process-wide secret (HS256).
pub fn issue_token(claims: &Claims, secret: &str) -> Result<String, AuthError> {
    let key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &key).map_err(|e| AuthError::TokenGeneration(e.to_string()))
}

/// Verify signature and expiry, returning the embedded identity.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    let data = decode::<Claims>(token, &key, &Validation::default()).map_err(|e| {
        match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
            _ => AuthError::InvalidCredential,
        }
    })?;
    Ok(data.claims)
}
