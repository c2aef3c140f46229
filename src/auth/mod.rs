pub mod password;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::SecurityConfig;
use crate::types::{Role, UserStatus};

pub use password::{hash_password, verify_password};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("JWT secret is not configured")]
    InvalidSecret,

    #[error("JWT expiry of {0} hours is out of range")]
    InvalidExpiry(u64),

    #[error("{0}")]
    InvalidToken(String),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),
}

/// How the session was established
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    /// Email and password; the subject is a user id
    Password,
    /// Boarder access code; the subject is a boarder id
    AccessCode,
}

/// Authenticated caller, attached to requests by the auth middleware
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub subject: Uuid,
    pub email: String,
    pub role: Role,
    pub status: UserStatus,
    pub boarder_id: Option<Uuid>,
    pub method: AuthMethod,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: Role,
    pub status: UserStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boarder_id: Option<Uuid>,
    pub method: AuthMethod,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(session: &Session, lifetime: Duration) -> Self {
        let now = Utc::now();
        let exp = (now + lifetime).timestamp();

        Self {
            sub: session.subject,
            email: session.email.clone(),
            role: session.role,
            status: session.status,
            boarder_id: session.boarder_id,
            method: session.method,
            exp,
            iat: now.timestamp(),
        }
    }
}

impl From<Claims> for Session {
    fn from(claims: Claims) -> Self {
        Self {
            subject: claims.sub,
            email: claims.email,
            role: claims.role,
            status: claims.status,
            boarder_id: claims.boarder_id,
            method: claims.method,
        }
    }
}

pub fn issue_token(session: &Session, security: &SecurityConfig) -> Result<String, AuthError> {
    if security.jwt_secret.is_empty() {
        return Err(AuthError::InvalidSecret);
    }

    let lifetime = security
        .token_lifetime()
        .ok_or(AuthError::InvalidExpiry(security.jwt_expiry_hours))?;
    let claims = Claims::new(session, lifetime);
    let encoding_key = EncodingKey::from_secret(security.jwt_secret.as_bytes());

    encode(&Header::default(), &claims, &encoding_key).map_err(|e| AuthError::TokenGeneration(e.to_string()))
}

pub fn decode_token(token: &str, security: &SecurityConfig) -> Result<Claims, AuthError> {
    if security.jwt_secret.is_empty() {
        return Err(AuthError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(security.jwt_secret.as_bytes());
    let token_data = decode::<Claims>(token, &decoding_key, &Validation::default())
        .map_err(|e| AuthError::InvalidToken(format!("Invalid session token: {}", e)))?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn session() -> Session {
        Session {
            subject: Uuid::new_v4(),
            email: "owner@example.com".to_string(),
            role: Role::Landlord,
            status: UserStatus::Approved,
            boarder_id: None,
            method: AuthMethod::Password,
        }
    }

    #[test]
    fn token_carries_role_and_status() {
        let security = AppConfig::development().security;
        let original = session();
        let token = issue_token(&original, &security).unwrap();
        let decoded: Session = decode_token(&token, &security).unwrap().into();
        assert_eq!(decoded, original);
    }

    #[test]
    fn rejects_token_signed_with_other_secret() {
        let security = AppConfig::development().security;
        let token = issue_token(&session(), &security).unwrap();

        let mut other = security.clone();
        other.jwt_secret = "another-secret".to_string();
        assert!(matches!(decode_token(&token, &other), Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn refuses_to_sign_without_secret() {
        let mut security = AppConfig::development().security;
        security.jwt_secret.clear();
        assert!(matches!(issue_token(&session(), &security), Err(AuthError::InvalidSecret)));
    }

    #[test]
    fn oversized_expiry_is_an_error() {
        let mut security = AppConfig::development().security;
        security.jwt_expiry_hours = u64::MAX;
        assert!(matches!(
            issue_token(&session(), &security),
            Err(AuthError::InvalidExpiry(u64::MAX))
        ));
    }
}
