use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{AppError, ErrorCode};

const DEV_JWT_SECRET: &str = "development-secret-change-in-production";

/// Signing secret shared by every service, read from `HAVEN_JWT_SECRET`.
pub fn jwt_secret() -> String {
    std::env::var("HAVEN_JWT_SECRET").unwrap_or_else(|_| DEV_JWT_SECRET.to_string())
}

/// Access token claims. `sub` is the profile id of the device-scoped identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub iat: i64,
    pub exp: i64,
    pub jti: Uuid,
}

impl Claims {
    pub fn new(profile_id: Uuid, duration_secs: i64) -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: profile_id,
            iat: now,
            exp: now + duration_secs,
            jti: Uuid::now_v7(),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }
}

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub token_id: Uuid,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            token_id: claims.jti,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

pub fn issue_access_token(
    profile_id: Uuid,
    secret: &str,
    ttl_secs: i64,
) -> Result<AccessToken, AppError> {
    let claims = Claims::new(profile_id, ttl_secs);
    let access_token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::internal(format!("JWT encoding failed: {e}")))?;

    Ok(AccessToken {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: ttl_secs,
    })
}

pub fn validate_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
            AppError::new(ErrorCode::TokenExpired, "token has expired")
        }
        _ => AppError::new(ErrorCode::TokenInvalid, format!("invalid token: {e}")),
    })?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_validates_to_same_subject() {
        let profile_id = Uuid::new_v4();
        let token = issue_access_token(profile_id, "secret", 3600).unwrap();
        assert_eq!(token.token_type, "Bearer");

        let claims = validate_token(&token.access_token, "secret").unwrap();
        assert_eq!(claims.sub, profile_id);
        assert!(!claims.is_expired());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue_access_token(Uuid::new_v4(), "secret", 3600).unwrap();
        let err = validate_token(&token.access_token, "other").unwrap_err();
        assert!(err.is(ErrorCode::TokenInvalid));
    }

    #[test]
    fn expired_token_is_rejected() {
        // Past the default 60s leeway.
        let token = issue_access_token(Uuid::new_v4(), "secret", -600).unwrap();
        let err = validate_token(&token.access_token, "secret").unwrap_err();
        assert!(err.is(ErrorCode::TokenExpired));
    }
}
