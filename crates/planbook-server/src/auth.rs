//! Bearer token issuing and verification.
//!
//! Tokens are HS256 JWTs signed with the configured secret. A missing header,
//! a wrong scheme, a bad signature, an expired token and a token for an
//! account that no longer exists are all reported the same way: 403 with
//! `"Invalid or expired token"`.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use planbook_core::models::User;
use planbook_core::repository::UserRepository;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

pub const INVALID_TOKEN: &str = "Invalid or expired token";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// User id
    pub sub: Uuid,
    pub username: String,
    pub iat: i64,
    pub exp: i64,
}

/// Signs and checks session tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
            ttl,
        }
    }

    pub fn issue(&self, user: &User) -> Result<String, ApiError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id,
            username: user.username.clone(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        self.sign(&claims)
    }

    fn sign(&self, claims: &Claims) -> Result<String, ApiError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding).map_err(|e| {
            tracing::error!(error = %e, "failed to sign token");
            ApiError::internal()
        })
    }

    pub fn verify(&self, token: &str) -> Result<Claims, ApiError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "rejected token");
                ApiError::forbidden(INVALID_TOKEN)
            })
    }
}

/// The authenticated caller, extracted from `Authorization: Bearer <token>`.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ApiError::forbidden(INVALID_TOKEN))?;

        let claims = state.tokens().verify(token)?;
        // A valid signature is not enough once the account is gone.
        let user = state
            .repo()
            .find_user_by_id(claims.sub)
            .await?
            .ok_or_else(|| {
                tracing::debug!(user_id = %claims.sub, "token for unknown user");
                ApiError::forbidden(INVALID_TOKEN)
            })?;

        Ok(AuthUser {
            id: user.id,
            username: user.username,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn user() -> User {
        User {
            id: Uuid::now_v7(),
            username: "ada".to_string(),
            password_hash: String::new(),
            email: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_issued_token_verifies() {
        let tokens = TokenService::new("secret", Duration::days(7));
        let user = user();
        let claims = tokens.verify(&tokens.issue(&user).unwrap()).unwrap();

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.username, "ada");
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 60 * 60);
    }

    #[test]
    fn test_token_from_other_secret_is_rejected() {
        let token = TokenService::new("one", Duration::days(7)).issue(&user()).unwrap();
        let err = TokenService::new("two", Duration::days(7)).verify(&token).unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let tokens = TokenService::new("secret", Duration::days(7));
        let now = Utc::now();
        let claims = Claims {
            sub: Uuid::now_v7(),
            username: "ada".to_string(),
            iat: (now - Duration::days(8)).timestamp(),
            exp: (now - Duration::days(1)).timestamp(),
        };
        let token = tokens.sign(&claims).unwrap();
        assert!(tokens.verify(&token).is_err());
        assert!(tokens.verify("not-a-jwt").is_err());
    }
}
