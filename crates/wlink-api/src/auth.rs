//! Bearer token authentication.
//!
//! The API issues its own HS256 tokens at register/login/social-auth
//! and verifies them on every authenticated route through the
//! [`AuthUser`] extractor.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use wlink_models::{User, UserId};

use crate::error::ApiError;
use crate::state::AppState;

/// Token issuer.
const ISSUER: &str = "worklink";

/// Bearer token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: String,
    pub email: String,
    /// Profile type, when the account has picked a role
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_type: Option<String>,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

/// HS256 signing/verification keys.
pub struct AuthKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    token_ttl: Duration,
}

impl AuthKeys {
    /// Create keys from `JWT_SECRET`. The secret is required; startup
    /// aborts without it.
    pub fn from_env() -> Result<Self, ApiError> {
        let secret = std::env::var("JWT_SECRET")
            .map_err(|_| ApiError::internal("JWT_SECRET not set"))?;
        if secret.len() < 32 {
            return Err(ApiError::internal("JWT_SECRET must be at least 32 bytes"));
        }

        let ttl_secs: i64 = std::env::var("JWT_TTL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(86400);

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            token_ttl: Duration::seconds(ttl_secs),
        })
    }

    #[cfg(test)]
    pub fn for_tests(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            token_ttl: Duration::seconds(3600),
        }
    }

    /// Issue a signed bearer token for an account.
    pub fn issue_token(&self, user: &User) -> Result<String, ApiError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.as_str().to_string(),
            email: user.email.clone(),
            profile_type: user
                .profile
                .as_ref()
                .map(|p| p.profile_type.as_str().to_string()),
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + self.token_ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| ApiError::internal(format!("Failed to sign token: {}", e)))
    }

    /// Verify a bearer token and return its claims.
    pub fn verify_token(&self, token: &str) -> Result<Claims, ApiError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);

        let token_data = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|e| ApiError::unauthorized(format!("Token validation failed: {}", e)))?;
        Ok(token_data.claims)
    }
}

/// Authenticated user extracted from the Authorization header.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: UserId,
    pub email: String,
    pub profile_type: Option<String>,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: UserId::from_string(claims.sub),
            email: claims.email,
            profile_type: claims.profile_type,
        }
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Missing Authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::unauthorized("Invalid Authorization header format"))?;

        let claims = state.auth.verify_token(token)?;
        Ok(AuthUser::from(claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user() -> User {
        User::new("dev@example.com", "Dev")
    }

    #[test]
    fn test_issue_and_verify_round_trip() {
        let keys = AuthKeys::for_tests("a-very-long-test-secret-at-least-32b");
        let user = test_user();
        let token = keys.issue_token(&user).unwrap();
        let claims = keys.verify_token(&token).unwrap();
        assert_eq!(claims.sub, user.id.as_str());
        assert_eq!(claims.email, "dev@example.com");
        assert_eq!(claims.iss, ISSUER);
    }

    #[test]
    fn test_wrong_key_rejected() {
        let keys = AuthKeys::for_tests("a-very-long-test-secret-at-least-32b");
        let other = AuthKeys::for_tests("a-different-test-secret-at-least-32b");
        let token = keys.issue_token(&test_user()).unwrap();
        assert!(other.verify_token(&token).is_err());
    }

    #[test]
    fn test_garbage_token_rejected() {
        let keys = AuthKeys::for_tests("a-very-long-test-secret-at-least-32b");
        assert!(keys.verify_token("not-a-token").is_err());
    }
}
