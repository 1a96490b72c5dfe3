//! Bearer token authentication.
//!
//! Tokens are HS256 JWTs whose `sub` is the numeric user id and whose `role`
//! carries the staff role used by check-in capability checks. They are issued
//! by the account service that owns logins; this service only verifies them.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::state::AppState;
use crate::utils::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Customer,
    Supervisor,
    Manager,
    Admin,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: Role,
    pub exp: usize,
}

/// Identity of the caller, taken from a verified bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub id: i32,
    pub role: Role,
}

#[derive(Clone)]
pub struct JwtKeys {
    decoding: DecodingKey,
}

impl JwtKeys {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            decoding: DecodingKey::from_secret(secret),
        }
    }

    pub fn verify(&self, token: &str) -> Result<AuthUser, AppError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
            .map_err(|e| AppError::AuthError(format!("Invalid token: {e}")))?;

        let id = data
            .claims
            .sub
            .parse()
            .map_err(|_| AppError::AuthError("Invalid token subject".to_string()))?;

        Ok(AuthUser {
            id,
            role: data.claims.role,
        })
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::AuthError("Missing authorization header".to_string()))?;

        let token = header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                AppError::AuthError("Expected 'Bearer <token>' authorization".to_string())
            })?;

        state.jwt.verify(token)
    }
}

/// Signs a token the way the account service does.
#[cfg(test)]
pub(crate) fn sign_token(secret: &[u8], user: AuthUser, ttl: chrono::Duration) -> String {
    use jsonwebtoken::{encode, EncodingKey, Header};

    let claims = Claims {
        sub: user.id.to_string(),
        role: user.role,
        exp: (chrono::Utc::now() + ttl).timestamp().max(0) as usize,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret),
    )
    .unwrap()
}
