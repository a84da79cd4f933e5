//! HS256 bearer tokens: header extraction, validation and issuance.

use super::models::JwtClaims;
use crate::constants::JWT_ISSUER;
use axum::http::{header::AUTHORIZATION, HeaderMap};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Couldn't find JWT")]
    MissingToken,

    #[error("Couldn't validate JWT: {0}")]
    InvalidToken(String),
}

/// Pull the token out of an `Authorization: Bearer <token>` header.
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthError::MissingToken)?;

    let token = value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .ok_or(AuthError::MissingToken)?;

    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }
    Ok(token)
}

/// Validate an HS256 token and return the owning principal from `sub`.
pub fn validate_jwt(token: &str, secret: &str) -> Result<Uuid, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.leeway = 0;
    validation.set_issuer(&[JWT_ISSUER]);
    validation.set_required_spec_claims(&["exp", "iss", "sub"]);

    let token_data = decode::<JwtClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| {
        tracing::debug!(error = %e, "JWT validation failed");
        match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                AuthError::InvalidToken("token has expired".to_string())
            }
            jsonwebtoken::errors::ErrorKind::InvalidIssuer => {
                AuthError::InvalidToken("invalid issuer".to_string())
            }
            _ => AuthError::InvalidToken(e.to_string()),
        }
    })?;

    Uuid::parse_str(&token_data.claims.sub)
        .map_err(|_| AuthError::InvalidToken("subject is not a user id".to_string()))
}

/// Issue an HS256 access token for `user_id` valid for `expires_in`.
pub fn make_jwt(
    user_id: Uuid,
    secret: &str,
    expires_in: Duration,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = JwtClaims {
        iss: JWT_ISSUER.to_string(),
        sub: user_id.to_string(),
        iat: now.timestamp(),
        exp: (now + expires_in).timestamp(),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}
