use super::jwt::{extract_bearer_token, validate_jwt, AuthError};
use crate::error::HttpAppError;
use crate::state::AppState;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tubely_core::AppError;
use uuid::Uuid;

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    pub iss: String,
    pub sub: String, // user_id
    pub iat: i64,
    pub exp: i64,
}

/// Principal resolved from the bearer token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
}

impl From<AuthError> for HttpAppError {
    fn from(err: AuthError) -> Self {
        HttpAppError(AppError::Unauthorized(err.to_string()))
    }
}

// Extracted from request parts so it can precede Multipart in handler arguments
impl FromRequestParts<Arc<AppState>> for AuthenticatedUser {
    type Rejection = HttpAppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers)?;
        let user_id = validate_jwt(token, state.jwt_secret())?;
        Ok(AuthenticatedUser { user_id })
    }
}
