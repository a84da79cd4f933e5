//! Bearer-token authentication

pub mod jwt;
pub mod models;

pub use jwt::{extract_bearer_token, make_jwt, validate_jwt, AuthError};
pub use models::{AuthenticatedUser, JwtClaims};
