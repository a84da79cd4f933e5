use chrono::Duration;
use tubely_api::auth::make_jwt;
use uuid::Uuid;

/// HS256 secret shared by the test app and the tokens below.
pub const TEST_JWT_SECRET: &str = "test-jwt-secret-at-least-32-characters-long";

/// Valid bearer token for `user_id`.
pub fn token_for(user_id: Uuid) -> String {
    make_jwt(user_id, TEST_JWT_SECRET, Duration::hours(1)).expect("Failed to sign test token")
}

/// `Authorization` header value for `user_id`.
pub fn bearer(user_id: Uuid) -> String {
    format!("Bearer {}", token_for(user_id))
}
