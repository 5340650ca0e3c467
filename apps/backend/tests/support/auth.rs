//! JWT token generation helpers for tests

use std::time::{Duration, SystemTime};

use backend::auth::jwt::mint_access_token;
use backend::state::security_config::SecurityConfig;

/// Mint a token for the given sub, email and role.
pub fn mint_test_token(sub: &str, email: &str, role: &str, sec: &SecurityConfig) -> String {
    mint_access_token(sub, email, role, SystemTime::now(), sec)
        .expect("should mint token successfully")
}

/// Full Authorization header value including the "Bearer " prefix.
pub fn bearer_header(sub: &str, email: &str, role: &str, sec: &SecurityConfig) -> String {
    format!("Bearer {}", mint_test_token(sub, email, role, sec))
}

/// Mint a token whose 7-day validity window has already passed.
pub fn mint_expired_token(sub: &str, email: &str, role: &str, sec: &SecurityConfig) -> String {
    let past_time = SystemTime::now()
        .checked_sub(Duration::from_secs(8 * 24 * 60 * 60))
        .expect("epoch underflow");
    mint_access_token(sub, email, role, past_time, sec)
        .expect("should mint expired token successfully")
}
