use std::env;
use std::time::Duration;

use jsonwebtoken::Algorithm;

use crate::auth::role::Role;
use crate::error::AppError;

/// Fixed validity window for issued tokens: 7 days.
pub const TOKEN_VALIDITY: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Configuration for JWT security settings.
///
/// Loaded once at startup and never mutated; shared read-only across
/// concurrent requests via `AppState`.
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    /// Symmetric secret for signing and verifying tokens
    pub jwt_secret: Vec<u8>,
    /// JWT algorithm to use (defaults to HS256)
    pub algorithm: Algorithm,
    /// Validity window applied at issuance
    pub token_ttl: Duration,
    /// Role assigned when registration does not request one
    pub default_role: Role,
}

impl SecurityConfig {
    pub fn new(jwt_secret: impl Into<Vec<u8>>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            algorithm: Algorithm::HS256,
            token_ttl: TOKEN_VALIDITY,
            default_role: Role::User,
        }
    }

    pub fn with_token_ttl(mut self, token_ttl: Duration) -> Self {
        self.token_ttl = token_ttl;
        self
    }

    /// Build from the environment. The signing secret is required and
    /// has no default: a missing secret is a startup error, never a
    /// per-request one.
    pub fn from_env() -> Result<Self, AppError> {
        let secret = env::var("BACKEND_JWT_SECRET").map_err(|_| {
            AppError::config("Required environment variable 'BACKEND_JWT_SECRET' is not set".into())
        })?;
        Ok(Self::new(secret.into_bytes()))
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self::new(b"default_secret_for_tests_only".to_vec())
    }
}
