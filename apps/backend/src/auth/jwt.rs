use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{AppError, AuthReason};
use crate::state::security_config::SecurityConfig;

/// Claims embedded in our backend-issued access tokens.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// User id rendered as a string
    pub sub: String,
    pub email: String,
    /// Role snapshot at issuance; not refreshed on later role changes
    pub role: String,
    /// Issued-at (seconds since epoch)
    pub iat: i64,
    /// Expiry (seconds since epoch)
    pub exp: i64,
}

/// Why a token failed verification. Callers treat all variants as
/// unauthenticated; the distinction exists for logging and tests.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum VerifyError {
    #[error("token is not a well-formed JWT")]
    Malformed,
    #[error("token signature does not match")]
    SignatureInvalid,
    #[error("token has expired")]
    Expired,
}

impl From<VerifyError> for AppError {
    fn from(e: VerifyError) -> Self {
        let reason = match e {
            VerifyError::Malformed => AuthReason::MalformedToken,
            VerifyError::SignatureInvalid => AuthReason::InvalidSignature,
            VerifyError::Expired => AuthReason::Expired,
        };
        AppError::unauthorized(reason)
    }
}

/// Mint an HS256 access token for the given identity.
///
/// The validity window comes from `SecurityConfig::token_ttl`
/// (7 days by default).
pub fn mint_access_token(
    sub: &str,
    email: &str,
    role: &str,
    now: SystemTime,
    security: &SecurityConfig,
) -> Result<String, AppError> {
    let iat = now
        .duration_since(UNIX_EPOCH)
        .map_err(|_| AppError::internal("Failed to get current time".to_string()))?
        .as_secs() as i64;

    let exp = iat + security.token_ttl.as_secs() as i64;

    let claims = Claims {
        sub: sub.to_string(),
        email: email.to_string(),
        role: role.to_string(),
        iat,
        exp,
    };

    encode(
        &Header::new(security.algorithm),
        &claims,
        &EncodingKey::from_secret(&security.jwt_secret),
    )
    .map_err(|e| AppError::internal(format!("Failed to encode JWT: {e}")))
}

/// Verify signature and expiry, returning the embedded claims.
pub fn verify_access_token(token: &str, security: &SecurityConfig) -> Result<Claims, VerifyError> {
    // Default Validation already checks exp; pin the algorithm to the
    // configured one.
    let validation = Validation::new(security.algorithm);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(&security.jwt_secret),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => VerifyError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidSignature => VerifyError::SignatureInvalid,
        _ => VerifyError::Malformed,
    })
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    use super::{mint_access_token, verify_access_token, VerifyError};
    use crate::state::security_config::SecurityConfig;

    fn test_security() -> SecurityConfig {
        SecurityConfig::new("test_secret_key_for_testing_purposes_only".as_bytes())
    }

    #[test]
    fn test_mint_and_verify_roundtrip() {
        let security = test_security();

        let sub = "42";
        let email = "test@example.com";
        let now = SystemTime::now();

        let token = mint_access_token(sub, email, "user", now, &security).unwrap();
        let claims = verify_access_token(&token, &security).unwrap();

        assert_eq!(claims.sub, sub);
        assert_eq!(claims.email, email);
        assert_eq!(claims.role, "user");
        assert_eq!(
            claims.iat,
            now.duration_since(UNIX_EPOCH).unwrap().as_secs() as i64
        );
        assert_eq!(claims.exp, claims.iat + 7 * 24 * 60 * 60);
    }

    #[test]
    fn test_expired_token() {
        let security = test_security();

        // Minted 8 days ago, so the 7-day window has passed
        let now = SystemTime::now() - Duration::from_secs(8 * 24 * 60 * 60);

        let token = mint_access_token("42", "test@example.com", "user", now, &security).unwrap();
        let result = verify_access_token(&token, &security);

        assert_eq!(result, Err(VerifyError::Expired));
    }

    #[test]
    fn test_bad_signature() {
        // Mint with secret A, verify with secret B
        let security_a = SecurityConfig::new("secret-A".as_bytes());
        let token =
            mint_access_token("42", "test@example.com", "user", SystemTime::now(), &security_a)
                .unwrap();

        let security_b = SecurityConfig::new("secret-B".as_bytes());
        let result = verify_access_token(&token, &security_b);

        assert_eq!(result, Err(VerifyError::SignatureInvalid));
    }

    #[test]
    fn test_tampered_signature() {
        let security = test_security();
        let token =
            mint_access_token("42", "test@example.com", "user", SystemTime::now(), &security)
                .unwrap();

        // Flip the last signature character within the base64url alphabet
        let mut tampered = token.clone();
        let last = tampered.pop().unwrap();
        tampered.push(if last == 'A' { 'B' } else { 'A' });
        assert_ne!(token, tampered);

        let result = verify_access_token(&tampered, &security);
        assert_eq!(result, Err(VerifyError::SignatureInvalid));
    }

    #[test]
    fn test_malformed_token() {
        let security = test_security();

        assert_eq!(
            verify_access_token("not-a-jwt", &security),
            Err(VerifyError::Malformed)
        );
        assert_eq!(
            verify_access_token("", &security),
            Err(VerifyError::Malformed)
        );
    }

    #[test]
    fn test_custom_ttl() {
        let security = test_security().with_token_ttl(Duration::from_secs(60));
        let now = SystemTime::now();

        let token = mint_access_token("42", "a@b.com", "admin", now, &security).unwrap();
        let claims = verify_access_token(&token, &security).unwrap();

        assert_eq!(claims.exp, claims.iat + 60);
        assert_eq!(claims.role, "admin");
    }
}
