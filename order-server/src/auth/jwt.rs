//! JWT token service
//!
//! Issues and validates the signed bearer tokens that carry a user identity.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Refresh token lifetime
const REFRESH_TOKEN_DAYS: i64 = 7;

/// JWT configuration
///
/// Built once from [`crate::config::Config`] and handed to the service at
/// construction; there is no ambient signing state.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Signing secret (should be at least 32 bytes)
    pub secret: String,
    /// Signing algorithm (HMAC family)
    pub algorithm: Algorithm,
    /// Access token lifetime (minutes)
    pub access_token_minutes: i64,
}

/// JWT Claims stored in a token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID (subject)
    pub sub: String,
    /// Token class: "access" or "refresh"
    pub token_type: String,
    /// Expiration timestamp (seconds)
    pub exp: i64,
    /// Issued-at timestamp (seconds)
    pub iat: i64,
}

/// JWT errors
#[derive(Error, Debug)]
pub enum JwtError {
    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("token expired")]
    ExpiredToken,

    #[error("invalid signature")]
    InvalidSignature,

    #[error("token generation failed: {0}")]
    GenerationFailed(String),
}

/// JWT token service
#[derive(Debug, Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    /// Create a new JWT service from an explicit configuration
    pub fn with_config(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Issue a short-lived access token for a user
    pub fn issue_access_token(&self, user_id: i64) -> Result<String, JwtError> {
        self.issue(
            user_id,
            "access",
            Duration::minutes(self.config.access_token_minutes),
        )
    }

    /// Issue a long-lived refresh token for a user
    pub fn issue_refresh_token(&self, user_id: i64) -> Result<String, JwtError> {
        self.issue(user_id, "refresh", Duration::days(REFRESH_TOKEN_DAYS))
    }

    fn issue(&self, user_id: i64, token_type: &str, ttl: Duration) -> Result<String, JwtError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            token_type: token_type.to_string(),
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::new(self.config.algorithm), &claims, &self.encoding_key)
            .map_err(|e| JwtError::GenerationFailed(e.to_string()))
    }

    /// Validate a token and decode its claims
    ///
    /// Checks signature and expiry only. The token class is carried in the
    /// claims but not discriminated: a refresh token is accepted anywhere an
    /// access token is.
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let validation = Validation::new(self.config.algorithm);

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                _ => JwtError::InvalidToken(e.to_string()),
            })?;

        Ok(token_data.claims)
    }

    /// Extract the token from an Authorization header value
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header.strip_prefix("Bearer ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_service(access_token_minutes: i64) -> JwtService {
        JwtService::with_config(JwtConfig {
            secret: "test-secret-key-at-least-32-bytes-long!".to_string(),
            algorithm: Algorithm::HS256,
            access_token_minutes,
        })
    }

    #[test]
    fn test_issue_and_validate_access_token() {
        let service = test_service(30);

        let token = service
            .issue_access_token(42)
            .expect("Failed to generate test token");

        let claims = service
            .validate_token(&token)
            .expect("Failed to validate test token");

        assert_eq!(claims.sub, "42");
        assert_eq!(claims.token_type, "access");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_refresh_token_passes_same_validation() {
        let service = test_service(30);

        let token = service
            .issue_refresh_token(7)
            .expect("Failed to generate refresh token");

        // Refresh tokens go through the exact same validation path
        let claims = service
            .validate_token(&token)
            .expect("Failed to validate refresh token");

        assert_eq!(claims.sub, "7");
        assert_eq!(claims.token_type, "refresh");
        assert_eq!(claims.exp - claims.iat, REFRESH_TOKEN_DAYS * 24 * 60 * 60);
    }

    #[test]
    fn test_expired_token_rejected() {
        // Issued already expired, well past the default validation leeway
        let service = test_service(-5);

        let token = service
            .issue_access_token(42)
            .expect("Failed to generate test token");

        let err = service.validate_token(&token).unwrap_err();
        assert!(matches!(err, JwtError::ExpiredToken));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let service = test_service(30);
        let other = JwtService::with_config(JwtConfig {
            secret: "a-completely-different-32-byte-secret!!!".to_string(),
            algorithm: Algorithm::HS256,
            access_token_minutes: 30,
        });

        let token = service
            .issue_access_token(42)
            .expect("Failed to generate test token");

        let err = other.validate_token(&token).unwrap_err();
        assert!(matches!(err, JwtError::InvalidSignature));
    }

    #[test]
    fn test_garbage_token_rejected() {
        let service = test_service(30);
        assert!(service.validate_token("not-a-jwt").is_err());
    }

    #[test]
    fn test_extract_from_header() {
        assert_eq!(
            JwtService::extract_from_header("Bearer abc.def.ghi"),
            Some("abc.def.ghi")
        );
        assert_eq!(JwtService::extract_from_header("Basic abc"), None);
    }
}
