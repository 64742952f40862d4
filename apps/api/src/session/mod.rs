//! Session Token Service - issues and verifies the short-lived signed tokens
//! gating the chat endpoint.
//!
//! Tokens are stateless HS256 JWTs with a fixed 24-hour expiry. Nothing is
//! stored server-side; verification is signature + expiry only.

pub mod handlers;
pub mod verification;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

const SESSION_TTL_HOURS: i64 = 24;

/// Issuance flags carried inside the token.
///
/// `bypass` marks tokens minted while gating is administratively disabled;
/// `dev` marks tokens minted in non-production without a verification
/// provider configured. The two paths are mutually exclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenFlags {
    pub bypass: bool,
    pub dev: bool,
}

impl TokenFlags {
    pub fn bypass() -> Self {
        Self {
            bypass: true,
            dev: false,
        }
    }

    pub fn dev() -> Self {
        Self {
            bypass: false,
            dev: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Caller identity the token is bound to.
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
    #[serde(default)]
    pub bypass: bool,
    #[serde(default)]
    pub dev: bool,
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("session token expired")]
    Expired,
    #[error("invalid session token")]
    Invalid,
    #[error("failed to sign session token")]
    Signing,
}

/// Issues and verifies session tokens with a server-held secret.
#[derive(Clone)]
pub struct SessionService {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SessionService {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Issues a token for `identity` expiring 24 hours from now.
    pub fn issue(&self, identity: &str, flags: TokenFlags) -> Result<IssuedToken, SessionError> {
        self.issue_at(identity, flags, Utc::now())
    }

    fn issue_at(
        &self,
        identity: &str,
        flags: TokenFlags,
        issued_at: DateTime<Utc>,
    ) -> Result<IssuedToken, SessionError> {
        let expires_at = issued_at + Duration::hours(SESSION_TTL_HOURS);
        let claims = SessionClaims {
            sub: identity.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
            bypass: flags.bypass,
            dev: flags.dev,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|_| SessionError::Signing)?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Verifies signature and expiry, returning the embedded claims.
    /// Expired, malformed, and badly-signed tokens are all rejected; the
    /// caller distinguishes these from "no token supplied".
    pub fn verify(&self, token: &str) -> Result<SessionClaims, SessionError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        decode::<SessionClaims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => SessionError::Expired,
                _ => SessionError::Invalid,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> SessionService {
        SessionService::new("test-secret")
    }

    #[test]
    fn test_issue_and_verify_round_trip() {
        let issued = service()
            .issue("203.0.113.7", TokenFlags::default())
            .unwrap();
        let claims = service().verify(&issued.token).unwrap();
        assert_eq!(claims.sub, "203.0.113.7");
        assert!(!claims.bypass);
        assert!(!claims.dev);
    }

    #[test]
    fn test_flags_survive_round_trip() {
        let svc = service();

        let bypass = svc.issue("id", TokenFlags::bypass()).unwrap();
        assert!(svc.verify(&bypass.token).unwrap().bypass);

        let dev = svc.issue("id", TokenFlags::dev()).unwrap();
        assert!(svc.verify(&dev.token).unwrap().dev);
    }

    #[test]
    fn test_token_valid_just_before_expiry() {
        let svc = service();
        let issued_at = Utc::now() - Duration::hours(23) - Duration::minutes(59);
        let issued = svc
            .issue_at("id", TokenFlags::default(), issued_at)
            .unwrap();
        assert!(svc.verify(&issued.token).is_ok());
    }

    #[test]
    fn test_token_invalid_just_after_expiry() {
        let svc = service();
        let issued_at = Utc::now() - Duration::hours(24) - Duration::minutes(1);
        let issued = svc
            .issue_at("id", TokenFlags::default(), issued_at)
            .unwrap();
        assert_eq!(svc.verify(&issued.token), Err(SessionError::Expired));
    }

    #[test]
    fn test_token_signed_with_other_secret_is_invalid() {
        let issued = SessionService::new("other-secret")
            .issue("id", TokenFlags::default())
            .unwrap();
        assert_eq!(
            service().verify(&issued.token),
            Err(SessionError::Invalid)
        );
    }

    #[test]
    fn test_malformed_token_is_invalid() {
        assert_eq!(
            service().verify("not-a-jwt"),
            Err(SessionError::Invalid)
        );
    }

    #[test]
    fn test_expiry_is_24_hours_from_issuance() {
        let svc = service();
        let issued_at = Utc::now();
        let issued = svc.issue_at("id", TokenFlags::default(), issued_at).unwrap();
        assert_eq!(
            (issued.expires_at - issued_at).num_hours(),
            SESSION_TTL_HOURS
        );
    }
}
