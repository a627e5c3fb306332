//! HS512 identity tokens shared by the issuer (auth service) and the gateway.
//!
//! Wire format is a compact JWS carrying `{sub, iat, exp}` in epoch seconds.
//! Expiry is checked here against an explicit instant instead of inside
//! `jsonwebtoken`, so callers can evaluate a token "as of" a chosen time.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::claims::Claims;

/// Minimum secret length for HS512 (one full SHA-512 block).
pub const MIN_SECRET_BYTES: usize = 64;

/// Default token lifetime (24 hours).
pub const DEFAULT_TTL_SECONDS: i64 = 24 * 60 * 60;

/// Longest lifetime issuers should configure (10 years).
pub const MAX_TTL_SECONDS: i64 = 10 * 365 * 24 * 60 * 60;

pub fn default_ttl() -> Duration {
    Duration::seconds(DEFAULT_TTL_SECONDS)
}

/// The codec could not be built from the configured secret.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("secret key is {len} bytes, at least {min} bytes are required")]
    TooShort { len: usize, min: usize },
}

/// Reasons a presented token is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("invalid token signature")]
    SignatureInvalid,
    #[error("token expired")]
    Expired,
}

impl TokenError {
    /// Short label for structured log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Malformed => "malformed",
            Self::SignatureInvalid => "signature_invalid",
            Self::Expired => "expired",
        }
    }
}

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("token ttl must be positive")]
    NonPositiveTtl,
    #[error("token expiry is out of the representable time range")]
    TtlOutOfRange,
    #[error("empty subject")]
    EmptySubject,
    #[error("failed to sign token: {0}")]
    Sign(#[from] jsonwebtoken::errors::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireClaims {
    sub: String,
    iat: i64,
    exp: i64,
}

/// Stateless encoder/verifier; safe to share across requests behind an `Arc`.
///
/// Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    leeway_seconds: u64,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &Algorithm::HS512)
            .field("leeway_seconds", &self.leeway_seconds)
            .finish()
    }
}

impl TokenCodec {
    pub fn new(secret: &[u8]) -> Result<Self, KeyError> {
        if secret.len() < MIN_SECRET_BYTES {
            return Err(KeyError::TooShort {
                len: secret.len(),
                min: MIN_SECRET_BYTES,
            });
        }

        let mut validation = Validation::new(Algorithm::HS512);
        // exp is checked in `decode_at` against the caller's clock.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["sub", "iat", "exp"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            leeway_seconds: 0,
        })
    }

    /// Tolerate clock skew between issuer and verifier.
    pub fn with_leeway(mut self, leeway_seconds: u64) -> Self {
        self.leeway_seconds = leeway_seconds;
        self
    }

    pub fn leeway_seconds(&self) -> u64 {
        self.leeway_seconds
    }

    pub fn encode(&self, subject: &str, ttl: Duration) -> Result<String, EncodeError> {
        self.encode_at(subject, ttl, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    pub fn encode_at(
        &self,
        subject: &str,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<String, EncodeError> {
        if ttl <= Duration::zero() {
            return Err(EncodeError::NonPositiveTtl);
        }
        if subject.trim().is_empty() {
            return Err(EncodeError::EmptySubject);
        }

        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or(EncodeError::TtlOutOfRange)?;

        let claims = WireClaims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let mut header = Header::new(Algorithm::HS512);
        header.typ = Some("JWT".to_string());

        Ok(jsonwebtoken::encode(&header, &claims, &self.encoding_key)?)
    }

    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        self.decode_at(token, Utc::now())
    }

    /// Verify signature and structure, then check expiry against `now`.
    pub fn decode_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let data = jsonwebtoken::decode::<WireClaims>(token, &self.decoding_key, &self.validation)
            .map_err(classify)?;
        let wire = data.claims;

        if wire.sub.trim().is_empty() {
            return Err(TokenError::Malformed);
        }

        let issued_at = DateTime::from_timestamp(wire.iat, 0).ok_or(TokenError::Malformed)?;
        let expires_at = DateTime::from_timestamp(wire.exp, 0).ok_or(TokenError::Malformed)?;

        let leeway = i64::try_from(self.leeway_seconds).unwrap_or(i64::MAX);
        if now.timestamp() > wire.exp.saturating_add(leeway) {
            return Err(TokenError::Expired);
        }

        Ok(Claims {
            subject: wire.sub,
            issued_at,
            expires_at,
        })
    }
}

fn classify(err: jsonwebtoken::errors::Error) -> TokenError {
    match err.kind() {
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::SignatureInvalid,
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Malformed,
    }
}
