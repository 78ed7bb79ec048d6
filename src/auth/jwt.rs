//! Access token issuance and validation
//! HS256 JWTs with a fixed one-hour lifetime; stateless, no revocation

use crate::{config::AppConfig, error::AppError};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Subject of every token; the gate has a single principal
pub const ADMIN_SUBJECT: &str = "admin";

/// Token lifetime in seconds
pub const TOKEN_TTL_SECS: i64 = 3600;

/// Recommended minimum signing key length for HS256
const RECOMMENDED_KEY_LEN: usize = 32;

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject
    pub sub: String,

    /// Issued at
    pub iat: i64,

    /// Expiration
    pub exp: i64,
}

/// Why a presented token was rejected. Callers collapse all of these into a
/// single unauthenticated outcome; the kind is kept for logs.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,

    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,
}

/// Mints and checks access tokens under one signing key
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenIssuer {
    /// An empty key is a configuration error
    pub fn new(signing_key: &[u8]) -> Result<Self, AppError> {
        if signing_key.is_empty() {
            return Err(AppError::Config("JWT signing key is empty".to_string()));
        }

        if signing_key.len() < RECOMMENDED_KEY_LEN {
            tracing::warn!(
                key_len = signing_key.len(),
                "JWT signing key is shorter than {} bytes",
                RECOMMENDED_KEY_LEN
            );
        }

        // Expiry is checked against the caller's clock in `validate`, not the library's
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(signing_key),
            decoding_key: DecodingKey::from_secret(signing_key),
            validation,
        })
    }

    /// Create the issuer from config
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        Self::new(config.security.jwt_secret.expose_secret().as_bytes())
    }

    /// Issue a token for `subject` expiring one hour after `now`
    pub fn issue(&self, subject: &str, now: DateTime<Utc>) -> Result<String, AppError> {
        let expiration = now + Duration::seconds(TOKEN_TTL_SECS);

        let claims = Claims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode access token: {:?}", e);
            AppError::Internal(format!("Failed to encode access token: {}", e))
        })
    }

    /// Check signature, then expiry. Returns the subject.
    pub fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                let kind = classify(e.kind());
                tracing::debug!(error = ?e, kind = %kind, "Token validation failed");
                kind
            })?
            .claims;

        if now.timestamp() >= claims.exp {
            tracing::debug!(exp = claims.exp, now = now.timestamp(), "Token expired");
            return Err(TokenError::Expired);
        }

        Ok(claims.sub)
    }
}

fn classify(kind: &ErrorKind) -> TokenError {
    match kind {
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::InvalidSignature,
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Malformed,
    }
}
