//! Administrator credential verification
//!
//! The stored credential is a single record supplied through configuration.
//! The canonical format is PBKDF2-HMAC-SHA256:
//!
//! ```text
//! base64(salt):iterations:base64(derived_key)
//! ```
//!
//! Parameters travel with the record, so raising the default iteration count
//! never invalidates hashes that were generated earlier.

use std::fmt;
use std::str::FromStr;

use argon2::Argon2;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString};
use rand::{rngs::OsRng, RngCore};
use secrecy::{ExposeSecret, Secret};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

use crate::{config::AppConfig, error::AppError};

/// Iteration count used when generating new PBKDF2 records
pub const DEFAULT_ITERATIONS: u32 = 600_000;

/// Lowest iteration count accepted when generating a record
pub const MIN_ITERATIONS: u32 = 100_000;

const SALT_LEN: usize = 16;
const KEY_LEN: usize = 32;

/// Shortest stored key accepted; a truncated key would match random guesses
const MIN_KEY_LEN: usize = 16;

/// The configured administrator password record
#[derive(Debug, Clone)]
pub struct StoredCredential(Secret<String>);

impl StoredCredential {
    pub fn new(record: impl Into<String>) -> Self {
        Self(Secret::new(record.into()))
    }

    fn record(&self) -> &str {
        self.0.expose_secret()
    }
}

impl From<Secret<String>> for StoredCredential {
    fn from(secret: Secret<String>) -> Self {
        Self(secret)
    }
}

/// Why a stored record could not be used. Only surfaced in startup diagnostics;
/// `verify` collapses all of these to `false`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("expected 3 colon-separated fields, found {0}")]
    FieldCount(usize),

    #[error("salt is not valid base64")]
    Salt,

    #[error("iteration count must be a positive integer")]
    Iterations,

    #[error("derived key is not valid base64 of at least 16 bytes")]
    Key,

    #[error("invalid PHC string: {0}")]
    Phc(String),
}

/// Parsed PBKDF2 record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pbkdf2Record {
    pub salt: Vec<u8>,
    pub iterations: u32,
    pub key: Vec<u8>,
}

impl FromStr for Pbkdf2Record {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split(':').collect();
        if parts.len() != 3 {
            return Err(RecordError::FieldCount(parts.len()));
        }

        let salt = STANDARD.decode(parts[0]).map_err(|_| RecordError::Salt)?;

        let iterations = parts[1]
            .parse::<u32>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or(RecordError::Iterations)?;

        let key = STANDARD
            .decode(parts[2])
            .ok()
            .filter(|k| k.len() >= MIN_KEY_LEN)
            .ok_or(RecordError::Key)?;

        Ok(Self {
            salt,
            iterations,
            key,
        })
    }
}

impl fmt::Display for Pbkdf2Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            STANDARD.encode(&self.salt),
            self.iterations,
            STANDARD.encode(&self.key)
        )
    }
}

/// A password hashing scheme the verifier can delegate to
pub trait CredentialScheme: Send + Sync {
    /// Scheme identifier as used in configuration
    fn name(&self) -> &'static str;

    /// Check a candidate against a stored record. Never panics; any problem
    /// with either input is a non-match.
    fn verify(&self, candidate: &str, record: &str) -> bool;

    /// Check that a record is usable by this scheme
    fn check_record(&self, record: &str) -> Result<(), RecordError>;
}

/// PBKDF2-HMAC-SHA256 with the iteration count embedded in the record
#[derive(Debug, Default, Clone, Copy)]
pub struct Pbkdf2Scheme;

impl Pbkdf2Scheme {
    /// Generate a record for `password` with a fresh random salt
    pub fn hash(password: &str, iterations: u32) -> Result<String, AppError> {
        if iterations < MIN_ITERATIONS {
            return Err(AppError::BadRequest(format!(
                "Iteration count must be at least {}",
                MIN_ITERATIONS
            )));
        }

        let mut salt = vec![0u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt);

        let mut key = vec![0u8; KEY_LEN];
        pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, iterations, &mut key);

        Ok(Pbkdf2Record {
            salt,
            iterations,
            key,
        }
        .to_string())
    }
}

impl CredentialScheme for Pbkdf2Scheme {
    fn name(&self) -> &'static str {
        "pbkdf2"
    }

    fn verify(&self, candidate: &str, record: &str) -> bool {
        let Ok(parsed) = record.parse::<Pbkdf2Record>() else {
            return false;
        };

        // Derive to the stored key's length so records made with another dkLen still verify
        let mut derived = vec![0u8; parsed.key.len()];
        pbkdf2::pbkdf2_hmac::<Sha256>(
            candidate.as_bytes(),
            &parsed.salt,
            parsed.iterations,
            &mut derived,
        );

        derived.ct_eq(&parsed.key).into()
    }

    fn check_record(&self, record: &str) -> Result<(), RecordError> {
        record.parse::<Pbkdf2Record>().map(|_| ())
    }
}

/// Argon2 PHC strings (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`)
pub struct Argon2Scheme {
    argon2: Argon2<'static>,
}

impl Argon2Scheme {
    pub fn new() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }

    /// Generate a PHC string for `password` with the crate's default parameters
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| {
                tracing::error!("Failed to hash password: {:?}", e);
                AppError::Internal(format!("Failed to hash password: {}", e))
            })
    }
}

impl Default for Argon2Scheme {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialScheme for Argon2Scheme {
    fn name(&self) -> &'static str {
        "argon2"
    }

    fn verify(&self, candidate: &str, record: &str) -> bool {
        match PasswordHash::new(record.trim()) {
            Ok(parsed) => self
                .argon2
                .verify_password(candidate.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }

    fn check_record(&self, record: &str) -> Result<(), RecordError> {
        PasswordHash::new(record.trim())
            .map(|_| ())
            .map_err(|e| RecordError::Phc(e.to_string()))
    }
}

/// Look up a scheme by its configuration name
pub fn scheme_by_name(name: &str) -> Result<Box<dyn CredentialScheme>, AppError> {
    match name.to_lowercase().as_str() {
        "pbkdf2" => Ok(Box::new(Pbkdf2Scheme)),
        "argon2" => Ok(Box::new(Argon2Scheme::new())),
        other => Err(AppError::Config(format!("Unknown password scheme: {}", other))),
    }
}

/// Checks submitted secrets against the stored administrator credential
pub struct CredentialVerifier {
    stored: StoredCredential,
    scheme: Box<dyn CredentialScheme>,
}

impl CredentialVerifier {
    pub fn new(stored: StoredCredential, scheme: Box<dyn CredentialScheme>) -> Self {
        Self { stored, scheme }
    }

    /// Build the verifier from config. An unusable record is logged but not
    /// fatal: every login will simply be rejected.
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let scheme = scheme_by_name(&config.security.password_scheme)?;
        let stored = StoredCredential::from(config.security.admin_password_hash.clone());

        if let Err(e) = scheme.check_record(stored.record()) {
            tracing::warn!(
                scheme = scheme.name(),
                error = %e,
                "Stored admin password hash is unusable; all logins will be rejected"
            );
        }

        Ok(Self::new(stored, scheme))
    }

    /// `None` (password absent from the request) is a non-match
    pub fn verify(&self, candidate: Option<&str>) -> bool {
        match candidate {
            Some(candidate) => self.scheme.verify(candidate, self.stored.record()),
            None => false,
        }
    }

    pub fn scheme_name(&self) -> &'static str {
        self.scheme.name()
    }
}

/// Verify `candidate` against a PBKDF2 record
pub fn verify(candidate: Option<&str>, stored: &StoredCredential) -> bool {
    match candidate {
        Some(candidate) => Pbkdf2Scheme.verify(candidate, stored.record()),
        None => false,
    }
}
