//! Authentication: credential verification and access tokens

pub mod jwt;
pub mod middleware;
pub mod password;

pub use jwt::{Claims, TokenError, TokenIssuer, ADMIN_SUBJECT, TOKEN_TTL_SECS};
pub use middleware::{bearer_auth_middleware, extract_token, AuthContext};
pub use password::{
    Argon2Scheme, CredentialScheme, CredentialVerifier, Pbkdf2Record, Pbkdf2Scheme,
    RecordError, StoredCredential,
};
