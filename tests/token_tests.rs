//! 访问令牌单元测试
//!
//! 测试令牌签发、签名校验与过期判定

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use fan_gate::auth::jwt::{Claims, TokenError, TokenIssuer, ADMIN_SUBJECT, TOKEN_TTL_SECS};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};

mod common;

fn issuer() -> TokenIssuer {
    TokenIssuer::new(common::TEST_JWT_SECRET.as_bytes()).unwrap()
}

fn t0() -> DateTime<Utc> {
    DateTime::from_timestamp(0, 0).unwrap()
}

#[test]
fn test_issue_then_validate_returns_subject() {
    let issuer = issuer();
    let now = Utc::now();

    let token = issuer.issue(ADMIN_SUBJECT, now).unwrap();
    assert_eq!(issuer.validate(&token, now).unwrap(), "admin");
}

#[test]
fn test_claims_carry_one_hour_expiry() {
    let token = issuer().issue(ADMIN_SUBJECT, t0()).unwrap();

    let payload = token.split('.').nth(1).unwrap();
    let claims: Claims = serde_json::from_slice(&URL_SAFE_NO_PAD.decode(payload).unwrap()).unwrap();
    assert_eq!(claims.sub, "admin");
    assert_eq!(claims.iat, 0);
    assert_eq!(claims.exp, TOKEN_TTL_SECS);
}

#[test]
fn test_token_issued_two_hours_ago_is_expired() {
    let issuer = issuer();
    let token = issuer.issue(ADMIN_SUBJECT, Utc::now() - Duration::hours(2)).unwrap();

    assert_eq!(issuer.validate(&token, Utc::now()), Err(TokenError::Expired));
}

#[test]
fn test_expiry_window() {
    let issuer = issuer();
    let token = issuer.issue(ADMIN_SUBJECT, t0()).unwrap();

    assert_eq!(issuer.validate(&token, t0() + Duration::seconds(3599)).unwrap(), "admin");
    assert_eq!(
        issuer.validate(&token, t0() + Duration::seconds(3601)),
        Err(TokenError::Expired)
    );
}

#[test]
fn test_different_key_is_invalid_signature() {
    let token = issuer().issue(ADMIN_SUBJECT, Utc::now()).unwrap();
    let other = TokenIssuer::new(b"a-completely-different-signing-key!!").unwrap();

    assert_eq!(other.validate(&token, Utc::now()), Err(TokenError::InvalidSignature));
}

#[test]
fn test_signature_checked_before_expiry() {
    let token = issuer().issue(ADMIN_SUBJECT, t0()).unwrap();
    let other = TokenIssuer::new(b"a-completely-different-signing-key!!").unwrap();

    // 既过期又签名错误时报告签名错误
    assert_eq!(other.validate(&token, Utc::now()), Err(TokenError::InvalidSignature));
}

#[test]
fn test_tampered_payload_is_invalid_signature() {
    let issuer = issuer();
    let token = issuer.issue(ADMIN_SUBJECT, Utc::now()).unwrap();
    let parts: Vec<&str> = token.split('.').collect();

    let forged = Claims {
        sub: "intruder".to_string(),
        iat: 0,
        exp: i64::MAX / 2,
    };
    let forged_payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&forged).unwrap());
    let tampered = format!("{}.{}.{}", parts[0], forged_payload, parts[2]);

    assert_eq!(issuer.validate(&tampered, Utc::now()), Err(TokenError::InvalidSignature));
}

#[test]
fn test_other_algorithm_is_rejected() {
    let claims = Claims {
        sub: ADMIN_SUBJECT.to_string(),
        iat: Utc::now().timestamp(),
        exp: Utc::now().timestamp() + 60,
    };
    let token = encode(
        &Header::new(Algorithm::HS512),
        &claims,
        &EncodingKey::from_secret(common::TEST_JWT_SECRET.as_bytes()),
    )
    .unwrap();

    assert_eq!(issuer().validate(&token, Utc::now()), Err(TokenError::InvalidSignature));
}

#[test]
fn test_unparseable_tokens_are_malformed() {
    let issuer = issuer();
    let token = issuer.issue(ADMIN_SUBJECT, Utc::now()).unwrap();
    let truncated: String = token.split('.').take(2).collect::<Vec<_>>().join(".");

    for bad in ["", "invalid_token", "a.b", truncated.as_str()] {
        assert_eq!(issuer.validate(bad, Utc::now()), Err(TokenError::Malformed), "token {:?}", bad);
    }
}

#[test]
fn test_issuer_from_config() {
    let config = common::create_test_config();
    let issuer = TokenIssuer::from_config(&config).unwrap();

    let token = issuer.issue(ADMIN_SUBJECT, Utc::now()).unwrap();
    assert!(issuer.validate(&token, Utc::now()).is_ok());
}

#[test]
fn test_empty_signing_key_is_rejected() {
    let mut config = common::create_test_config();
    config.security.jwt_secret = secrecy::Secret::new(String::new());

    assert!(TokenIssuer::from_config(&config).is_err());
}
