//! # 会话令牌测试
//!
//! 签发、校验、过期与密钥隔离

use chrono::{Duration, Utc};
use exercise_api::auth::TokenService;
use exercise_api::testing::{TEST_JWT_SECRET, init_test_env};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn service(secret: &str) -> TokenService {
    TokenService::new(secret, Duration::hours(24)).unwrap()
}

#[test]
fn test_issue_then_verify_returns_same_account() {
    init_test_env();
    let tokens = service(TEST_JWT_SECRET);

    for account_id in [1, 42, i32::MAX] {
        let token = tokens.issue(account_id).unwrap();
        assert_eq!(tokens.verify(&token).unwrap(), account_id);
    }
}

#[test]
fn test_token_has_three_segments() {
    let token = service(TEST_JWT_SECRET).issue(7).unwrap();
    assert_eq!(token.split('.').count(), 3);
}

#[test]
fn test_expired_token_is_rejected() {
    let tokens = service(TEST_JWT_SECRET);
    let token = tokens
        .issue_expiring_at(7, Utc::now() - Duration::seconds(1))
        .unwrap();

    let err = tokens.verify(&token).unwrap_err();
    assert_eq!(err.status_code(), axum::http::StatusCode::UNAUTHORIZED);
}

#[test]
fn test_token_from_other_secret_is_rejected() {
    let issuer = service("secret-one");
    let verifier = service("secret-two");

    let token = issuer.issue(7).unwrap();
    assert!(verifier.verify(&token).is_err());
    assert_eq!(issuer.verify(&token).unwrap(), 7);
}

#[test]
fn test_tampered_signature_is_rejected() {
    let tokens = service(TEST_JWT_SECRET);
    let token = tokens.issue(7).unwrap();
    let (head, signature) = token.rsplit_once('.').unwrap();
    let flipped = if signature.starts_with('A') { "B" } else { "A" };
    let tampered = format!("{head}.{flipped}{}", &signature[1..]);

    assert!(tokens.verify(&tampered).is_err());
}

#[rstest]
#[case("")]
#[case("not-a-token")]
#[case("a.b")]
#[case("a.b.c")]
fn test_malformed_tokens_are_rejected(#[case] token: &str) {
    assert!(service(TEST_JWT_SECRET).verify(token).is_err());
}

#[test]
fn test_token_lifetime_is_one_day_by_default() {
    let config = exercise_api::testing::test_config();
    let tokens = TokenService::from_config(&config.auth).unwrap();
    assert_eq!(tokens.ttl(), Duration::hours(24));
}
