// Tests for access tokens and confirmation codes.
// Run with: cargo test --test auth_test

use chrono::{Duration, Utc};
use reviewhub::auth::{
    create_token, issue_confirmation_code, verify_confirmation_code, verify_token, Claims,
};
use reviewhub::entities::user::Role;

#[test]
fn test_token_round_trip() {
    let claims = Claims::new(42, "bob123".to_string(), Role::Moderator, 1);
    let token = create_token(&claims, "secret").expect("Token should be created");

    let decoded = verify_token(&token, "secret").expect("Token should verify");
    assert_eq!(decoded.user_id(), Some(42));
    assert_eq!(decoded.username, "bob123");
    assert_eq!(decoded.role, Role::Moderator);

    assert!(verify_token(&token, "other-secret").is_err());
}

#[test]
fn test_expired_token_rejected() {
    let mut claims = Claims::new(1, "old".to_string(), Role::User, 1);
    claims.exp = (Utc::now() - Duration::hours(2)).timestamp();
    let token = create_token(&claims, "secret").expect("Token should be created");
    assert!(verify_token(&token, "secret").is_err());
}

#[test]
fn test_confirmation_code_checks() {
    let issued = issue_confirmation_code(4).expect("Code should be issued");
    assert_eq!(issued.code.len(), 32);
    assert_ne!(issued.code, issued.hash, "Only the hash is stored");

    assert!(verify_confirmation_code(
        &issued.code,
        Some(&issued.hash),
        Some(issued.issued_at),
        72
    ));
    assert!(!verify_confirmation_code(
        "wrong",
        Some(&issued.hash),
        Some(issued.issued_at),
        72
    ));
    // No outstanding code.
    assert!(!verify_confirmation_code(&issued.code, None, None, 72));
    // Expired.
    let issued_long_ago = issued.issued_at - Duration::hours(73);
    assert!(!verify_confirmation_code(
        &issued.code,
        Some(&issued.hash),
        Some(issued_long_ago),
        72
    ));
}

#[test]
fn test_codes_are_unique() {
    let first = issue_confirmation_code(4).expect("Code should be issued");
    let second = issue_confirmation_code(4).expect("Code should be issued");
    assert_ne!(first.code, second.code);
}
