// Tests for payload validation.
// Run with: cargo test --test validators_test

use chrono::{Datelike, Utc};
use reviewhub::error::FieldErrors;
use reviewhub::models::{CommentRequest, ReviewRequest, SignupRequest, TitleRequest, UserRequest};
use reviewhub::validators::*;
use validator::Validate;

fn errors_of(payload: &impl Validate) -> FieldErrors {
    let mut errors = FieldErrors::new();
    errors.merge(payload.validate());
    errors
}

fn signup(username: &str, email: &str) -> SignupRequest {
    SignupRequest {
        username: Some(username.to_string()),
        email: Some(email.to_string()),
    }
}

#[test]
fn test_username_rules() {
    assert!(validate_username("bob123").is_ok());
    assert!(validate_username("j.doe+films@home-1_x").is_ok());

    assert!(validate_username("me").is_err());
    assert!(validate_username("Me").is_err());
    assert!(validate_username("with space").is_err());
    assert!(validate_username("semi;colon").is_err());

    assert!(errors_of(&signup("abc", "a@x.com")).is_empty());
    assert!(errors_of(&signup(&"a".repeat(150), "a@x.com")).is_empty());
    assert!(errors_of(&signup("ab", "a@x.com")).get("username").is_some());
    assert!(errors_of(&signup(&"a".repeat(151), "a@x.com"))
        .get("username")
        .is_some());
}

#[test]
fn test_email_rules() {
    assert!(errors_of(&signup("bob", "b@x.com")).is_empty());
    assert!(errors_of(&signup("bob", "first.last@sub.example.org")).is_empty());

    for email in ["no-at-sign", "@example.com", "user@exa mple.com", "user@example..com"] {
        let errors = errors_of(&signup("bob", email));
        assert_eq!(
            errors.get("email"),
            Some(&["Enter a valid email address.".to_string()][..]),
            "{}",
            email
        );
    }

    let long = format!("{}@example.com", "a".repeat(250));
    assert!(errors_of(&signup("bob", &long))
        .get("email")
        .is_some_and(|m| m.contains(&"Ensure this field has no more than 254 characters.".to_string())));
}

#[test]
fn test_year_rules() {
    assert!(validate_year_against(2000, 2024).is_ok());
    assert!(validate_year_against(2024, 2024).is_ok());
    assert!(validate_year_against(0, 2024).is_ok());
    assert!(validate_year_against(2025, 2024).is_err());
    assert!(validate_year_against(-1, 2024).is_err());

    let current = Utc::now().year();
    assert!(validate_year(&current).is_ok());
    assert!(validate_year(&(current + 1)).is_err());

    let future = TitleRequest {
        name: Some("Later".to_string()),
        year: Some(current + 1),
        ..Default::default()
    };
    assert_eq!(
        errors_of(&future).get("year"),
        Some(&[format!("Year cannot be later than {}.", current)][..])
    );
}

#[test]
fn test_slug_rules() {
    assert!(validate_slug("sci-fi_2").is_ok());
    assert!(validate_slug("with space").is_err());
    assert!(validate_slug("ünïcode").is_err());
}

#[test]
fn test_score_and_text_rules() {
    for score in 1..=10 {
        let review = ReviewRequest {
            text: Some("Fine".to_string()),
            score: Some(score),
        };
        assert!(errors_of(&review).is_empty(), "score {}", score);
    }
    for score in [0, 11] {
        let review = ReviewRequest {
            text: Some("Fine".to_string()),
            score: Some(score),
        };
        assert!(errors_of(&review).get("score").is_some(), "score {}", score);
    }

    let blank = CommentRequest {
        text: Some("   ".to_string()),
    };
    assert_eq!(
        errors_of(&blank).get("text"),
        Some(&["This field may not be blank.".to_string()][..])
    );
    let long = ReviewRequest {
        text: Some("x".repeat(1001)),
        score: Some(5),
    };
    assert!(errors_of(&long).get("text").is_some());
    let fits = ReviewRequest {
        text: Some("x".repeat(1000)),
        score: Some(5),
    };
    assert!(errors_of(&fits).is_empty());

    // Absent fields are left to the handlers' presence checks.
    assert!(errors_of(&UserRequest::default()).is_empty());
    let names = UserRequest {
        first_name: Some("f".repeat(151)),
        last_name: Some(String::new()),
        ..Default::default()
    };
    let errors = errors_of(&names);
    assert!(errors.get("first_name").is_some());
    assert!(errors.get("last_name").is_none());
}

#[test]
fn test_field_errors_collects_messages() {
    let mut errors = FieldErrors::new();
    assert_eq!(errors.require("username", Some("bob".to_string())), "bob");
    assert_eq!(errors.require("email", None), "");
    assert_eq!(errors.require("bio", Some("  ".to_string())), "");

    assert_eq!(
        errors.get("email"),
        Some(&["This field is required.".to_string()][..])
    );
    assert_eq!(
        errors.get("bio"),
        Some(&["This field may not be blank.".to_string()][..])
    );
    assert!(errors.into_result().is_err());

    assert!(FieldErrors::new().into_result().is_ok());
}

#[test]
fn test_presence_errors_take_precedence() {
    let payload = signup("", "b@x.com");
    let checked = payload.validate();
    assert!(checked.is_err(), "An empty username is too short");

    let mut errors = FieldErrors::new();
    errors.require("username", payload.username);
    errors.merge(checked);
    assert_eq!(
        errors.get("username"),
        Some(&["This field may not be blank.".to_string()][..])
    );

    let mut errors = FieldErrors::new();
    errors.merge(signup("me", "b@x.com").validate());
    assert_eq!(errors.get("username").map(<[String]>::len), Some(2));
}
