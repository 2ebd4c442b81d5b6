//! Domain checks plugged into `#[validate(custom(...))]` on the request
//! payloads. Lengths, ranges and email syntax are declared on the payloads
//! themselves.

use chrono::{Datelike, Utc};
use std::borrow::Cow;
use validator::ValidationError;

/// Reserved because `/users/me` would shadow the profile route.
pub const RESERVED_USERNAME: &str = "me";

fn invalid(code: &'static str, message: impl Into<Cow<'static, str>>) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.to_lowercase() == RESERVED_USERNAME {
        return Err(invalid("reserved", "Username cannot be \"me\"."));
    }
    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '@' | '+' | '-'))
    {
        return Err(invalid(
            "username",
            "Enter a valid username. It may contain only letters, numbers, and @/./+/-/_ characters.",
        ));
    }
    Ok(())
}

/// A title may not be dated in the future.
pub fn validate_year<T: std::borrow::Borrow<i32>>(year: T) -> Result<(), ValidationError> {
    validate_year_against(*year.borrow(), Utc::now().year())
}

pub fn validate_year_against(year: i32, current_year: i32) -> Result<(), ValidationError> {
    if year < 0 {
        return Err(invalid("year", "Year cannot be negative."));
    }
    if year > current_year {
        return Err(invalid(
            "year",
            format!("Year cannot be later than {}.", current_year),
        ));
    }
    Ok(())
}

pub fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    if !slug
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(invalid(
            "slug",
            "Enter a valid \"slug\" consisting of letters, numbers, underscores or hyphens.",
        ));
    }
    Ok(())
}

pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(invalid("blank", "This field may not be blank."));
    }
    Ok(())
}
