//! Single-use confirmation codes for the passwordless signup flow.
//!
//! The plain code is only ever mailed to the user; the database keeps a
//! bcrypt hash and the time it was issued.

use bcrypt::{hash, verify};
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

/// A freshly generated code together with what gets persisted.
pub struct IssuedCode {
    pub code: String,
    pub hash: String,
    pub issued_at: DateTime<Utc>,
}

pub fn issue_confirmation_code(cost: u32) -> Result<IssuedCode, anyhow::Error> {
    let code = Uuid::new_v4().simple().to_string();
    let hashed =
        hash(&code, cost).map_err(|e| anyhow::anyhow!("Confirmation code hashing error: {:?}", e))?;
    Ok(IssuedCode {
        code,
        hash: hashed,
        issued_at: Utc::now(),
    })
}

/// Check `code` against the stored hash, rejecting codes older than
/// `ttl_hours`. A missing hash means no code is outstanding.
pub fn verify_confirmation_code(
    code: &str,
    stored_hash: Option<&str>,
    issued_at: Option<DateTime<Utc>>,
    ttl_hours: i64,
) -> bool {
    let (Some(stored_hash), Some(issued_at)) = (stored_hash, issued_at) else {
        return false;
    };
    if Utc::now() - issued_at > Duration::hours(ttl_hours) {
        return false;
    }
    verify(code, stored_hash).unwrap_or(false)
}
