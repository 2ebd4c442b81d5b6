//! Access policies for every route.
//!
//! A policy is evaluated from the requester's role flags, the HTTP method and
//! whether the requester owns the target object. Nothing here touches the
//! database.

use crate::entities::user::{self, Role};
use crate::error::ApiError;
use actix_web::http::Method;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Anyone may read, only admins may write.
    AdminOrReadOnly,
    /// Anyone may read, any authenticated user may write.
    AuthenticatedOrReadOnly,
    /// Anyone may read; the author, moderators and admins may modify.
    AuthorModeratorAdminOrReadOnly,
    Authenticated,
    Admin,
    Superuser,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allow,
    Deny,
}

/// The parts of a user that policies look at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    pub role: Role,
    pub is_superuser: bool,
}

impl Subject {
    pub fn is_admin(&self) -> bool {
        self.is_superuser || self.role == Role::Admin
    }

    pub fn is_moderator(&self) -> bool {
        self.role == Role::Moderator
    }
}

impl From<&user::Model> for Subject {
    fn from(user: &user::Model) -> Self {
        Subject {
            role: user.role.clone(),
            is_superuser: user.is_superuser,
        }
    }
}

pub fn is_safe_method(method: &Method) -> bool {
    *method == Method::GET || *method == Method::HEAD || *method == Method::OPTIONS
}

pub fn evaluate(policy: Policy, subject: Option<&Subject>, method: &Method, is_owner: bool) -> Access {
    let safe = is_safe_method(method);
    let allowed = match (policy, subject) {
        (Policy::AdminOrReadOnly, None) => safe,
        (Policy::AdminOrReadOnly, Some(s)) => safe || s.is_admin(),
        (Policy::AuthenticatedOrReadOnly, None) => safe,
        (Policy::AuthenticatedOrReadOnly, Some(_)) => true,
        (Policy::AuthorModeratorAdminOrReadOnly, None) => safe,
        (Policy::AuthorModeratorAdminOrReadOnly, Some(s)) => {
            safe || s.is_admin() || s.is_moderator() || is_owner
        }
        (Policy::Authenticated, subject) => subject.is_some(),
        (Policy::Admin, subject) => subject.is_some_and(Subject::is_admin),
        (Policy::Superuser, subject) => subject.is_some_and(|s| s.is_superuser),
    };
    if allowed {
        Access::Allow
    } else {
        Access::Deny
    }
}

/// Evaluate `policy` for `requester` and turn a denial into the matching
/// error: 401 for anonymous requests, 403 otherwise.
pub fn authorize(
    policy: Policy,
    requester: Option<&user::Model>,
    method: &Method,
    owner_id: Option<i64>,
) -> Result<(), ApiError> {
    let subject = requester.map(Subject::from);
    let is_owner = matches!((requester, owner_id), (Some(user), Some(owner)) if user.id == owner);
    match evaluate(policy, subject.as_ref(), method, is_owner) {
        Access::Allow => Ok(()),
        Access::Deny if requester.is_none() => Err(ApiError::Unauthorized),
        Access::Deny => Err(ApiError::Forbidden),
    }
}
