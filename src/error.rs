use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use sea_orm::{DbErr, SqlErr};
use serde_json::json;
use std::collections::BTreeMap;
use validator::ValidationErrors;

/// Field name used for errors that do not belong to a single field.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// Validation messages keyed by field name.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Take a required string field, recording an error when it is missing
    /// or blank. The returned value is empty in that case.
    pub fn require(&mut self, field: &str, value: Option<String>) -> String {
        match value {
            Some(value) if !value.trim().is_empty() => value,
            Some(_) => {
                self.add(field, "This field may not be blank.");
                String::new()
            }
            None => {
                self.add(field, "This field is required.");
                String::new()
            }
        }
    }

    /// Fold in the outcome of `Validate::validate`. Fields that already
    /// failed a presence check keep only that message.
    pub fn merge(&mut self, result: Result<(), ValidationErrors>) {
        let Err(invalid) = result else {
            return;
        };
        for (field, errors) in invalid.field_errors() {
            let field: &str = &field;
            if self.0.contains_key(field) {
                continue;
            }
            for error in errors {
                let message = match &error.message {
                    Some(message) => message.to_string(),
                    None => format!("Invalid value ({}).", error.code),
                };
                self.add(field, message);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// `Ok(())` when nothing was recorded, otherwise a validation error.
    pub fn into_result(self) -> Result<(), ApiError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(self))
        }
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", field, messages.join(" "))?;
            first = false;
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("validation failed: {0}")]
    Validation(FieldErrors),
    #[error("{0}")]
    NotFound(String),
    #[error("Authentication credentials were not provided.")]
    Unauthorized,
    #[error("You do not have permission to perform this action.")]
    Forbidden,
    #[error("Method \"{0}\" not allowed.")]
    MethodNotAllowed(String),
    #[error("database error: {0}")]
    Database(#[from] DbErr),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        ApiError::Validation(FieldErrors::single(field, message))
    }

    pub fn not_found() -> Self {
        ApiError::NotFound("Not found.".to_string())
    }
}

/// Turn a unique-constraint violation into a validation error on `field`,
/// passing any other database error through.
pub fn unique_violation(err: DbErr, field: &str, message: &str) -> ApiError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => ApiError::validation(field, message),
        _ => ApiError::Database(err),
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        match self {
            ApiError::Validation(errors) => HttpResponse::build(status).json(&errors.0),
            ApiError::Database(e) => {
                log::error!("Database error: {:?}", e);
                HttpResponse::build(status).json(json!({"detail": "Internal server error"}))
            }
            ApiError::Internal(e) => {
                log::error!("Internal error: {:?}", e);
                HttpResponse::build(status).json(json!({"detail": "Internal server error"}))
            }
            other => HttpResponse::build(status).json(json!({"detail": other.to_string()})),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
