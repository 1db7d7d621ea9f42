//! Error types for hierarchy and membership operations
//!
//! This module defines the errors surfaced by the hierarchy manager, the
//! membership manager, the access policy and the underlying store.

use thiserror::Error;

/// Organization management error types.
#[derive(Debug, Error)]
pub enum OrgError {
    /// A required field is missing or blank
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A referenced org unit does not exist
    #[error("Org unit not found: {0}")]
    OrgUnitNotFound(String),

    /// A membership already exists for the (user, org unit) pair
    #[error("Membership already exists for user {user_id} in org unit {org_unit_id}")]
    DuplicateMembership {
        /// User ID
        user_id: String,
        /// Org unit ID
        org_unit_id: String,
    },

    /// No caller identity was supplied
    #[error("Caller identity required")]
    Unauthenticated,

    /// The caller is not allowed to perform the operation
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Underlying persistence failure
    #[error("Store error: {0}")]
    Store(String),
}

/// Result type for organization operations.
pub type OrgResult<T> = Result<T, OrgError>;

impl OrgError {
    /// Shorthand for a validation failure on a named field.
    pub fn required(field: &str) -> Self {
        OrgError::Validation(format!("{field} is required"))
    }

    /// Check if this error should be logged at error level.
    ///
    /// Validation, lookup and access failures are caller mistakes and
    /// are not logged as errors.
    pub fn is_server_error(&self) -> bool {
        matches!(self, OrgError::Store(_))
    }

    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            OrgError::Validation(_) => 400,
            OrgError::Unauthenticated => 401,
            OrgError::Forbidden(_) => 403,
            OrgError::OrgUnitNotFound(_) => 404,
            OrgError::DuplicateMembership { .. } => 409,
            OrgError::Store(_) => 500,
        }
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            OrgError::Validation(_) => "VALIDATION_ERROR",
            OrgError::OrgUnitNotFound(_) => "NOT_FOUND",
            OrgError::DuplicateMembership { .. } => "CONFLICT",
            OrgError::Unauthenticated => "UNAUTHENTICATED",
            OrgError::Forbidden(_) => "FORBIDDEN",
            OrgError::Store(_) => "STORE_ERROR",
        }
    }
}

/// Trim a required string field, failing with a validation error when blank.
pub(crate) fn require_field(value: &str, field: &str) -> OrgResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(OrgError::required(field));
    }
    Ok(trimmed.to_string())
}
