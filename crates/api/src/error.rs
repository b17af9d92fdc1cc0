// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use crate::backup::BackupValidationError;
use crate::password_policy::PasswordPolicyError;
use pcinv::CoreError;
use pcinv_domain::DomainError;
use pcinv_persistence::PersistenceError;

/// Authentication and authorization errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
    /// The session store could not be read or written.
    Internal {
        /// A description of the failure.
        message: String,
    },
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
            Self::Internal { message } => write!(f, "Internal error: {message}"),
        }
    }
}

impl std::error::Error for AuthError {}

/// API-level errors.
///
/// These are distinct from domain/core/persistence errors and represent the
/// API contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed - the actor does not have permission.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
    /// A domain rule was violated.
    DomainRuleViolation {
        /// The rule that was violated.
        rule: String,
        /// A human-readable description of the violation.
        message: String,
    },
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A requested resource was not found.
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// The request conflicts with the current state of the data.
    Conflict {
        /// A human-readable description of the conflict.
        message: String,
    },
    /// Invalid CSV format.
    InvalidCsvFormat {
        /// A description of the format error.
        reason: String,
    },
    /// The uploaded backup failed validation.
    InvalidBackup {
        /// A description of the validation failure.
        reason: String,
    },
    /// Password policy violation.
    PasswordPolicyViolation {
        /// A human-readable description of the policy violation.
        message: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => write!(f, "{reason}"),
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
            Self::DomainRuleViolation { message, .. } | Self::Conflict { message } => {
                write!(f, "{message}")
            }
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::InvalidCsvFormat { reason } => write!(f, "Invalid CSV format: {reason}"),
            Self::InvalidBackup { reason } => write!(f, "Invalid backup: {reason}"),
            Self::PasswordPolicyViolation { message } => {
                write!(f, "Password policy violation: {message}")
            }
            Self::Internal { message } => write!(f, "Internal error: {message}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed { reason } => Self::AuthenticationFailed { reason },
            AuthError::Unauthorized {
                action,
                required_role,
            } => Self::Unauthorized {
                action,
                required_role,
            },
            AuthError::Internal { message } => Self::Internal { message },
        }
    }
}

impl From<PasswordPolicyError> for ApiError {
    fn from(err: PasswordPolicyError) -> Self {
        Self::PasswordPolicyViolation {
            message: err.to_string(),
        }
    }
}

impl From<BackupValidationError> for ApiError {
    fn from(err: BackupValidationError) -> Self {
        Self::InvalidBackup {
            reason: err.to_string(),
        }
    }
}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked directly.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    let message: String = err.to_string();
    match err {
        DomainError::InvalidName(_) => ApiError::InvalidInput {
            field: String::from("name"),
            message,
        },
        DomainError::FieldTooLong { field, .. } => ApiError::InvalidInput {
            field: String::from(field),
            message,
        },
        DomainError::InvalidRole(_) => ApiError::InvalidInput {
            field: String::from("role"),
            message,
        },
        DomainError::InvalidStatus(_) => ApiError::InvalidInput {
            field: String::from("status"),
            message,
        },
        DomainError::InvalidQuantity(_) | DomainError::ZeroQuantityTransfer => {
            ApiError::InvalidInput {
                field: String::from("quantity"),
                message,
            }
        }
        DomainError::QuantityOverflow => ApiError::DomainRuleViolation {
            rule: String::from("quantity_limit"),
            message,
        },
        DomainError::InsufficientQuantity { .. } => ApiError::DomainRuleViolation {
            rule: String::from("sufficient_units"),
            message,
        },
        DomainError::SameStatusTransfer(_) => ApiError::DomainRuleViolation {
            rule: String::from("distinct_statuses"),
            message,
        },
        DomainError::InvalidUsername(_) => ApiError::InvalidInput {
            field: String::from("username"),
            message,
        },
        DomainError::InvalidFullName(_) => ApiError::InvalidInput {
            field: String::from("full_name"),
            message,
        },
        DomainError::InvalidCategoryName(_) => ApiError::InvalidInput {
            field: String::from("category"),
            message,
        },
        DomainError::TimestampParseError { .. } => ApiError::InvalidInput {
            field: String::from("date"),
            message,
        },
        DomainError::TimestampFormatError(_) => ApiError::Internal { message },
    }
}

/// Translates a core error into an API error.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        CoreError::HardwareNotFound => ApiError::ResourceNotFound {
            resource_type: String::from("Hardware"),
            message: String::from("The hardware item does not exist"),
        },
        CoreError::HardwareAlreadyExists { .. } => ApiError::Conflict {
            message: err.to_string(),
        },
        CoreError::HardwareDeleted { .. } => ApiError::DomainRuleViolation {
            rule: String::from("hardware_active"),
            message: format!("{err}; restore it first"),
        },
        CoreError::HardwareNotDeleted { .. } => ApiError::DomainRuleViolation {
            rule: String::from("hardware_deleted"),
            message: format!("{err}; delete it first"),
        },
    }
}

/// Translates a persistence error into an API error.
///
/// Only not-found, uniqueness, staleness, and referential conflicts are
/// surfaced to callers. Everything else becomes an internal error.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::NotFound(message) => ApiError::ResourceNotFound {
            resource_type: String::from("Record"),
            message,
        },
        PersistenceError::UniqueViolation(_)
        | PersistenceError::StaleHardware { .. }
        | PersistenceError::CategoryInUse { .. }
        | PersistenceError::ForeignKeyViolation(_) => ApiError::Conflict {
            message: err.to_string(),
        },
        other => ApiError::Internal {
            message: other.to_string(),
        },
    }
}
