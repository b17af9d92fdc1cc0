// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use pcinv_domain::DomainError;

/// Errors that can occur during state transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A domain rule was violated.
    DomainViolation(DomainError),
    /// The command needs an existing row but none was given.
    HardwareNotFound,
    /// A create command was given an existing row.
    HardwareAlreadyExists { hardware_id: Option<i64> },
    /// The row is soft-deleted and the command needs an active row.
    HardwareDeleted { hardware_id: Option<i64> },
    /// The row is active and the command needs a soft-deleted row.
    HardwareNotDeleted { hardware_id: Option<i64> },
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DomainViolation(err) => write!(f, "Domain violation: {err}"),
            Self::HardwareNotFound => write!(f, "Hardware not found"),
            Self::HardwareAlreadyExists { hardware_id } => {
                write!(f, "Hardware already exists: {}", display_id(*hardware_id))
            }
            Self::HardwareDeleted { hardware_id } => {
                write!(f, "Hardware {} is deleted", display_id(*hardware_id))
            }
            Self::HardwareNotDeleted { hardware_id } => {
                write!(f, "Hardware {} is not deleted", display_id(*hardware_id))
            }
        }
    }
}

fn display_id(hardware_id: Option<i64>) -> String {
    hardware_id.map_or_else(|| String::from("(unsaved)"), |id| format!("#{id}"))
}

impl std::error::Error for CoreError {}

impl From<DomainError> for CoreError {
    fn from(err: DomainError) -> Self {
        Self::DomainViolation(err)
    }
}
