// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::types::HardwareStatus;

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Hardware name is empty or invalid.
    InvalidName(String),
    /// A free-text field exceeds its maximum length.
    FieldTooLong {
        /// The field that was too long.
        field: &'static str,
        /// The maximum number of characters allowed.
        max: usize,
    },
    /// Role string is not recognized.
    InvalidRole(String),
    /// Status string is not recognized.
    InvalidStatus(String),
    /// A quantity is negative or not representable.
    InvalidQuantity(String),
    /// Adding quantities would overflow.
    QuantityOverflow,
    /// Not enough units in the source status for a move.
    InsufficientQuantity {
        /// The status units are being moved out of.
        status: HardwareStatus,
        /// The units currently in that status.
        available: u32,
        /// The units that were requested.
        requested: u32,
    },
    /// A move must change the status.
    SameStatusTransfer(HardwareStatus),
    /// A move must transfer at least one unit.
    ZeroQuantityTransfer,
    /// Username is empty or malformed.
    InvalidUsername(String),
    /// Full name is empty or too long.
    InvalidFullName(String),
    /// Category name is empty or too long.
    InvalidCategoryName(String),
    /// Failed to parse a stored timestamp.
    TimestampParseError {
        /// The invalid timestamp string.
        value: String,
        /// The parsing error message.
        error: String,
    },
    /// Failed to format a timestamp.
    TimestampFormatError(String),
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName(msg) => write!(f, "Invalid name: {msg}"),
            Self::FieldTooLong { field, max } => {
                write!(f, "Field '{field}' must be at most {max} characters")
            }
            Self::InvalidRole(role) => write!(f, "Invalid role: '{role}'"),
            Self::InvalidStatus(status) => write!(f, "Invalid status: '{status}'"),
            Self::InvalidQuantity(msg) => write!(f, "Invalid quantity: {msg}"),
            Self::QuantityOverflow => write!(f, "Quantity exceeds the supported maximum"),
            Self::InsufficientQuantity {
                status,
                available,
                requested,
            } => {
                write!(
                    f,
                    "Cannot move {requested} unit(s) out of '{status}': only {available} available"
                )
            }
            Self::SameStatusTransfer(status) => {
                write!(f, "Source and target status are both '{status}'")
            }
            Self::ZeroQuantityTransfer => write!(f, "At least one unit must be moved"),
            Self::InvalidUsername(msg) => write!(f, "Invalid username: {msg}"),
            Self::InvalidFullName(msg) => write!(f, "Invalid full name: {msg}"),
            Self::InvalidCategoryName(msg) => write!(f, "Invalid category name: {msg}"),
            Self::TimestampParseError { value, error } => {
                write!(f, "Failed to parse timestamp '{value}': {error}")
            }
            Self::TimestampFormatError(msg) => write!(f, "Failed to format timestamp: {msg}"),
        }
    }
}

impl std::error::Error for DomainError {}
