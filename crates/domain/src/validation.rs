// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::types::HardwareFields;

/// Maximum length of a hardware name.
pub const MAX_HARDWARE_NAME_LEN: usize = 150;
/// Maximum length of the optional hardware text fields.
pub const MAX_FIELD_LEN: usize = 100;
/// Maximum length of a category name.
pub const MAX_CATEGORY_NAME_LEN: usize = 50;
/// Maximum length of a user's full name.
pub const MAX_FULL_NAME_LEN: usize = 100;

const MIN_USERNAME_LEN: usize = 3;
const MAX_USERNAME_LEN: usize = 50;

fn check_len(field: &'static str, value: &str, max: usize) -> Result<(), DomainError> {
    if value.chars().count() > max {
        return Err(DomainError::FieldTooLong { field, max });
    }
    Ok(())
}

/// Validates the descriptive fields of a hardware row.
///
/// # Errors
///
/// Returns an error if:
/// - The name is empty
/// - Any field exceeds its maximum length
pub fn validate_hardware_fields(fields: &HardwareFields) -> Result<(), DomainError> {
    if fields.name.is_empty() {
        return Err(DomainError::InvalidName(String::from(
            "Hardware name cannot be empty",
        )));
    }
    check_len("name", &fields.name, MAX_HARDWARE_NAME_LEN)?;
    check_len("type", &fields.hardware_type, MAX_FIELD_LEN)?;
    check_len("brand", &fields.brand, MAX_FIELD_LEN)?;
    check_len("model", &fields.model, MAX_FIELD_LEN)?;
    check_len("serial_number", &fields.serial_number, MAX_FIELD_LEN)?;
    check_len("location", &fields.location, MAX_FIELD_LEN)?;
    Ok(())
}

/// Validates and normalizes a username.
///
/// Usernames are case-insensitive and stored lowercase.
///
/// # Returns
///
/// The normalized (trimmed, lowercased) username.
///
/// # Errors
///
/// Returns an error if the username is shorter than 3 or longer than 50
/// characters, or contains characters other than `a-z`, `0-9`, `.`, `_`, `-`.
pub fn validate_username(username: &str) -> Result<String, DomainError> {
    let normalized: String = username.trim().to_lowercase();
    let len: usize = normalized.chars().count();
    if !(MIN_USERNAME_LEN..=MAX_USERNAME_LEN).contains(&len) {
        return Err(DomainError::InvalidUsername(format!(
            "must be between {MIN_USERNAME_LEN} and {MAX_USERNAME_LEN} characters"
        )));
    }
    if !normalized
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '_' | '-'))
    {
        return Err(DomainError::InvalidUsername(String::from(
            "may only contain letters, digits, '.', '_' and '-'",
        )));
    }
    Ok(normalized)
}

/// Validates a user's full name and returns it trimmed.
///
/// # Errors
///
/// Returns an error if the name is empty or too long.
pub fn validate_full_name(full_name: &str) -> Result<String, DomainError> {
    let trimmed: &str = full_name.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidFullName(String::from(
            "Full name cannot be empty",
        )));
    }
    if trimmed.chars().count() > MAX_FULL_NAME_LEN {
        return Err(DomainError::InvalidFullName(format!(
            "must be at most {MAX_FULL_NAME_LEN} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Validates a category name and returns it trimmed.
///
/// # Errors
///
/// Returns an error if the name is empty or too long.
pub fn validate_category_name(name: &str) -> Result<String, DomainError> {
    let trimmed: &str = name.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidCategoryName(String::from(
            "Category name cannot be empty",
        )));
    }
    if trimmed.chars().count() > MAX_CATEGORY_NAME_LEN {
        return Err(DomainError::InvalidCategoryName(format!(
            "must be at most {MAX_CATEGORY_NAME_LEN} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Folds a name for case-insensitive comparison.
///
/// Category names and import duplicate keys compare through this single
/// rule on every backend, so `Überdock` and `überdock` are the same name.
#[must_use]
pub fn fold_case(value: &str) -> String {
    value.trim().to_lowercase()
}
