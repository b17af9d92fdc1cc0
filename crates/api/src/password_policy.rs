// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Password policy validation.
//!
//! This module enforces password requirements for user credentials.

use thiserror::Error;

/// Password policy errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PasswordPolicyError {
    /// Password is too short.
    #[error("Password must be at least {min_length} characters long")]
    TooShort { min_length: usize },

    /// Password does not mix enough character classes.
    #[error(
        "Password must contain at least {required} of: uppercase letter, lowercase letter, digit, symbol (found {found})"
    )]
    InsufficientComplexity { required: usize, found: usize },

    /// Password equals the username or full name.
    #[error("Password must not match the {field}")]
    MatchesForbiddenField { field: &'static str },

    /// Password and confirmation do not match.
    #[error("Password and confirmation do not match")]
    ConfirmationMismatch,
}

/// Password policy configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordPolicy {
    /// Minimum password length in characters.
    pub min_length: usize,
    /// Minimum number of character classes required (out of 4).
    pub min_complexity: usize,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            min_complexity: 3,
        }
    }
}

impl PasswordPolicy {
    /// Validates a password against the policy.
    ///
    /// Checks run in order: confirmation, length, complexity, and finally
    /// the forbidden values. The first failure is returned.
    ///
    /// # Arguments
    ///
    /// * `password` - The password to validate
    /// * `confirmation` - The password confirmation
    /// * `username` - The account's username (password must not match)
    /// * `full_name` - The account's full name (password must not match)
    ///
    /// # Errors
    ///
    /// Returns a `PasswordPolicyError` if the password does not meet policy requirements.
    pub fn validate(
        &self,
        password: &str,
        confirmation: &str,
        username: &str,
        full_name: &str,
    ) -> Result<(), PasswordPolicyError> {
        if password != confirmation {
            return Err(PasswordPolicyError::ConfirmationMismatch);
        }

        if password.chars().count() < self.min_length {
            return Err(PasswordPolicyError::TooShort {
                min_length: self.min_length,
            });
        }

        let found: usize = Self::character_classes(password);
        if found < self.min_complexity {
            return Err(PasswordPolicyError::InsufficientComplexity {
                required: self.min_complexity,
                found,
            });
        }

        // Case-insensitive
        let lowered: String = password.to_lowercase();
        if lowered == username.trim().to_lowercase() {
            return Err(PasswordPolicyError::MatchesForbiddenField { field: "username" });
        }
        if lowered == full_name.trim().to_lowercase() {
            return Err(PasswordPolicyError::MatchesForbiddenField { field: "full name" });
        }

        Ok(())
    }

    /// Counts the character classes present in a password.
    ///
    /// The classes are uppercase, lowercase, digit, and symbol. Any
    /// visible character that is not a letter or digit counts as a symbol.
    fn character_classes(password: &str) -> usize {
        let classes: [fn(&char) -> bool; 4] = [
            char::is_ascii_uppercase,
            char::is_ascii_lowercase,
            char::is_ascii_digit,
            |c: &char| !c.is_alphanumeric() && !c.is_whitespace(),
        ];
        classes
            .iter()
            .filter(|class| password.chars().any(|c| class(&c)))
            .count()
    }
}
