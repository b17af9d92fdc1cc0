// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod error;
mod timestamp;
mod types;
mod validation;

#[cfg(test)]
mod tests;

// Re-export public types
pub use error::DomainError;
pub use timestamp::{
    format_duration, format_timestamp, now_timestamp, parse_timestamp, seconds_between,
};
pub use types::{CategoryRef, Hardware, HardwareFields, HardwareStatus, Role, StatusQuantities};
pub use validation::{
    MAX_CATEGORY_NAME_LEN, MAX_FIELD_LEN, MAX_FULL_NAME_LEN, MAX_HARDWARE_NAME_LEN, fold_case,
    validate_category_name, validate_full_name, validate_hardware_fields, validate_username,
};
