// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Inventory history types.
//!
//! Every change to a hardware row produces exactly one history event. Events
//! are append-only: once written they are never updated or deleted by the
//! application. Each event carries a copy of the hardware identity and the
//! acting user's name so that it stays readable after the hardware row is
//! purged or the user is removed.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

use pcinv_domain::StatusQuantities;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The user responsible for a change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// The user's ID. `None` once the user has been deleted.
    pub user_id: Option<i64>,
    /// The user's name at the time of the change.
    pub user_name: String,
}

impl Actor {
    /// Creates a new Actor.
    ///
    /// # Arguments
    ///
    /// * `user_id` - The acting user's ID
    /// * `user_name` - The acting user's display name
    #[must_use]
    pub const fn new(user_id: Option<i64>, user_name: String) -> Self {
        Self { user_id, user_name }
    }
}

/// The kind of change recorded by a history event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryAction {
    /// Hardware created through the UI or API.
    Added,
    /// Descriptive fields or quantities edited.
    Updated,
    /// Units moved between statuses.
    StatusChanged,
    /// Hardware created by a CSV import row.
    Imported,
    /// CSV import row merged into an existing item.
    ImportMerged,
    /// Hardware soft-deleted.
    Deleted,
    /// Soft-deleted hardware restored.
    Restored,
    /// Soft-deleted hardware removed permanently.
    Purged,
}

impl HistoryAction {
    /// All actions, for filter listings.
    pub const ALL: [Self; 8] = [
        Self::Added,
        Self::Updated,
        Self::StatusChanged,
        Self::Imported,
        Self::ImportMerged,
        Self::Deleted,
        Self::Restored,
        Self::Purged,
    ];

    /// Returns the stored string form of this action.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Updated => "updated",
            Self::StatusChanged => "status_changed",
            Self::Imported => "imported",
            Self::ImportMerged => "import_merged",
            Self::Deleted => "deleted",
            Self::Restored => "restored",
            Self::Purged => "purged",
        }
    }
}

impl std::fmt::Display for HistoryAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a stored action string is not recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownHistoryAction(pub String);

impl std::fmt::Display for UnknownHistoryAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Unknown history action: '{}'", self.0)
    }
}

impl std::error::Error for UnknownHistoryAction {}

impl FromStr for HistoryAction {
    type Err = UnknownHistoryAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|action| action.as_str() == s.trim())
            .ok_or_else(|| UnknownHistoryAction(s.to_string()))
    }
}

/// The hardware identity recorded on a history event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HardwareRef {
    /// The hardware row ID. `None` until the row exists, and after purge.
    pub hardware_id: Option<i64>,
    pub hardware_name: String,
    pub category_name: String,
    pub serial_number: String,
}

impl HardwareRef {
    /// Creates a new `HardwareRef`.
    #[must_use]
    pub const fn new(
        hardware_id: Option<i64>,
        hardware_name: String,
        category_name: String,
        serial_number: String,
    ) -> Self {
        Self {
            hardware_id,
            hardware_name,
            category_name,
            serial_number,
        }
    }
}

/// An immutable history event describing one hardware change.
///
/// Captures:
/// - Who made the change (actor)
/// - What kind of change it was (action)
/// - Which hardware it applied to (hardware)
/// - The status quantities before and after
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEvent {
    pub actor: Actor,
    pub action: HistoryAction,
    pub hardware: HardwareRef,
    pub before: StatusQuantities,
    pub after: StatusQuantities,
    /// Free-text description of the change.
    pub details: Option<String>,
}

impl HistoryEvent {
    /// Creates a new `HistoryEvent`.
    ///
    /// # Arguments
    ///
    /// * `actor` - The user who made the change
    /// * `action` - The kind of change
    /// * `hardware` - The hardware identity
    /// * `before` - Quantities before the change
    /// * `after` - Quantities after the change
    /// * `details` - Optional description
    #[must_use]
    pub const fn new(
        actor: Actor,
        action: HistoryAction,
        hardware: HardwareRef,
        before: StatusQuantities,
        after: StatusQuantities,
        details: Option<String>,
    ) -> Self {
        Self {
            actor,
            action,
            hardware,
            before,
            after,
            details,
        }
    }

    /// Signed change in total quantity, `total(after) - total(before)`.
    #[must_use]
    pub fn quantity_change(&self) -> i64 {
        let diff = |after: u32, before: u32| i64::from(after) - i64::from(before);
        diff(self.after.unused, self.before.unused)
            + diff(self.after.in_use, self.before.in_use)
            + diff(self.after.damaged, self.before.damaged)
            + diff(self.after.repair, self.before.repair)
    }
}

/// A persisted history event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: i64,
    pub event: HistoryEvent,
    /// The stored quantity change. Always equals `event.quantity_change()`.
    pub quantity_change: i64,
    pub created_at: String,
}
