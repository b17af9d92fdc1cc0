// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::DomainError;

/// User roles for authorization.
///
/// Roles determine what actions an authenticated user may perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Admin role: full authority over the inventory.
    ///
    /// Admins may perform:
    /// - user management
    /// - category management
    /// - soft delete, restore, and purge of hardware
    /// - CSV import
    /// - database backup and restore
    Admin,
    /// Staff role: day-to-day inventory work.
    ///
    /// Staff may:
    /// - view the dashboard, hardware, and history
    /// - add and edit hardware
    /// - move units between statuses
    /// - export CSV
    Staff,
}

impl Role {
    /// Returns the stored string form of this role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Staff => "staff",
        }
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "staff" => Ok(Self::Staff),
            _ => Err(DomainError::InvalidRole(s.to_string())),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The condition a unit of hardware is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HardwareStatus {
    /// In stock and available.
    Unused,
    /// Deployed.
    InUse,
    /// Broken and not under repair.
    Damaged,
    /// Out for repair.
    Repair,
}

impl HardwareStatus {
    /// All statuses in column order.
    pub const ALL: [Self; 4] = [Self::Unused, Self::InUse, Self::Damaged, Self::Repair];

    /// Returns the stored string form of this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unused => "unused",
            Self::InUse => "in_use",
            Self::Damaged => "damaged",
            Self::Repair => "repair",
        }
    }
}

impl FromStr for HardwareStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "unused" => Ok(Self::Unused),
            "in_use" => Ok(Self::InUse),
            "damaged" => Ok(Self::Damaged),
            "repair" => Ok(Self::Repair),
            _ => Err(DomainError::InvalidStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for HardwareStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unit counts per status for a single hardware row.
///
/// The total quantity is always derived from these four counts and is
/// never stored independently in the domain model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusQuantities {
    pub unused: u32,
    pub in_use: u32,
    pub damaged: u32,
    pub repair: u32,
}

impl StatusQuantities {
    /// All counts zero.
    pub const ZERO: Self = Self {
        unused: 0,
        in_use: 0,
        damaged: 0,
        repair: 0,
    };

    /// Creates a new set of quantities.
    #[must_use]
    pub const fn new(unused: u32, in_use: u32, damaged: u32, repair: u32) -> Self {
        Self {
            unused,
            in_use,
            damaged,
            repair,
        }
    }

    /// Builds quantities from signed values, as read from forms or the database.
    ///
    /// # Errors
    ///
    /// Returns an error if any value is negative or exceeds `u32::MAX`.
    pub fn from_signed(
        unused: i64,
        in_use: i64,
        damaged: i64,
        repair: i64,
    ) -> Result<Self, DomainError> {
        let convert = |value: i64, status: HardwareStatus| -> Result<u32, DomainError> {
            u32::try_from(value).map_err(|_| {
                DomainError::InvalidQuantity(format!(
                    "'{status}' must be a non-negative whole number, got {value}"
                ))
            })
        };
        Ok(Self {
            unused: convert(unused, HardwareStatus::Unused)?,
            in_use: convert(in_use, HardwareStatus::InUse)?,
            damaged: convert(damaged, HardwareStatus::Damaged)?,
            repair: convert(repair, HardwareStatus::Repair)?,
        })
    }

    /// Sum of all four status counts.
    #[must_use]
    pub fn total(&self) -> u64 {
        u64::from(self.unused)
            + u64::from(self.in_use)
            + u64::from(self.damaged)
            + u64::from(self.repair)
    }

    /// Returns the count for a single status.
    #[must_use]
    pub const fn get(&self, status: HardwareStatus) -> u32 {
        match status {
            HardwareStatus::Unused => self.unused,
            HardwareStatus::InUse => self.in_use,
            HardwareStatus::Damaged => self.damaged,
            HardwareStatus::Repair => self.repair,
        }
    }

    /// Returns a copy with one status count replaced.
    #[must_use]
    pub const fn with(mut self, status: HardwareStatus, quantity: u32) -> Self {
        match status {
            HardwareStatus::Unused => self.unused = quantity,
            HardwareStatus::InUse => self.in_use = quantity,
            HardwareStatus::Damaged => self.damaged = quantity,
            HardwareStatus::Repair => self.repair = quantity,
        }
        self
    }

    /// Adds another set of quantities status by status.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::QuantityOverflow` if any count would overflow.
    pub fn checked_add(&self, other: &Self) -> Result<Self, DomainError> {
        let add = |a: u32, b: u32| a.checked_add(b).ok_or(DomainError::QuantityOverflow);
        Ok(Self {
            unused: add(self.unused, other.unused)?,
            in_use: add(self.in_use, other.in_use)?,
            damaged: add(self.damaged, other.damaged)?,
            repair: add(self.repair, other.repair)?,
        })
    }

    /// Moves units from one status to another, keeping the total unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `from` and `to` are the same status
    /// - `quantity` is zero
    /// - `from` holds fewer than `quantity` units
    pub fn move_units(
        &self,
        from: HardwareStatus,
        to: HardwareStatus,
        quantity: u32,
    ) -> Result<Self, DomainError> {
        if from == to {
            return Err(DomainError::SameStatusTransfer(from));
        }
        if quantity == 0 {
            return Err(DomainError::ZeroQuantityTransfer);
        }
        let available: u32 = self.get(from);
        if available < quantity {
            return Err(DomainError::InsufficientQuantity {
                status: from,
                available,
                requested: quantity,
            });
        }
        let target: u32 = self
            .get(to)
            .checked_add(quantity)
            .ok_or(DomainError::QuantityOverflow)?;
        Ok(self.with(from, available - quantity).with(to, target))
    }
}

/// Descriptive fields of a hardware row.
///
/// Every field is trimmed on construction. Only `name` is required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HardwareFields {
    pub name: String,
    pub hardware_type: String,
    pub brand: String,
    pub model: String,
    pub serial_number: String,
    pub location: String,
}

impl HardwareFields {
    /// Creates a new set of fields, trimming surrounding whitespace.
    #[must_use]
    pub fn new(
        name: &str,
        hardware_type: &str,
        brand: &str,
        model: &str,
        serial_number: &str,
        location: &str,
    ) -> Self {
        Self {
            name: name.trim().to_string(),
            hardware_type: hardware_type.trim().to_string(),
            brand: brand.trim().to_string(),
            model: model.trim().to_string(),
            serial_number: serial_number.trim().to_string(),
            location: location.trim().to_string(),
        }
    }
}

/// A category reference carried on hardware rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: i64,
    pub name: String,
}

impl CategoryRef {
    /// Creates a new category reference.
    #[must_use]
    pub fn new(id: i64, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
        }
    }
}

/// A hardware inventory row.
///
/// `id` is `None` until the row has been persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hardware {
    pub id: Option<i64>,
    pub category: CategoryRef,
    pub fields: HardwareFields,
    pub quantities: StatusQuantities,
    pub created_at: String,
    pub updated_at: String,
    /// Set when the row is soft-deleted.
    pub deleted_at: Option<String>,
}

impl Hardware {
    /// Returns `true` if the row has been soft-deleted.
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Sum of all four status counts.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.quantities.total()
    }
}
