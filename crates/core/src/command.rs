// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use pcinv_domain::{CategoryRef, HardwareFields, HardwareStatus, StatusQuantities};

/// A command represents user or system intent as data only.
///
/// Commands are the only way to request hardware changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create a new hardware row.
    Create {
        category: CategoryRef,
        fields: HardwareFields,
        quantities: StatusQuantities,
    },
    /// Create a new hardware row from a CSV import row.
    Import {
        category: CategoryRef,
        fields: HardwareFields,
        quantities: StatusQuantities,
    },
    /// Replace the descriptive fields, category, and quantities.
    Update {
        category: CategoryRef,
        fields: HardwareFields,
        quantities: StatusQuantities,
    },
    /// Move units from one status to another.
    MoveStatus {
        from: HardwareStatus,
        to: HardwareStatus,
        /// Units to move. `None` moves every unit in `from`.
        quantity: Option<u32>,
    },
    /// Add quantities from a CSV row onto a matching existing row.
    MergeImport { quantities: StatusQuantities },
    /// Hide the row from normal views, keeping its quantities for restore.
    SoftDelete,
    /// Bring a soft-deleted row back.
    Restore,
    /// Permanently remove a soft-deleted row.
    Purge,
}
