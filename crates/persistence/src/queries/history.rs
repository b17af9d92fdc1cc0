// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Inventory history queries.

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use pcinv_domain::StatusQuantities;
use pcinv_history::{Actor, HardwareRef, HistoryAction, HistoryEntry, HistoryEvent};
use tracing::debug;

use crate::data_models::{HistoryFilter, HistoryPage, HistoryRecord};
use crate::diesel_schema::inventory_history;
use crate::error::PersistenceError;

fn quantities(
    history_id: i64,
    values: [i64; 4],
) -> Result<StatusQuantities, PersistenceError> {
    let [unused, in_use, damaged, repair] = values;
    StatusQuantities::from_signed(unused, in_use, damaged, repair).map_err(|e| {
        PersistenceError::InvalidStoredValue(format!("history entry {history_id}: {e}"))
    })
}

/// Reconstructs a history entry from its stored row.
///
/// # Errors
///
/// Returns `PersistenceError::InvalidStoredValue` if the action is unknown
/// or a stored quantity is out of range.
pub fn entry_from_record(record: HistoryRecord) -> Result<HistoryEntry, PersistenceError> {
    let action: HistoryAction = record.action.parse().map_err(|e| {
        PersistenceError::InvalidStoredValue(format!("history entry {}: {e}", record.history_id))
    })?;
    let before: StatusQuantities = quantities(
        record.history_id,
        [
            record.unused_before,
            record.in_use_before,
            record.damaged_before,
            record.repair_before,
        ],
    )?;
    let after: StatusQuantities = quantities(
        record.history_id,
        [
            record.unused_after,
            record.in_use_after,
            record.damaged_after,
            record.repair_after,
        ],
    )?;

    Ok(HistoryEntry {
        id: record.history_id,
        event: HistoryEvent::new(
            Actor::new(record.user_id, record.user_name),
            action,
            HardwareRef::new(
                record.hardware_id,
                record.hardware_name,
                record.category_name,
                record.serial_number,
            ),
            before,
            after,
            record.details,
        ),
        quantity_change: record.quantity_change,
        created_at: record.created_at,
    })
}

/// Builds a boxed history query with `filter` applied.
macro_rules! filtered_history {
    ($filter:expr, $selection:expr) => {{
        let filter: &HistoryFilter = $filter;
        let mut query = inventory_history::table.select($selection).into_boxed();

        if let Some(hardware_id) = filter.hardware_id {
            query = query.filter(inventory_history::hardware_id.eq(hardware_id));
        }
        if let Some(user_id) = filter.user_id {
            query = query.filter(inventory_history::user_id.eq(user_id));
        }
        if let Some(action) = filter.action.as_deref() {
            query = query.filter(inventory_history::action.eq(action));
        }
        if let Some(term) = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
        {
            let pattern: String = format!("%{term}%");
            query = query.filter(
                inventory_history::hardware_name
                    .like(pattern.clone())
                    .or(inventory_history::category_name.like(pattern.clone()))
                    .or(inventory_history::serial_number.like(pattern.clone()))
                    .or(inventory_history::user_name.like(pattern.clone()))
                    .or(inventory_history::details.assume_not_null().like(pattern)),
            );
        }
        if let Some(from) = filter.from.as_deref() {
            query = query.filter(inventory_history::created_at.ge(from));
        }
        if let Some(to) = filter.to.as_deref() {
            query = query.filter(inventory_history::created_at.le(to));
        }

        query
    }};
}

backend_fn! {
/// Lists history entries matching a filter, newest first.
///
/// The returned `total` counts every match, ignoring `limit` and `offset`.
///
/// # Errors
///
/// Returns an error if the database query fails or a stored row is invalid.
pub fn list_history(conn: &mut _, filter: &HistoryFilter) -> Result<HistoryPage, PersistenceError> {
    let total: i64 = filtered_history!(filter, diesel::dsl::count_star()).first(conn)?;

    let mut query = filtered_history!(filter, HistoryRecord::as_select()).order_by((
        inventory_history::created_at.desc(),
        inventory_history::history_id.desc(),
    ));
    if let Some(limit) = filter.limit {
        query = query.limit(limit);
    }
    if let Some(offset) = filter.offset {
        query = query.offset(offset);
    }
    let rows: Vec<HistoryRecord> = query.load(conn)?;

    debug!(total, returned = rows.len(), "Listed history");

    let entries: Vec<HistoryEntry> = rows
        .into_iter()
        .map(entry_from_record)
        .collect::<Result<_, _>>()?;

    Ok(HistoryPage { entries, total })
}
}
