// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Hardware transition persistence.
//!
//! A `TransitionResult` from the core carries the row before and after a
//! command plus the history event describing it. Persisting it writes the
//! hardware row change and appends the history row in the same database
//! transaction.
//!
//! Updates and deletes are guarded: they only match the row if its
//! quantities and deletion state are still what the core saw. A row changed
//! underneath the caller makes the guarded statement touch nothing, which is
//! reported as `PersistenceError::StaleHardware` and rolls the transaction back.

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use num_traits::ToPrimitive;
use pcinv::TransitionResult;
use pcinv_domain::Hardware;
use tracing::{debug, info};

use crate::backend::PersistenceBackend;
use crate::data_models::PersistedTransition;
use crate::diesel_schema::{hardware, inventory_history};
use crate::error::PersistenceError;

fn stored_total(hardware: &Hardware) -> Result<i64, PersistenceError> {
    hardware.total_quantity().to_i64().ok_or_else(|| {
        PersistenceError::Other(format!(
            "Total quantity of '{}' does not fit in a database column",
            hardware.fields.name
        ))
    })
}

fn require_id(hardware: &Hardware) -> Result<i64, PersistenceError> {
    hardware.id.ok_or_else(|| {
        PersistenceError::Other(format!(
            "Hardware '{}' has no ID; only a create may target an unsaved row",
            hardware.fields.name
        ))
    })
}

backend_fn! {
/// Writes one transition without opening a transaction.
///
/// # Errors
///
/// Returns `PersistenceError::StaleHardware` if a guarded statement matched
/// no row, or another error if a statement fails.
#[allow(clippy::too_many_lines)]
pub fn persist_one(
    conn: &mut _,
    result: &TransitionResult,
    now: &str,
) -> Result<PersistedTransition, PersistenceError> {
    let hardware_id: Option<i64> = match (&result.before, &result.after) {
        (None, Some(after)) => {
            diesel::insert_into(hardware::table)
                .values((
                    hardware::name.eq(&after.fields.name),
                    hardware::category_id.eq(after.category.id),
                    hardware::hardware_type.eq(&after.fields.hardware_type),
                    hardware::brand.eq(&after.fields.brand),
                    hardware::model.eq(&after.fields.model),
                    hardware::serial_number.eq(&after.fields.serial_number),
                    hardware::unused.eq(i64::from(after.quantities.unused)),
                    hardware::in_use.eq(i64::from(after.quantities.in_use)),
                    hardware::damaged.eq(i64::from(after.quantities.damaged)),
                    hardware::repair.eq(i64::from(after.quantities.repair)),
                    hardware::total_quantity.eq(stored_total(after)?),
                    hardware::location.eq(&after.fields.location),
                    hardware::created_at.eq(&after.created_at),
                    hardware::updated_at.eq(&after.updated_at),
                    hardware::deleted_at.eq(after.deleted_at.as_deref()),
                ))
                .execute(conn)?;

            let hardware_id: i64 = conn.get_last_insert_rowid()?;
            debug!(hardware_id, "Inserted hardware");
            Some(hardware_id)
        }
        (Some(before), Some(after)) => {
            let hardware_id: i64 = require_id(before)?;

            let rows_affected: usize = diesel::update(hardware::table)
                .filter(hardware::hardware_id.eq(hardware_id))
                .filter(hardware::unused.eq(i64::from(before.quantities.unused)))
                .filter(hardware::in_use.eq(i64::from(before.quantities.in_use)))
                .filter(hardware::damaged.eq(i64::from(before.quantities.damaged)))
                .filter(hardware::repair.eq(i64::from(before.quantities.repair)))
                .filter(hardware::deleted_at.is_not_null().eq(before.is_deleted()))
                .set((
                    hardware::name.eq(&after.fields.name),
                    hardware::category_id.eq(after.category.id),
                    hardware::hardware_type.eq(&after.fields.hardware_type),
                    hardware::brand.eq(&after.fields.brand),
                    hardware::model.eq(&after.fields.model),
                    hardware::serial_number.eq(&after.fields.serial_number),
                    hardware::unused.eq(i64::from(after.quantities.unused)),
                    hardware::in_use.eq(i64::from(after.quantities.in_use)),
                    hardware::damaged.eq(i64::from(after.quantities.damaged)),
                    hardware::repair.eq(i64::from(after.quantities.repair)),
                    hardware::total_quantity.eq(stored_total(after)?),
                    hardware::location.eq(&after.fields.location),
                    hardware::updated_at.eq(&after.updated_at),
                    hardware::deleted_at.eq(after.deleted_at.as_deref()),
                ))
                .execute(conn)?;

            if rows_affected == 0 {
                return Err(PersistenceError::StaleHardware { hardware_id });
            }
            debug!(hardware_id, "Updated hardware");
            Some(hardware_id)
        }
        (Some(before), None) => {
            let hardware_id: i64 = require_id(before)?;

            let rows_affected: usize = diesel::delete(hardware::table)
                .filter(hardware::hardware_id.eq(hardware_id))
                .filter(hardware::deleted_at.is_not_null())
                .execute(conn)?;

            if rows_affected == 0 {
                return Err(PersistenceError::StaleHardware { hardware_id });
            }
            debug!(hardware_id, "Purged hardware");
            None
        }
        (None, None) => {
            return Err(PersistenceError::Other(
                "Transition has neither a before nor an after row".to_string(),
            ));
        }
    };

    let event = &result.event;
    let history_hardware_id: Option<i64> = if result.before.is_none() {
        hardware_id
    } else {
        event.hardware.hardware_id
    };

    diesel::insert_into(inventory_history::table)
        .values((
            inventory_history::hardware_id.eq(history_hardware_id),
            inventory_history::hardware_name.eq(&event.hardware.hardware_name),
            inventory_history::category_name.eq(&event.hardware.category_name),
            inventory_history::serial_number.eq(&event.hardware.serial_number),
            inventory_history::user_id.eq(event.actor.user_id),
            inventory_history::user_name.eq(&event.actor.user_name),
            inventory_history::action.eq(event.action.as_str()),
            inventory_history::quantity_change.eq(event.quantity_change()),
            inventory_history::unused_before.eq(i64::from(event.before.unused)),
            inventory_history::in_use_before.eq(i64::from(event.before.in_use)),
            inventory_history::damaged_before.eq(i64::from(event.before.damaged)),
            inventory_history::repair_before.eq(i64::from(event.before.repair)),
            inventory_history::unused_after.eq(i64::from(event.after.unused)),
            inventory_history::in_use_after.eq(i64::from(event.after.in_use)),
            inventory_history::damaged_after.eq(i64::from(event.after.damaged)),
            inventory_history::repair_after.eq(i64::from(event.after.repair)),
            inventory_history::details.eq(event.details.as_deref()),
            inventory_history::created_at.eq(now),
        ))
        .execute(conn)?;

    let history_id: i64 = conn.get_last_insert_rowid()?;

    info!(
        history_id,
        hardware_id = ?history_hardware_id,
        action = event.action.as_str(),
        quantity_change = event.quantity_change(),
        "Persisted hardware transition"
    );

    Ok(PersistedTransition {
        hardware_id,
        history_id,
    })
}
}

/// Persists a single transition atomically (`SQLite` version).
///
/// # Errors
///
/// Returns an error if persistence fails. Nothing is written in that case.
pub fn persist_transition_sqlite(
    conn: &mut SqliteConnection,
    result: &TransitionResult,
    now: &str,
) -> Result<PersistedTransition, PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| persist_one_sqlite(conn, result, now))
}

/// Persists a single transition atomically (`MySQL` version).
///
/// # Errors
///
/// Returns an error if persistence fails. Nothing is written in that case.
pub fn persist_transition_mysql(
    conn: &mut MysqlConnection,
    result: &TransitionResult,
    now: &str,
) -> Result<PersistedTransition, PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| persist_one_mysql(conn, result, now))
}

/// Persists a batch of transitions in one transaction (`SQLite` version).
///
/// Either every transition is written or none is.
///
/// # Errors
///
/// Returns the first error encountered; the whole batch is rolled back.
pub fn persist_transitions_sqlite(
    conn: &mut SqliteConnection,
    results: &[TransitionResult],
    now: &str,
) -> Result<Vec<PersistedTransition>, PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        let persisted: Vec<PersistedTransition> = results
            .iter()
            .map(|result| persist_one_sqlite(conn, result, now))
            .collect::<Result<_, _>>()?;
        info!(count = persisted.len(), "Persisted transition batch");
        Ok(persisted)
    })
}

/// Persists a batch of transitions in one transaction (`MySQL` version).
///
/// Either every transition is written or none is.
///
/// # Errors
///
/// Returns the first error encountered; the whole batch is rolled back.
pub fn persist_transitions_mysql(
    conn: &mut MysqlConnection,
    results: &[TransitionResult],
    now: &str,
) -> Result<Vec<PersistedTransition>, PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        let persisted: Vec<PersistedTransition> = results
            .iter()
            .map(|result| persist_one_mysql(conn, result, now))
            .collect::<Result<_, _>>()?;
        info!(count = persisted.len(), "Persisted transition batch");
        Ok(persisted)
    })
}
