// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Hardware queries.
//!
//! Every hardware load joins `categories` so that rows come back as complete
//! domain `Hardware` values carrying their category name.

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use pcinv_domain::{
    CategoryRef, Hardware, HardwareFields, HardwareStatus, StatusQuantities, fold_case,
};
use tracing::debug;

use crate::data_models::{DeletionScope, HardwareFilter, HardwarePage, HardwareRecord};
use crate::diesel_schema::{categories, hardware};
use crate::error::PersistenceError;

/// Converts a stored row into a domain value.
///
/// # Errors
///
/// Returns `PersistenceError::InvalidStoredValue` if a stored quantity is
/// negative or out of range.
pub fn hardware_from_record(
    record: HardwareRecord,
    category_name: &str,
) -> Result<Hardware, PersistenceError> {
    let quantities: StatusQuantities = StatusQuantities::from_signed(
        record.unused,
        record.in_use,
        record.damaged,
        record.repair,
    )
    .map_err(|e| {
        PersistenceError::InvalidStoredValue(format!("hardware {}: {e}", record.hardware_id))
    })?;

    Ok(Hardware {
        id: Some(record.hardware_id),
        category: CategoryRef::new(record.category_id, category_name),
        fields: HardwareFields {
            name: record.name,
            hardware_type: record.hardware_type,
            brand: record.brand,
            model: record.model,
            serial_number: record.serial_number,
            location: record.location,
        },
        quantities,
        created_at: record.created_at,
        updated_at: record.updated_at,
        deleted_at: record.deleted_at,
    })
}

fn hardware_from_rows(
    rows: Vec<(HardwareRecord, String)>,
) -> Result<Vec<Hardware>, PersistenceError> {
    rows.into_iter()
        .map(|(record, category_name)| hardware_from_record(record, &category_name))
        .collect()
}

/// Builds a boxed hardware/category join with `filter` applied.
///
/// The same filter has to drive both the page load and the unpaged count,
/// and boxed queries cannot be cloned, so this expands once per use.
macro_rules! filtered_hardware {
    ($filter:expr, $selection:expr) => {{
        let filter: &HardwareFilter = $filter;
        let mut query = hardware::table
            .inner_join(categories::table)
            .select($selection)
            .into_boxed();

        if let Some(term) = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
        {
            let pattern: String = format!("%{term}%");
            query = query.filter(
                hardware::name
                    .like(pattern.clone())
                    .or(hardware::hardware_type.like(pattern.clone()))
                    .or(hardware::brand.like(pattern.clone()))
                    .or(hardware::model.like(pattern.clone()))
                    .or(hardware::serial_number.like(pattern.clone()))
                    .or(hardware::location.like(pattern)),
            );
        }

        if let Some(category_id) = filter.category_id {
            query = query.filter(hardware::category_id.eq(category_id));
        }

        if let Some(status) = filter.status {
            query = match status {
                HardwareStatus::Unused => query.filter(hardware::unused.gt(0)),
                HardwareStatus::InUse => query.filter(hardware::in_use.gt(0)),
                HardwareStatus::Damaged => query.filter(hardware::damaged.gt(0)),
                HardwareStatus::Repair => query.filter(hardware::repair.gt(0)),
            };
        }

        query = match filter.scope {
            DeletionScope::Active => query.filter(hardware::deleted_at.is_null()),
            DeletionScope::Deleted => query.filter(hardware::deleted_at.is_not_null()),
            DeletionScope::All => query,
        };

        query
    }};
}

backend_fn! {
/// Retrieves a hardware row by ID, whether or not it is soft-deleted.
///
/// # Errors
///
/// Returns an error if the database query fails or the stored row is invalid.
/// Returns `Ok(None)` if the row does not exist.
pub fn get_hardware(conn: &mut _, hardware_id: i64) -> Result<Option<Hardware>, PersistenceError> {
    debug!(hardware_id, "Loading hardware");

    let result: Result<(HardwareRecord, String), diesel::result::Error> = hardware::table
        .inner_join(categories::table)
        .filter(hardware::hardware_id.eq(hardware_id))
        .select((HardwareRecord::as_select(), categories::name))
        .first(conn);

    match result {
        Ok((record, category_name)) => Ok(Some(hardware_from_record(record, &category_name)?)),
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(PersistenceError::from(e)),
    }
}
}

backend_fn! {
/// Retrieves several hardware rows by ID, ordered by ID.
///
/// IDs that do not exist are skipped.
///
/// # Errors
///
/// Returns an error if the database query fails or a stored row is invalid.
pub fn get_hardware_many(
    conn: &mut _,
    hardware_ids: &[i64],
) -> Result<Vec<Hardware>, PersistenceError> {
    let rows: Vec<(HardwareRecord, String)> = hardware::table
        .inner_join(categories::table)
        .filter(hardware::hardware_id.eq_any(hardware_ids))
        .select((HardwareRecord::as_select(), categories::name))
        .order_by(hardware::hardware_id.asc())
        .load(conn)?;

    hardware_from_rows(rows)
}
}

backend_fn! {
/// Lists hardware matching a filter, ordered by name.
///
/// The returned `total` counts every match, ignoring `limit` and `offset`.
///
/// # Errors
///
/// Returns an error if the database query fails or a stored row is invalid.
pub fn list_hardware(
    conn: &mut _,
    filter: &HardwareFilter,
) -> Result<HardwarePage, PersistenceError> {
    let total: i64 = filtered_hardware!(filter, diesel::dsl::count_star()).first(conn)?;

    let mut query = filtered_hardware!(filter, (HardwareRecord::as_select(), categories::name))
        .order_by((hardware::name.asc(), hardware::hardware_id.asc()));
    if let Some(limit) = filter.limit {
        query = query.limit(limit);
    }
    if let Some(offset) = filter.offset {
        query = query.offset(offset);
    }
    let rows: Vec<(HardwareRecord, String)> = query.load(conn)?;

    debug!(total, returned = rows.len(), "Listed hardware");

    Ok(HardwarePage {
        items: hardware_from_rows(rows)?,
        total,
    })
}
}

backend_fn! {
/// Lists every active hardware row, ordered by category then name.
///
/// # Errors
///
/// Returns an error if the database query fails or a stored row is invalid.
pub fn list_active_hardware(conn: &mut _) -> Result<Vec<Hardware>, PersistenceError> {
    let rows: Vec<(HardwareRecord, String)> = hardware::table
        .inner_join(categories::table)
        .filter(hardware::deleted_at.is_null())
        .select((HardwareRecord::as_select(), categories::name))
        .order_by((
            categories::name.asc(),
            hardware::name.asc(),
            hardware::hardware_id.asc(),
        ))
        .load(conn)?;

    hardware_from_rows(rows)
}
}

backend_fn! {
/// Finds the active row a CSV import row would duplicate.
///
/// Two rows are duplicates when category, name, serial number, and brand
/// match, ignoring case. Case is folded with [`fold_case`] rather than by the
/// column collation, since `SQLite` `NOCASE` only folds ASCII. If several rows
/// match, the oldest wins.
///
/// # Errors
///
/// Returns an error if the database query fails or the stored row is invalid.
pub fn find_import_duplicate(
    conn: &mut _,
    category_id: i64,
    name: &str,
    serial_number: &str,
    brand: &str,
) -> Result<Option<Hardware>, PersistenceError> {
    let key: (String, String, String) =
        (fold_case(name), fold_case(serial_number), fold_case(brand));

    let candidates: Vec<(HardwareRecord, String)> = hardware::table
        .inner_join(categories::table)
        .filter(hardware::deleted_at.is_null())
        .filter(hardware::category_id.eq(category_id))
        .select((HardwareRecord::as_select(), categories::name))
        .order_by(hardware::hardware_id.asc())
        .load(conn)?;

    candidates
        .into_iter()
        .find(|(record, _)| {
            (
                fold_case(&record.name),
                fold_case(&record.serial_number),
                fold_case(&record.brand),
            ) == key
        })
        .map(|(record, category_name)| hardware_from_record(record, &category_name))
        .transpose()
}
}
