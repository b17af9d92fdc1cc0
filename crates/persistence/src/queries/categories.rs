// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Category queries.

use std::collections::HashMap;

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use pcinv_domain::fold_case;
use tracing::debug;

use crate::data_models::{CategoryData, CategoryRecord};
use crate::diesel_schema::{categories, hardware};
use crate::error::PersistenceError;

backend_fn! {
/// Retrieves a category by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the category is not found.
pub fn get_category_by_id(
    conn: &mut _,
    category_id: i64,
) -> Result<Option<CategoryRecord>, PersistenceError> {
    let result: Result<CategoryRecord, diesel::result::Error> = categories::table
        .filter(categories::category_id.eq(category_id))
        .select(CategoryRecord::as_select())
        .first(conn);

    match result {
        Ok(row) => Ok(Some(row)),
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(PersistenceError::from(e)),
    }
}
}

backend_fn! {
/// Retrieves a category by name, ignoring case.
///
/// Names are compared with [`fold_case`] so non-ASCII letters fold the same
/// way on both backends.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if no category has this name.
pub fn get_category_by_name(
    conn: &mut _,
    name: &str,
) -> Result<Option<CategoryRecord>, PersistenceError> {
    debug!(name, "Looking up category by name");

    let wanted: String = fold_case(name);
    let rows: Vec<CategoryRecord> = categories::table
        .select(CategoryRecord::as_select())
        .order_by(categories::category_id.asc())
        .load(conn)?;

    Ok(rows.into_iter().find(|row| fold_case(&row.name) == wanted))
}
}

backend_fn! {
/// Lists all categories ordered by name, each with its active hardware count.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_categories(conn: &mut _) -> Result<Vec<CategoryData>, PersistenceError> {
    let rows: Vec<CategoryRecord> = categories::table
        .select(CategoryRecord::as_select())
        .order_by((categories::name.asc(), categories::category_id.asc()))
        .load(conn)?;

    let counts: HashMap<i64, i64> = hardware::table
        .filter(hardware::deleted_at.is_null())
        .group_by(hardware::category_id)
        .select((hardware::category_id, diesel::dsl::count(hardware::hardware_id)))
        .load::<(i64, i64)>(conn)?
        .into_iter()
        .collect();

    debug!(count = rows.len(), "Listed categories");

    Ok(rows
        .into_iter()
        .map(|row| CategoryData {
            item_count: counts.get(&row.category_id).copied().unwrap_or(0),
            category_id: row.category_id,
            name: row.name,
            created_at: row.created_at,
        })
        .collect())
}
}
