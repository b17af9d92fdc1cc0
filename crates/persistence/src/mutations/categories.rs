// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Category mutations.

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use tracing::info;

use crate::backend::PersistenceBackend;
use crate::diesel_schema::{categories, hardware};
use crate::error::PersistenceError;

backend_fn! {
/// Creates a new category.
///
/// # Errors
///
/// Returns `PersistenceError::UniqueViolation` if a category with the same
/// name (ignoring case) exists.
pub fn create_category(conn: &mut _, name: &str, now: &str) -> Result<i64, PersistenceError> {
    diesel::insert_into(categories::table)
        .values((categories::name.eq(name), categories::created_at.eq(now)))
        .execute(conn)?;

    let category_id: i64 = conn.get_last_insert_rowid()?;

    info!(category_id, name, "Category created");
    Ok(category_id)
}
}

backend_fn! {
/// Renames a category.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the category does not exist, or
/// `PersistenceError::UniqueViolation` if the new name is taken.
pub fn rename_category(conn: &mut _, category_id: i64, name: &str) -> Result<(), PersistenceError> {
    let rows_affected: usize = diesel::update(categories::table)
        .filter(categories::category_id.eq(category_id))
        .set(categories::name.eq(name))
        .execute(conn)?;

    if rows_affected == 0 {
        return Err(PersistenceError::NotFound(format!(
            "Category with ID {category_id} not found"
        )));
    }

    info!(category_id, name, "Category renamed");
    Ok(())
}
}

backend_fn! {
/// Deletes a category that no hardware row references.
///
/// Soft-deleted rows still reference their category, so a category whose
/// items are only in the trash cannot be deleted until they are purged.
///
/// # Errors
///
/// Returns:
/// - `PersistenceError::CategoryInUse` if any hardware row references it
/// - `PersistenceError::NotFound` if the category does not exist
pub fn delete_category(conn: &mut _, category_id: i64) -> Result<(), PersistenceError> {
    use diesel::dsl::count;

    let item_count: i64 = hardware::table
        .filter(hardware::category_id.eq(category_id))
        .select(count(hardware::hardware_id))
        .first(conn)?;

    if item_count > 0 {
        return Err(PersistenceError::CategoryInUse {
            category_id,
            item_count,
        });
    }

    let rows_affected: usize = diesel::delete(categories::table)
        .filter(categories::category_id.eq(category_id))
        .execute(conn)?;

    if rows_affected == 0 {
        return Err(PersistenceError::NotFound(format!(
            "Category with ID {category_id} not found"
        )));
    }

    info!(category_id, "Category deleted");
    Ok(())
}
}
