// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Full-table reads for SQL backups.

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use tracing::info;

use crate::data_models::{
    BackupSnapshot, CategoryRecord, HardwareRecord, HistoryRecord, UserRecord,
};
use crate::diesel_schema::{categories, hardware, inventory_history, users};
use crate::error::PersistenceError;

backend_fn! {
/// Loads every row of the four data tables, each ordered by primary key.
///
/// Soft-deleted hardware is included. Sessions are not.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn export_snapshot(conn: &mut _) -> Result<BackupSnapshot, PersistenceError> {
    let users: Vec<UserRecord> = users::table
        .select(UserRecord::as_select())
        .order_by(users::user_id.asc())
        .load(conn)?;
    let categories: Vec<CategoryRecord> = categories::table
        .select(CategoryRecord::as_select())
        .order_by(categories::category_id.asc())
        .load(conn)?;
    let hardware: Vec<HardwareRecord> = hardware::table
        .select(HardwareRecord::as_select())
        .order_by(hardware::hardware_id.asc())
        .load(conn)?;
    let history: Vec<HistoryRecord> = inventory_history::table
        .select(HistoryRecord::as_select())
        .order_by(inventory_history::history_id.asc())
        .load(conn)?;

    info!(
        users = users.len(),
        categories = categories.len(),
        hardware = hardware.len(),
        history = history.len(),
        "Exported backup snapshot"
    );

    Ok(BackupSnapshot {
        users,
        categories,
        hardware,
        history,
    })
}
}
