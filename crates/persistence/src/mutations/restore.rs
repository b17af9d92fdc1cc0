// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! SQL backup restore.
//!
//! Statements reach this module only after the API layer has validated the
//! backup. This module runs them verbatim, so it must never be handed
//! unvalidated input.

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use tracing::{debug, info};

use crate::error::PersistenceError;

backend_fn! {
/// Executes validated restore statements in a single transaction.
///
/// # Returns
///
/// The total number of rows affected.
///
/// # Errors
///
/// Returns an error if any statement fails; nothing is applied in that case.
pub fn execute_restore(conn: &mut _, statements: &[String]) -> Result<usize, PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        let mut rows_affected: usize = 0;
        for (index, statement) in statements.iter().enumerate() {
            let affected: usize = diesel::sql_query(statement.as_str())
                .execute(conn)
                .map_err(|e| {
                    PersistenceError::QueryFailed(format!("Restore statement {}: {e}", index + 1))
                })?;
            debug!(index, affected, "Executed restore statement");
            rows_affected += affected;
        }

        info!(
            statements = statements.len(),
            rows_affected, "Restored database from backup"
        );
        Ok(rows_affected)
    })
}
}
