// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Dashboard aggregation.
//!
//! Per-status sums are computed in Rust rather than with SQL `SUM`, whose
//! result type differs between `SQLite` and `MySQL`.

use std::collections::BTreeMap;

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use num_traits::ToPrimitive;

use crate::data_models::{CategoryBreakdown, CategoryData, DashboardSummary, StatusTotals};
use crate::diesel_schema::hardware;
use crate::error::PersistenceError;

/// Quantities of one active hardware row, keyed by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Queryable)]
pub struct DashboardRow {
    pub category_id: i64,
    pub unused: i64,
    pub in_use: i64,
    pub damaged: i64,
    pub repair: i64,
}

backend_fn! {
/// Loads the quantities of every active hardware row.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn dashboard_rows(conn: &mut _) -> Result<Vec<DashboardRow>, PersistenceError> {
    let rows: Vec<DashboardRow> = hardware::table
        .filter(hardware::deleted_at.is_null())
        .select((
            hardware::category_id,
            hardware::unused,
            hardware::in_use,
            hardware::damaged,
            hardware::repair,
        ))
        .load(conn)?;

    Ok(rows)
}
}

fn to_count(value: i64) -> Result<u64, PersistenceError> {
    value
        .to_u64()
        .ok_or_else(|| PersistenceError::InvalidStoredValue(format!("negative quantity {value}")))
}

impl StatusTotals {
    fn add_row(&mut self, row: &DashboardRow) -> Result<(), PersistenceError> {
        let unused: u64 = to_count(row.unused)?;
        let in_use: u64 = to_count(row.in_use)?;
        let damaged: u64 = to_count(row.damaged)?;
        let repair: u64 = to_count(row.repair)?;

        self.unused += unused;
        self.in_use += in_use;
        self.damaged += damaged;
        self.repair += repair;
        self.total += unused + in_use + damaged + repair;
        Ok(())
    }
}

/// Folds active hardware rows into overall and per-category totals.
///
/// Every category appears in the breakdown, including empty ones, in the
/// order given.
///
/// # Errors
///
/// Returns `PersistenceError::InvalidStoredValue` if a stored quantity is negative.
pub fn build_dashboard_summary(
    categories: &[CategoryData],
    rows: &[DashboardRow],
) -> Result<DashboardSummary, PersistenceError> {
    let mut per_category: BTreeMap<i64, (u64, StatusTotals)> = BTreeMap::new();
    let mut totals: StatusTotals = StatusTotals::default();

    for row in rows {
        totals.add_row(row)?;
        let entry = per_category.entry(row.category_id).or_default();
        entry.0 += 1;
        entry.1.add_row(row)?;
    }

    let breakdown: Vec<CategoryBreakdown> = categories
        .iter()
        .map(|category| {
            let (item_count, category_totals) = per_category
                .get(&category.category_id)
                .copied()
                .unwrap_or_default();
            CategoryBreakdown {
                category_id: category.category_id,
                name: category.name.clone(),
                item_count,
                totals: category_totals,
            }
        })
        .collect();

    Ok(DashboardSummary {
        item_count: rows.len().to_u64().unwrap_or(u64::MAX),
        totals,
        categories: breakdown,
    })
}
