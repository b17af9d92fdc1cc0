// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::prelude::*;
use pcinv_domain::{Hardware, HardwareStatus};
use pcinv_history::HistoryEntry;
use serde::{Deserialize, Serialize};

use crate::diesel_schema::{categories, hardware, inventory_history, users};

/// Stored representation of a user account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserData {
    pub user_id: i64,
    pub username: String,
    pub full_name: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: String,
    pub last_login_at: Option<String>,
    pub last_activity_at: Option<String>,
    /// Presence flag; set on login and activity, cleared on logout or idle sweep.
    pub is_active: bool,
    pub session_started_at: Option<String>,
}

/// Stored representation of a login session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionData {
    pub session_id: i64,
    pub session_token: String,
    pub user_id: i64,
    pub created_at: String,
    pub last_activity_at: String,
    pub expires_at: String,
}

/// A category with the number of active hardware rows using it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryData {
    pub category_id: i64,
    pub name: String,
    pub created_at: String,
    pub item_count: i64,
}

/// Which rows a hardware listing covers with respect to soft deletion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeletionScope {
    /// Only rows that are not soft-deleted.
    #[default]
    Active,
    /// Only soft-deleted rows.
    Deleted,
    /// Every row.
    All,
}

/// Filters for hardware listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HardwareFilter {
    /// Matched against name, type, brand, model, serial number, and location.
    pub search: Option<String>,
    pub category_id: Option<i64>,
    /// Only rows with at least one unit in this status.
    pub status: Option<HardwareStatus>,
    pub scope: DeletionScope,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// One page of hardware rows plus the unpaged match count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HardwarePage {
    pub items: Vec<Hardware>,
    pub total: i64,
}

/// Filters for the history log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryFilter {
    pub hardware_id: Option<i64>,
    pub user_id: Option<i64>,
    pub action: Option<String>,
    /// Matched against hardware name, category, serial number, user name, and details.
    pub search: Option<String>,
    /// Inclusive lower bound, as a stored timestamp.
    pub from: Option<String>,
    /// Inclusive upper bound, as a stored timestamp.
    pub to: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// One page of history entries plus the unpaged match count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryPage {
    pub entries: Vec<HistoryEntry>,
    pub total: i64,
}

/// Unit sums per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusTotals {
    pub unused: u64,
    pub in_use: u64,
    pub damaged: u64,
    pub repair: u64,
    pub total: u64,
}

/// Per-category dashboard line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryBreakdown {
    pub category_id: i64,
    pub name: String,
    pub item_count: u64,
    pub totals: StatusTotals,
}

/// Aggregated inventory figures over active hardware.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub item_count: u64,
    pub totals: StatusTotals,
    pub categories: Vec<CategoryBreakdown>,
}

/// Raw `users` row.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable)]
#[diesel(table_name = users)]
pub struct UserRecord {
    pub user_id: i64,
    pub username: String,
    pub password_hash: String,
    pub full_name: String,
    pub role: String,
    pub created_at: String,
    pub last_login_at: Option<String>,
    pub last_activity_at: Option<String>,
    pub is_active: i32,
    pub session_started_at: Option<String>,
}

/// Raw `categories` row.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable)]
#[diesel(table_name = categories)]
pub struct CategoryRecord {
    pub category_id: i64,
    pub name: String,
    pub created_at: String,
}

/// Raw `hardware` row.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable)]
#[diesel(table_name = hardware)]
pub struct HardwareRecord {
    pub hardware_id: i64,
    pub name: String,
    pub category_id: i64,
    pub hardware_type: String,
    pub brand: String,
    pub model: String,
    pub serial_number: String,
    pub unused: i64,
    pub in_use: i64,
    pub damaged: i64,
    pub repair: i64,
    pub total_quantity: i64,
    pub location: String,
    pub created_at: String,
    pub updated_at: String,
    pub deleted_at: Option<String>,
}

/// Raw `inventory_history` row.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable)]
#[diesel(table_name = inventory_history)]
pub struct HistoryRecord {
    pub history_id: i64,
    pub hardware_id: Option<i64>,
    pub hardware_name: String,
    pub category_name: String,
    pub serial_number: String,
    pub user_id: Option<i64>,
    pub user_name: String,
    pub action: String,
    pub quantity_change: i64,
    pub unused_before: i64,
    pub in_use_before: i64,
    pub damaged_before: i64,
    pub repair_before: i64,
    pub unused_after: i64,
    pub in_use_after: i64,
    pub damaged_after: i64,
    pub repair_after: i64,
    pub details: Option<String>,
    pub created_at: String,
}

/// Every data table, in dependency order. Sessions are not included.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackupSnapshot {
    pub users: Vec<UserRecord>,
    pub categories: Vec<CategoryRecord>,
    pub hardware: Vec<HardwareRecord>,
    pub history: Vec<HistoryRecord>,
}

/// IDs assigned when a transition is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistedTransition {
    /// The hardware row ID. `None` after a purge.
    pub hardware_id: Option<i64>,
    pub history_id: i64,
}
