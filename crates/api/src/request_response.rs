// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.

use pcinv_domain::{Hardware, StatusQuantities};
use pcinv_history::HistoryEntry;
use pcinv_persistence::{CategoryBreakdown, CategoryData, StatusTotals};

// ============================================================================
// Bootstrap & Authentication
// ============================================================================

/// API response describing whether the first admin still has to be created.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BootstrapStatusResponse {
    /// `true` while no user accounts exist.
    pub needs_bootstrap: bool,
}

/// API request to create the first admin account.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CreateFirstAdminRequest {
    /// The login name.
    pub username: String,
    /// The full name shown in history.
    pub full_name: String,
    /// The password.
    pub password: String,
    /// The password confirmation.
    pub password_confirmation: String,
}

/// API request to log in.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LoginRequest {
    /// The login name; case-insensitive.
    pub username: String,
    /// The password.
    pub password: String,
}

/// API response for a successful login.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LoginResponse {
    /// The session token for subsequent requests.
    pub session_token: String,
    /// When the session expires.
    pub expires_at: String,
    /// The logged-in user.
    pub user: UserInfo,
    /// What the user may do.
    pub capabilities: GlobalCapabilities,
}

/// API response describing the current session's user.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct WhoAmIResponse {
    /// The current user.
    pub user: UserInfo,
    /// What the user may do.
    pub capabilities: GlobalCapabilities,
}

/// Generic API response carrying only a message.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MessageResponse {
    /// A human-readable message.
    pub message: String,
}

// ============================================================================
// Capabilities
// ============================================================================

/// A single advisory permission flag. Serialized as a boolean.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// The action is permitted.
    Allowed,
    /// The action is not permitted.
    Denied,
}

impl Capability {
    /// Returns true if the capability is allowed.
    #[must_use]
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allowed)
    }

    /// Creates a capability from a boolean value.
    #[must_use]
    pub const fn from_bool(value: bool) -> Self {
        if value { Self::Allowed } else { Self::Denied }
    }
}

impl serde::Serialize for Capability {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_bool(self.is_allowed())
    }
}

impl<'de> serde::Deserialize<'de> for Capability {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        bool::deserialize(deserializer).map(Self::from_bool)
    }
}

/// Global capabilities for an authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GlobalCapabilities {
    /// Add and edit hardware, move units between statuses.
    pub can_edit_hardware: Capability,
    /// Export hardware and history as CSV.
    pub can_export: Capability,
    /// Create, rename, and delete categories.
    pub can_manage_categories: Capability,
    /// Soft delete, restore, and purge hardware.
    pub can_delete_hardware: Capability,
    /// List soft-deleted hardware.
    pub can_view_deleted: Capability,
    /// Preview and run CSV imports.
    pub can_import_csv: Capability,
    /// Manage user accounts.
    pub can_manage_users: Capability,
    /// Download and restore database backups.
    pub can_backup: Capability,
}

/// Capabilities on one specific user account.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UserCapabilities {
    /// Whether the account's name and role can be edited.
    pub can_edit: Capability,
    /// Whether the account can be deleted.
    pub can_delete: Capability,
    /// Whether the account's password can be reset.
    pub can_reset_password: Capability,
    /// Whether the account's role can be changed.
    pub can_change_role: Capability,
}

// ============================================================================
// Users
// ============================================================================

/// A user account as shown to clients. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UserInfo {
    /// The user's database ID.
    pub user_id: i64,
    /// The normalized login name.
    pub username: String,
    /// The full name.
    pub full_name: String,
    /// `admin` or `staff`.
    pub role: String,
    /// When the account was created.
    pub created_at: String,
    /// When the user last logged in.
    pub last_login_at: Option<String>,
    /// When the user last made a request.
    pub last_activity_at: Option<String>,
    /// Whether the user is currently online.
    pub is_active: bool,
    /// Per-account capabilities, present in user listings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<UserCapabilities>,
}

/// API response listing user accounts.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ListUsersResponse {
    /// The accounts, ordered by username.
    pub users: Vec<UserInfo>,
}

/// API request to create a user account.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CreateUserRequest {
    /// The login name.
    pub username: String,
    /// The full name.
    pub full_name: String,
    /// `admin` or `staff`.
    pub role: String,
    /// The password.
    pub password: String,
    /// The password confirmation.
    pub password_confirmation: String,
}

/// API response for a created user account.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CreateUserResponse {
    /// The new user's database ID.
    pub user_id: i64,
    /// The normalized login name.
    pub username: String,
    /// A success message.
    pub message: String,
}

/// API request to update a user's full name and role.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UpdateUserRequest {
    /// The new full name.
    pub full_name: String,
    /// The new role.
    pub role: String,
}

/// API request for an admin to set another user's password.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ResetPasswordRequest {
    /// The new password.
    pub new_password: String,
    /// The new password confirmation.
    pub new_password_confirmation: String,
}

/// API request for a user to change their own password.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ChangePasswordRequest {
    /// The current password.
    pub current_password: String,
    /// The new password.
    pub new_password: String,
    /// The new password confirmation.
    pub new_password_confirmation: String,
}

// ============================================================================
// Categories
// ============================================================================

/// A category with the number of hardware rows using it.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CategoryInfo {
    /// The category's database ID.
    pub category_id: i64,
    /// The category label.
    pub name: String,
    /// When the category was created.
    pub created_at: String,
    /// Active hardware rows in this category.
    pub item_count: i64,
}

impl From<CategoryData> for CategoryInfo {
    fn from(data: CategoryData) -> Self {
        Self {
            category_id: data.category_id,
            name: data.name,
            created_at: data.created_at,
            item_count: data.item_count,
        }
    }
}

/// API response listing categories.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ListCategoriesResponse {
    /// The categories, ordered by name.
    pub categories: Vec<CategoryInfo>,
}

/// API request to create or rename a category.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CategoryNameRequest {
    /// The category label.
    pub name: String,
}

/// API response for a created or renamed category.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CategoryResponse {
    /// The category's database ID.
    pub category_id: i64,
    /// The stored label.
    pub name: String,
    /// A success message.
    pub message: String,
}

// ============================================================================
// Hardware
// ============================================================================

/// A hardware row as shown to clients.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct HardwareInfo {
    /// The row's database ID.
    pub hardware_id: i64,
    /// The item name.
    pub name: String,
    /// The category's database ID.
    pub category_id: i64,
    /// The category label.
    pub category_name: String,
    /// Free-text type, such as "DDR4".
    pub hardware_type: String,
    /// The manufacturer.
    pub brand: String,
    /// The model designation.
    pub model: String,
    /// The serial number.
    pub serial_number: String,
    /// Units in stock.
    pub unused: u32,
    /// Units deployed.
    pub in_use: u32,
    /// Units broken.
    pub damaged: u32,
    /// Units out for repair.
    pub repair: u32,
    /// Sum of the four status counts.
    pub total_quantity: u64,
    /// Where the units are kept.
    pub location: String,
    /// When the row was created.
    pub created_at: String,
    /// When the row last changed.
    pub updated_at: String,
    /// When the row was soft-deleted, if it was.
    pub deleted_at: Option<String>,
}

impl From<&Hardware> for HardwareInfo {
    fn from(hardware: &Hardware) -> Self {
        Self {
            hardware_id: hardware.id.unwrap_or_default(),
            name: hardware.fields.name.clone(),
            category_id: hardware.category.id,
            category_name: hardware.category.name.clone(),
            hardware_type: hardware.fields.hardware_type.clone(),
            brand: hardware.fields.brand.clone(),
            model: hardware.fields.model.clone(),
            serial_number: hardware.fields.serial_number.clone(),
            unused: hardware.quantities.unused,
            in_use: hardware.quantities.in_use,
            damaged: hardware.quantities.damaged,
            repair: hardware.quantities.repair,
            total_quantity: hardware.total_quantity(),
            location: hardware.fields.location.clone(),
            created_at: hardware.created_at.clone(),
            updated_at: hardware.updated_at.clone(),
            deleted_at: hardware.deleted_at.clone(),
        }
    }
}

/// Query parameters for listing hardware.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ListHardwareQuery {
    /// Substring matched against name, brand, model, serial, type, and location.
    pub search: Option<String>,
    /// Restrict to one category.
    pub category_id: Option<i64>,
    /// Only rows with at least one unit in this status.
    pub status: Option<String>,
    /// `active` (default), `deleted`, or `all`. The last two are admin-only.
    pub scope: Option<String>,
    /// 1-based page number.
    pub page: Option<u32>,
    /// Rows per page.
    pub per_page: Option<u32>,
}

/// API response for a page of hardware rows.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ListHardwareResponse {
    /// The rows on this page.
    pub items: Vec<HardwareInfo>,
    /// Rows matching the filters across all pages.
    pub total: i64,
    /// The page returned.
    pub page: u32,
    /// Rows per page.
    pub per_page: u32,
}

/// API request to create or update a hardware row.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct HardwareRequest {
    /// The item name.
    pub name: String,
    /// The category's database ID.
    pub category_id: i64,
    /// Free-text type.
    #[serde(default)]
    pub hardware_type: String,
    /// The manufacturer.
    #[serde(default)]
    pub brand: String,
    /// The model designation.
    #[serde(default)]
    pub model: String,
    /// The serial number.
    #[serde(default)]
    pub serial_number: String,
    /// Where the units are kept.
    #[serde(default)]
    pub location: String,
    /// Units in stock.
    #[serde(default)]
    pub unused: u32,
    /// Units deployed.
    #[serde(default)]
    pub in_use: u32,
    /// Units broken.
    #[serde(default)]
    pub damaged: u32,
    /// Units out for repair.
    #[serde(default)]
    pub repair: u32,
}

/// API request to move units between statuses on one row.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MoveStatusRequest {
    /// The status units leave.
    pub from: String,
    /// The status units enter.
    pub to: String,
    /// Units to move. Omitted moves every unit in `from`.
    #[serde(default)]
    pub quantity: Option<u32>,
}

/// API request to move units between statuses on several rows at once.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BatchMoveStatusRequest {
    /// The rows to change.
    pub hardware_ids: Vec<i64>,
    /// The status units leave.
    pub from: String,
    /// The status units enter.
    pub to: String,
    /// Units to move on each row. Omitted moves every unit in `from`.
    #[serde(default)]
    pub quantity: Option<u32>,
}

/// API request to soft-delete several rows at once.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BatchDeleteRequest {
    /// The rows to delete.
    pub hardware_ids: Vec<i64>,
}

/// API response for a single-row hardware mutation.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct HardwareMutationResponse {
    /// The row after the change. `None` after a purge.
    pub hardware: Option<HardwareInfo>,
    /// The history row recording the change.
    pub history_id: i64,
    /// A success message.
    pub message: String,
}

/// API response for a batch mutation.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BatchResponse {
    /// Rows changed.
    pub affected: usize,
    /// A success message.
    pub message: String,
}

// ============================================================================
// History
// ============================================================================

/// Query parameters for the history log.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct HistoryQuery {
    /// Restrict to one hardware row.
    pub hardware_id: Option<i64>,
    /// Restrict to one user.
    pub user_id: Option<i64>,
    /// Restrict to one action, such as `status_changed`.
    pub action: Option<String>,
    /// Substring matched against names, serial, and details.
    pub search: Option<String>,
    /// Earliest timestamp or date, inclusive.
    pub from: Option<String>,
    /// Latest timestamp or date, inclusive. A bare date covers the whole day.
    pub to: Option<String>,
    /// 1-based page number.
    pub page: Option<u32>,
    /// Rows per page.
    pub per_page: Option<u32>,
}

/// A history row as shown to clients.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct HistoryEntryInfo {
    /// The history row's database ID.
    pub history_id: i64,
    /// The hardware row, unless it has been purged.
    pub hardware_id: Option<i64>,
    /// The hardware name when the change was made.
    pub hardware_name: String,
    /// The category label when the change was made.
    pub category_name: String,
    /// The serial number when the change was made.
    pub serial_number: String,
    /// The acting user, unless the account has been deleted.
    pub user_id: Option<i64>,
    /// The acting user's name when the change was made.
    pub user_name: String,
    /// What happened.
    pub action: String,
    /// Change in total units.
    pub quantity_change: i64,
    /// Status counts before the change.
    pub before: StatusQuantities,
    /// Status counts after the change.
    pub after: StatusQuantities,
    /// A human-readable description.
    pub details: Option<String>,
    /// When the change was made.
    pub created_at: String,
}

impl From<&HistoryEntry> for HistoryEntryInfo {
    fn from(entry: &HistoryEntry) -> Self {
        Self {
            history_id: entry.id,
            hardware_id: entry.event.hardware.hardware_id,
            hardware_name: entry.event.hardware.hardware_name.clone(),
            category_name: entry.event.hardware.category_name.clone(),
            serial_number: entry.event.hardware.serial_number.clone(),
            user_id: entry.event.actor.user_id,
            user_name: entry.event.actor.user_name.clone(),
            action: entry.event.action.as_str().to_string(),
            quantity_change: entry.quantity_change,
            before: entry.event.before,
            after: entry.event.after,
            details: entry.event.details.clone(),
            created_at: entry.created_at.clone(),
        }
    }
}

/// API response for a page of the history log.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ListHistoryResponse {
    /// The entries on this page, newest first.
    pub entries: Vec<HistoryEntryInfo>,
    /// Entries matching the filters across all pages.
    pub total: i64,
    /// The page returned.
    pub page: u32,
    /// Entries per page.
    pub per_page: u32,
}

// ============================================================================
// Dashboard
// ============================================================================

/// A user who is currently online.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct OnlineUserInfo {
    /// The user's database ID.
    pub user_id: i64,
    /// The login name.
    pub username: String,
    /// The full name.
    pub full_name: String,
    /// `admin` or `staff`.
    pub role: String,
    /// When the current presence period began.
    pub session_started_at: Option<String>,
    /// When the user last made a request.
    pub last_activity_at: Option<String>,
    /// Seconds online in the current presence period.
    pub online_seconds: i64,
    /// `online_seconds` rendered as `"2h 05m"`.
    pub online_for: String,
}

/// API response for the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DashboardResponse {
    /// Active hardware rows.
    pub item_count: u64,
    /// Units per status across all active rows.
    pub totals: StatusTotals,
    /// The same totals per category.
    pub categories: Vec<CategoryBreakdown>,
    /// The most recent history entries.
    pub recent_history: Vec<HistoryEntryInfo>,
    /// Users currently online.
    pub online_users: Vec<OnlineUserInfo>,
}

// ============================================================================
// CSV import & export
// ============================================================================

/// API request carrying an uploaded CSV file.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CsvImportRequest {
    /// The raw CSV text, header row included.
    pub csv_content: String,
}

/// Validation status of a previewed CSV row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum CsvRowStatus {
    /// The row can be imported.
    Valid,
    /// The row has errors and would be skipped.
    Invalid,
}

/// What importing a valid row would do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CsvRowAction {
    /// A new hardware row would be created.
    Create,
    /// The quantities would be added to an existing row.
    Merge,
}

/// Preview of a single CSV row.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CsvPreviewRow {
    /// The 1-based row number, not counting the header.
    pub row_number: usize,
    /// The item name, if present.
    pub name: Option<String>,
    /// The category label, if present.
    pub category: Option<String>,
    /// Whether the row can be imported.
    pub status: CsvRowStatus,
    /// What importing the row would do. `None` for invalid rows.
    pub action: Option<CsvRowAction>,
    /// Validation errors. Empty for valid rows.
    pub errors: Vec<String>,
}

/// API response for a CSV import preview.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CsvPreviewResponse {
    /// Per-row results.
    pub rows: Vec<CsvPreviewRow>,
    /// Data rows in the file.
    pub total_rows: usize,
    /// Rows that can be imported.
    pub valid_count: usize,
    /// Rows with errors.
    pub invalid_count: usize,
}

/// Outcome of importing a single CSV row.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CsvImportOutcome {
    /// A new hardware row was created.
    Created {
        /// The new row.
        hardware_id: i64,
    },
    /// The quantities were added to an existing row.
    Merged {
        /// The existing row.
        hardware_id: i64,
    },
    /// The row was skipped.
    Failed {
        /// Why the row was skipped.
        message: String,
    },
}

/// Result of importing a single CSV row.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CsvImportRowResult {
    /// The 1-based row number, not counting the header.
    pub row_number: usize,
    /// The item name, if present.
    pub name: Option<String>,
    /// What happened.
    #[serde(flatten)]
    pub outcome: CsvImportOutcome,
}

/// API response for a CSV import.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CsvImportResponse {
    /// Per-row results.
    pub rows: Vec<CsvImportRowResult>,
    /// Rows that created new hardware.
    pub created: usize,
    /// Rows merged into existing hardware.
    pub merged: usize,
    /// Rows skipped.
    pub failed: usize,
    /// A summary message.
    pub message: String,
}

/// A generated file ready for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDownload {
    /// The suggested file name.
    pub file_name: String,
    /// The MIME type.
    pub content_type: &'static str,
    /// The file contents.
    pub body: String,
}

// ============================================================================
// Backup & Restore
// ============================================================================

/// API request carrying an uploaded SQL backup.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RestoreBackupRequest {
    /// The raw SQL text.
    pub sql_content: String,
}

/// API response for a completed restore.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RestoreBackupResponse {
    /// Statements executed.
    pub statements_executed: usize,
    /// Rows inserted or deleted.
    pub rows_affected: usize,
    /// A success message.
    pub message: String,
}
