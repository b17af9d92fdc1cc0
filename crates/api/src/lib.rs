// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Application layer for the PC hardware inventory.
//!
//! This crate sits between the HTTP server and persistence. It owns
//! authentication, authorization, input validation, CSV import and export,
//! and SQL backup handling. Handlers take a `Persistence` and an
//! authenticated actor and return plain response types.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

mod auth;
mod backup;
mod capabilities;
mod csv_io;
mod error;
mod handlers;
mod password_policy;
mod presence;
mod request_response;

#[cfg(test)]
mod tests;

pub use auth::{
    AuthenticatedActor, AuthenticationService, AuthorizationService, INVALID_CREDENTIALS,
    LoginOutcome,
};
pub use backup::{
    BACKUP_HEADER, BackupValidationError, DATA_TABLES, FORBIDDEN_KEYWORDS, create_backup,
    quote_literal, validate_backup,
};
pub use capabilities::{compute_global_capabilities, compute_user_capabilities};
pub use csv_io::{
    CSV_COLUMNS, CsvFieldError, CsvHardwareRow, HISTORY_CSV_COLUMNS, ParsedCsvRow,
    export_hardware_csv, export_history_csv, import_csv, parse_hardware_csv, preview_csv_import,
};
pub use error::{
    ApiError, AuthError, translate_core_error, translate_domain_error, translate_persistence_error,
};
pub use handlers::{
    DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, RECENT_HISTORY_LIMIT, batch_move_status, batch_soft_delete,
    change_password, create_category, create_first_admin, create_hardware, create_user,
    delete_category, delete_user, download_backup, export_hardware, export_history,
    get_bootstrap_status, get_category, get_dashboard, get_hardware, import_hardware,
    list_categories, list_hardware, list_history, list_users, login, logout,
    move_hardware_status, preview_import, purge_hardware, rename_category, reset_password,
    restore_backup, restore_hardware, soft_delete_hardware, update_hardware, update_user, whoami,
};
pub use password_policy::{PasswordPolicy, PasswordPolicyError};
pub use presence::{SweepResult, online_users, sweep_presence};
pub use request_response::{
    BatchDeleteRequest, BatchMoveStatusRequest, BatchResponse, BootstrapStatusResponse,
    Capability, CategoryInfo, CategoryNameRequest, CategoryResponse, ChangePasswordRequest,
    CreateFirstAdminRequest, CreateUserRequest, CreateUserResponse, CsvImportOutcome,
    CsvImportRequest, CsvImportResponse, CsvImportRowResult, CsvPreviewResponse, CsvPreviewRow,
    CsvRowAction, CsvRowStatus, DashboardResponse, FileDownload, GlobalCapabilities,
    HardwareInfo, HardwareMutationResponse, HardwareRequest, HistoryEntryInfo, HistoryQuery,
    ListCategoriesResponse, ListHardwareQuery, ListHardwareResponse, ListHistoryResponse,
    ListUsersResponse, LoginRequest, LoginResponse, MessageResponse, MoveStatusRequest,
    OnlineUserInfo, ResetPasswordRequest, RestoreBackupRequest, RestoreBackupResponse,
    UpdateUserRequest, UserCapabilities, UserInfo, WhoAmIResponse,
};
