// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Request handlers.
//!
//! Each handler authorizes the actor, validates the request, runs queries,
//! applies pure transitions, and persists the results. Handlers never touch
//! HTTP; the server maps their results onto responses.

use std::collections::HashSet;
use std::str::FromStr;

use pcinv::{Command, TransitionResult, apply};
use pcinv_domain::{
    CategoryRef, Hardware, HardwareFields, HardwareStatus, Role, StatusQuantities,
    now_timestamp, parse_timestamp, validate_category_name, validate_full_name,
    validate_username,
};
use pcinv_history::{HistoryAction, HistoryEntry};
use pcinv_persistence::{
    BackupSnapshot, CategoryData, CategoryRecord, DashboardSummary, DeletionScope, HardwareFilter,
    HardwarePage, HistoryFilter, HistoryPage, PersistedTransition, Persistence, PersistenceError,
    UserData,
};
use time::Duration;
use time::macros::format_description;
use tracing::{info, warn};

use crate::auth::{AuthenticatedActor, AuthenticationService, AuthorizationService, LoginOutcome};
use crate::backup::{create_backup, validate_backup};
use crate::capabilities::{compute_global_capabilities, compute_user_capabilities};
use crate::csv_io::{export_hardware_csv, export_history_csv, import_csv, preview_csv_import};
use crate::error::{
    ApiError, translate_core_error, translate_domain_error, translate_persistence_error,
};
use crate::password_policy::PasswordPolicy;
use crate::presence::online_users;
use crate::request_response::{
    BatchDeleteRequest, BatchMoveStatusRequest, BatchResponse, BootstrapStatusResponse,
    CategoryInfo, CategoryNameRequest, CategoryResponse, ChangePasswordRequest,
    CreateFirstAdminRequest, CreateUserRequest, CreateUserResponse, CsvImportRequest,
    CsvImportResponse, CsvPreviewResponse, DashboardResponse, FileDownload, HardwareInfo,
    HardwareMutationResponse, HardwareRequest, HistoryEntryInfo, HistoryQuery,
    ListCategoriesResponse, ListHardwareQuery, ListHardwareResponse, ListHistoryResponse,
    ListUsersResponse, LoginRequest, LoginResponse, MessageResponse, MoveStatusRequest,
    ResetPasswordRequest, RestoreBackupRequest, RestoreBackupResponse, UpdateUserRequest,
    UserCapabilities, UserInfo, WhoAmIResponse,
};

/// Rows per page when the client does not ask.
pub const DEFAULT_PAGE_SIZE: u32 = 25;
/// The largest page a client may request.
pub const MAX_PAGE_SIZE: u32 = 200;
/// History entries shown on the dashboard.
pub const RECENT_HISTORY_LIMIT: i64 = 10;

// ========================================================================
// Shared helpers
// ========================================================================

fn current_timestamp() -> Result<String, ApiError> {
    now_timestamp().map_err(translate_domain_error)
}

/// Resolves 1-based paging parameters into `(page, per_page, limit, offset)`.
fn page_window(page: Option<u32>, per_page: Option<u32>) -> (u32, u32, i64, i64) {
    let page: u32 = page.unwrap_or(1).max(1);
    let per_page: u32 = per_page
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    let offset: i64 = i64::from(page - 1) * i64::from(per_page);
    (page, per_page, i64::from(per_page), offset)
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_role(value: &str) -> Result<Role, ApiError> {
    Role::from_str(value).map_err(translate_domain_error)
}

fn parse_status(field: &str, value: &str) -> Result<HardwareStatus, ApiError> {
    HardwareStatus::from_str(value).map_err(|e| ApiError::InvalidInput {
        field: field.to_string(),
        message: e.to_string(),
    })
}

/// Builds `<prefix>_<YYYYMMDD>_<HHMMSS>.<extension>` from a stored timestamp.
fn download_name(prefix: &str, extension: &str, now: &str) -> String {
    let digits: String = now.chars().filter(char::is_ascii_digit).collect();
    let (date, clock) = digits.split_at(digits.len().min(8));
    format!("{prefix}_{date}_{clock}.{extension}")
}

fn user_not_found(user_id: i64) -> ApiError {
    ApiError::ResourceNotFound {
        resource_type: String::from("User"),
        message: format!("User #{user_id} does not exist"),
    }
}

fn hardware_not_found(hardware_id: i64) -> ApiError {
    ApiError::ResourceNotFound {
        resource_type: String::from("Hardware"),
        message: format!("Hardware #{hardware_id} does not exist"),
    }
}

fn category_not_found(category_id: i64) -> ApiError {
    ApiError::ResourceNotFound {
        resource_type: String::from("Category"),
        message: format!("Category #{category_id} does not exist"),
    }
}

fn user_info(user: &UserData, capabilities: Option<UserCapabilities>) -> UserInfo {
    UserInfo {
        user_id: user.user_id,
        username: user.username.clone(),
        full_name: user.full_name.clone(),
        role: user.role.clone(),
        created_at: user.created_at.clone(),
        last_login_at: user.last_login_at.clone(),
        last_activity_at: user.last_activity_at.clone(),
        is_active: user.is_active,
        capabilities,
    }
}

fn load_user(persistence: &mut Persistence, user_id: i64) -> Result<UserData, ApiError> {
    persistence
        .get_user_by_id(user_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| user_not_found(user_id))
}

fn load_category(persistence: &mut Persistence, category_id: i64) -> Result<CategoryRef, ApiError> {
    let record: CategoryRecord = persistence
        .get_category_by_id(category_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| category_not_found(category_id))?;
    Ok(CategoryRef::new(record.category_id, &record.name))
}

fn load_hardware(persistence: &mut Persistence, hardware_id: i64) -> Result<Hardware, ApiError> {
    persistence
        .get_hardware(hardware_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| hardware_not_found(hardware_id))
}

/// Loads a row the actor may see. Staff get not-found for deleted rows.
fn load_visible_hardware(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    hardware_id: i64,
) -> Result<Hardware, ApiError> {
    let hardware: Hardware = load_hardware(persistence, hardware_id)?;
    if hardware.is_deleted() && !actor.is_admin() {
        return Err(hardware_not_found(hardware_id));
    }
    Ok(hardware)
}

/// Loads every requested row, de-duplicating IDs and keeping their order.
fn load_batch(
    persistence: &mut Persistence,
    hardware_ids: &[i64],
) -> Result<Vec<Hardware>, ApiError> {
    let mut seen: HashSet<i64> = HashSet::new();
    let ids: Vec<i64> = hardware_ids
        .iter()
        .copied()
        .filter(|id| seen.insert(*id))
        .collect();
    if ids.is_empty() {
        return Err(ApiError::InvalidInput {
            field: String::from("hardware_ids"),
            message: String::from("Select at least one hardware item"),
        });
    }

    let rows: Vec<Hardware> = persistence
        .get_hardware_many(&ids)
        .map_err(translate_persistence_error)?;
    ids.iter()
        .map(|id| {
            rows.iter()
                .find(|row| row.id == Some(*id))
                .cloned()
                .ok_or_else(|| hardware_not_found(*id))
        })
        .collect()
}

fn hardware_parts(
    persistence: &mut Persistence,
    request: &HardwareRequest,
) -> Result<(CategoryRef, HardwareFields, StatusQuantities), ApiError> {
    let category: CategoryRef = load_category(persistence, request.category_id)?;
    let fields: HardwareFields = HardwareFields::new(
        &request.name,
        &request.hardware_type,
        &request.brand,
        &request.model,
        &request.serial_number,
        &request.location,
    );
    let quantities: StatusQuantities = StatusQuantities::new(
        request.unused,
        request.in_use,
        request.damaged,
        request.repair,
    );
    Ok((category, fields, quantities))
}

/// Applies one command and persists the transition with its history row.
fn commit(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    current: Option<&Hardware>,
    command: Command,
    now: &str,
) -> Result<HardwareMutationResponse, ApiError> {
    let transition: TransitionResult = apply(current, command, actor.to_history_actor(), now)
        .map_err(translate_core_error)?;
    let persisted: PersistedTransition = persistence
        .persist_transition(&transition, now)
        .map_err(translate_persistence_error)?;

    info!(
        user_id = actor.user_id,
        hardware_id = ?persisted.hardware_id,
        history_id = persisted.history_id,
        action = %transition.event.action,
        "Hardware changed"
    );

    let hardware: Option<HardwareInfo> = match persisted.hardware_id {
        Some(id) => Some(HardwareInfo::from(&load_hardware(persistence, id)?)),
        None => None,
    };
    Ok(HardwareMutationResponse {
        hardware,
        history_id: persisted.history_id,
        message: transition.event.details.unwrap_or_default(),
    })
}

/// Applies the same command to every row, then persists all or nothing.
fn commit_batch(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    rows: &[Hardware],
    command: &Command,
    now: &str,
) -> Result<usize, ApiError> {
    let transitions: Vec<TransitionResult> = rows
        .iter()
        .map(|row| apply(Some(row), command.clone(), actor.to_history_actor(), now))
        .collect::<Result<Vec<TransitionResult>, _>>()
        .map_err(translate_core_error)?;
    let persisted: Vec<PersistedTransition> = persistence
        .persist_transitions(&transitions, now)
        .map_err(translate_persistence_error)?;
    Ok(persisted.len())
}

// ========================================================================
// Bootstrap & Authentication
// ========================================================================

/// Reports whether the first admin account still has to be created.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_bootstrap_status(
    persistence: &mut Persistence,
) -> Result<BootstrapStatusResponse, ApiError> {
    let user_count: i64 = persistence
        .count_users()
        .map_err(translate_persistence_error)?;
    Ok(BootstrapStatusResponse {
        needs_bootstrap: user_count == 0,
    })
}

/// Creates the first admin account.
///
/// Only allowed while no user accounts exist.
///
/// # Arguments
///
/// * `persistence` - The persistence layer
/// * `request` - The account details
///
/// # Errors
///
/// Returns an error if:
/// - Any account already exists
/// - The username or full name is invalid
/// - The password violates the policy
pub fn create_first_admin(
    persistence: &mut Persistence,
    request: &CreateFirstAdminRequest,
) -> Result<CreateUserResponse, ApiError> {
    let user_count: i64 = persistence
        .count_users()
        .map_err(translate_persistence_error)?;
    if user_count > 0 {
        return Err(ApiError::Conflict {
            message: String::from("Setup is already complete; log in instead"),
        });
    }

    let username: String = validate_username(&request.username).map_err(translate_domain_error)?;
    let full_name: String =
        validate_full_name(&request.full_name).map_err(translate_domain_error)?;
    PasswordPolicy::default().validate(
        &request.password,
        &request.password_confirmation,
        &username,
        &full_name,
    )?;

    let now: String = current_timestamp()?;
    let user_id: i64 = persistence
        .create_user(&username, &full_name, &request.password, Role::Admin, &now)
        .map_err(translate_persistence_error)?;

    info!(user_id, username = %username, "Created first admin account");

    Ok(CreateUserResponse {
        user_id,
        message: format!("Admin account '{username}' created"),
        username,
    })
}

/// Authenticates a user and creates a session.
///
/// # Arguments
///
/// * `persistence` - The persistence layer
/// * `request` - The credentials
/// * `session_ttl` - How long the session stays valid
///
/// # Errors
///
/// Returns `AuthenticationFailed` with the same message for an unknown
/// username and for a wrong password.
pub fn login(
    persistence: &mut Persistence,
    request: &LoginRequest,
    session_ttl: Duration,
) -> Result<LoginResponse, ApiError> {
    let outcome: LoginOutcome = AuthenticationService::login(
        persistence,
        &request.username,
        &request.password,
        session_ttl,
    )?;
    // Reloaded so the response carries the presence fields login just set.
    let user: UserData = load_user(persistence, outcome.actor.user_id)?;

    Ok(LoginResponse {
        capabilities: compute_global_capabilities(&outcome.actor),
        session_token: outcome.session_token,
        expires_at: outcome.expires_at,
        user: user_info(&user, None),
    })
}

/// Logs out by deleting the session.
///
/// # Errors
///
/// Returns an error if the logout fails.
pub fn logout(persistence: &mut Persistence, session_token: &str) -> Result<(), ApiError> {
    AuthenticationService::logout(persistence, session_token)?;
    Ok(())
}

/// Returns the current user's information with global capabilities.
#[must_use]
pub fn whoami(authenticated_actor: &AuthenticatedActor, user: &UserData) -> WhoAmIResponse {
    WhoAmIResponse {
        user: user_info(user, None),
        capabilities: compute_global_capabilities(authenticated_actor),
    }
}

// ========================================================================
// Dashboard
// ========================================================================

/// Returns the dashboard: totals, per-category breakdown, recent history,
/// and who is online.
///
/// # Errors
///
/// Returns an error if a query fails.
pub fn get_dashboard(
    persistence: &mut Persistence,
    _authenticated_actor: &AuthenticatedActor,
) -> Result<DashboardResponse, ApiError> {
    let now: String = current_timestamp()?;
    let summary: DashboardSummary = persistence
        .dashboard_summary()
        .map_err(translate_persistence_error)?;
    let recent: HistoryPage = persistence
        .list_history(&HistoryFilter {
            limit: Some(RECENT_HISTORY_LIMIT),
            ..HistoryFilter::default()
        })
        .map_err(translate_persistence_error)?;

    Ok(DashboardResponse {
        item_count: summary.item_count,
        totals: summary.totals,
        categories: summary.categories,
        recent_history: recent.entries.iter().map(HistoryEntryInfo::from).collect(),
        online_users: online_users(persistence, &now)?,
    })
}

// ========================================================================
// Categories
// ========================================================================

/// Lists every category with its active item count.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_categories(
    persistence: &mut Persistence,
    _authenticated_actor: &AuthenticatedActor,
) -> Result<ListCategoriesResponse, ApiError> {
    let categories: Vec<CategoryData> = persistence
        .list_categories()
        .map_err(translate_persistence_error)?;
    Ok(ListCategoriesResponse {
        categories: categories.into_iter().map(CategoryInfo::from).collect(),
    })
}

/// Returns one category with its active item count.
///
/// # Errors
///
/// Returns an error if the category does not exist or the query fails.
pub fn get_category(
    persistence: &mut Persistence,
    _authenticated_actor: &AuthenticatedActor,
    category_id: i64,
) -> Result<CategoryInfo, ApiError> {
    persistence
        .list_categories()
        .map_err(translate_persistence_error)?
        .into_iter()
        .find(|category| category.category_id == category_id)
        .map(CategoryInfo::from)
        .ok_or_else(|| category_not_found(category_id))
}

fn ensure_category_name_free(
    persistence: &mut Persistence,
    name: &str,
    except: Option<i64>,
) -> Result<(), ApiError> {
    let existing: Option<CategoryRecord> = persistence
        .get_category_by_name(name)
        .map_err(translate_persistence_error)?;
    match existing {
        Some(found) if Some(found.category_id) != except => Err(ApiError::Conflict {
            message: format!("Category '{}' already exists", found.name),
        }),
        _ => Ok(()),
    }
}

/// Creates a category.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not an admin
/// - The name is empty or too long
/// - A category with that name exists, ignoring case
pub fn create_category(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
    request: &CategoryNameRequest,
) -> Result<CategoryResponse, ApiError> {
    AuthorizationService::require_admin(authenticated_actor, "create_category")?;
    let name: String = validate_category_name(&request.name).map_err(translate_domain_error)?;
    ensure_category_name_free(persistence, &name, None)?;

    let now: String = current_timestamp()?;
    let category_id: i64 = persistence
        .create_category(&name, &now)
        .map_err(translate_persistence_error)?;

    info!(user_id = authenticated_actor.user_id, category_id, name = %name, "Created category");

    Ok(CategoryResponse {
        category_id,
        message: format!("Category '{name}' created"),
        name,
    })
}

/// Renames a category.
///
/// Existing history rows keep the name they were written with.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not an admin
/// - The category does not exist
/// - The new name is invalid or used by another category
pub fn rename_category(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
    category_id: i64,
    request: &CategoryNameRequest,
) -> Result<CategoryResponse, ApiError> {
    AuthorizationService::require_admin(authenticated_actor, "rename_category")?;
    let name: String = validate_category_name(&request.name).map_err(translate_domain_error)?;
    let current: CategoryRef = load_category(persistence, category_id)?;
    ensure_category_name_free(persistence, &name, Some(category_id))?;

    persistence
        .rename_category(category_id, &name)
        .map_err(translate_persistence_error)?;

    info!(
        user_id = authenticated_actor.user_id,
        category_id,
        from = %current.name,
        to = %name,
        "Renamed category"
    );

    Ok(CategoryResponse {
        category_id,
        message: format!("Category '{}' renamed to '{name}'", current.name),
        name,
    })
}

/// Deletes a category that no hardware row uses.
///
/// Soft-deleted rows still count; purge them first.
///
/// # Errors
///
/// Returns an error if the actor is not an admin, the category does not
/// exist, or hardware still references it.
pub fn delete_category(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
    category_id: i64,
) -> Result<MessageResponse, ApiError> {
    AuthorizationService::require_admin(authenticated_actor, "delete_category")?;
    let category: CategoryRef = load_category(persistence, category_id)?;

    persistence
        .delete_category(category_id)
        .map_err(|e| match e {
            PersistenceError::CategoryInUse { item_count, .. } => ApiError::Conflict {
                message: format!(
                    "Category '{}' is used by {item_count} hardware item(s), including deleted ones",
                    category.name
                ),
            },
            other => translate_persistence_error(other),
        })?;

    info!(user_id = authenticated_actor.user_id, category_id, "Deleted category");

    Ok(MessageResponse {
        message: format!("Category '{}' deleted", category.name),
    })
}

// ========================================================================
// Hardware
// ========================================================================

/// Lists a page of hardware rows.
///
/// # Errors
///
/// Returns an error if:
/// - A staff user asks for deleted rows
/// - The scope or status filter is not recognized
/// - The query fails
pub fn list_hardware(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
    query: &ListHardwareQuery,
) -> Result<ListHardwareResponse, ApiError> {
    let scope: DeletionScope = match non_empty(query.scope.as_ref()).as_deref() {
        None | Some("active") => DeletionScope::Active,
        Some("deleted") => DeletionScope::Deleted,
        Some("all") => DeletionScope::All,
        Some(other) => {
            return Err(ApiError::InvalidInput {
                field: String::from("scope"),
                message: format!("Unknown scope '{other}'; use active, deleted, or all"),
            });
        }
    };
    if scope != DeletionScope::Active {
        AuthorizationService::require_admin(authenticated_actor, "view_deleted_hardware")?;
    }

    let status: Option<HardwareStatus> = non_empty(query.status.as_ref())
        .map(|value| parse_status("status", &value))
        .transpose()?;
    let (page, per_page, limit, offset) = page_window(query.page, query.per_page);

    let result: HardwarePage = persistence
        .list_hardware(&HardwareFilter {
            search: non_empty(query.search.as_ref()),
            category_id: query.category_id,
            status,
            scope,
            limit: Some(limit),
            offset: Some(offset),
        })
        .map_err(translate_persistence_error)?;

    Ok(ListHardwareResponse {
        items: result.items.iter().map(HardwareInfo::from).collect(),
        total: result.total,
        page,
        per_page,
    })
}

/// Returns one hardware row.
///
/// # Errors
///
/// Returns not-found if the row does not exist, or if it is deleted and
/// the actor is not an admin.
pub fn get_hardware(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
    hardware_id: i64,
) -> Result<HardwareInfo, ApiError> {
    let hardware: Hardware = load_visible_hardware(persistence, authenticated_actor, hardware_id)?;
    Ok(HardwareInfo::from(&hardware))
}

/// Creates a hardware row.
///
/// # Errors
///
/// Returns an error if the category does not exist or the fields are invalid.
pub fn create_hardware(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
    request: &HardwareRequest,
) -> Result<HardwareMutationResponse, ApiError> {
    let (category, fields, quantities) = hardware_parts(persistence, request)?;
    let now: String = current_timestamp()?;
    commit(
        persistence,
        authenticated_actor,
        None,
        Command::Create {
            category,
            fields,
            quantities,
        },
        &now,
    )
}

/// Replaces the fields, category, and quantities of an active row.
///
/// # Errors
///
/// Returns an error if:
/// - The row or the category does not exist
/// - The row is deleted
/// - The fields are invalid
/// - The row changed underneath the request
pub fn update_hardware(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
    hardware_id: i64,
    request: &HardwareRequest,
) -> Result<HardwareMutationResponse, ApiError> {
    let current: Hardware = load_visible_hardware(persistence, authenticated_actor, hardware_id)?;
    let (category, fields, quantities) = hardware_parts(persistence, request)?;
    let now: String = current_timestamp()?;
    commit(
        persistence,
        authenticated_actor,
        Some(&current),
        Command::Update {
            category,
            fields,
            quantities,
        },
        &now,
    )
}

/// Moves units of one row from one status to another.
///
/// # Errors
///
/// Returns an error if the row does not exist or is deleted, a status is
/// not recognized, or there are not enough units to move.
pub fn move_hardware_status(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
    hardware_id: i64,
    request: &MoveStatusRequest,
) -> Result<HardwareMutationResponse, ApiError> {
    let from: HardwareStatus = parse_status("from", &request.from)?;
    let to: HardwareStatus = parse_status("to", &request.to)?;
    let current: Hardware = load_visible_hardware(persistence, authenticated_actor, hardware_id)?;
    let now: String = current_timestamp()?;
    commit(
        persistence,
        authenticated_actor,
        Some(&current),
        Command::MoveStatus {
            from,
            to,
            quantity: request.quantity,
        },
        &now,
    )
}

/// Moves units between statuses on several rows in one transaction.
///
/// Without a quantity, every unit in `from` moves, and rows with no units
/// in `from` are left alone. If any row fails, nothing is written.
///
/// # Errors
///
/// Returns an error if a row does not exist or is deleted, a status is not
/// recognized, or any row has too few units.
pub fn batch_move_status(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
    request: &BatchMoveStatusRequest,
) -> Result<BatchResponse, ApiError> {
    let from: HardwareStatus = parse_status("from", &request.from)?;
    let to: HardwareStatus = parse_status("to", &request.to)?;
    let rows: Vec<Hardware> = load_batch(persistence, &request.hardware_ids)?
        .into_iter()
        .filter(|row| request.quantity.is_some() || row.quantities.get(from) > 0)
        .collect();
    if rows.is_empty() {
        return Ok(BatchResponse {
            affected: 0,
            message: format!("No selected items have units in {from}"),
        });
    }

    let now: String = current_timestamp()?;
    let affected: usize = commit_batch(
        persistence,
        authenticated_actor,
        &rows,
        &Command::MoveStatus {
            from,
            to,
            quantity: request.quantity,
        },
        &now,
    )?;

    info!(user_id = authenticated_actor.user_id, affected, %from, %to, "Batch status move");

    Ok(BatchResponse {
        affected,
        message: format!("Moved units from {from} to {to} on {affected} item(s)"),
    })
}

/// Soft-deletes a row.
///
/// # Errors
///
/// Returns an error if the actor is not an admin, or the row does not exist
/// or is already deleted.
pub fn soft_delete_hardware(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
    hardware_id: i64,
) -> Result<HardwareMutationResponse, ApiError> {
    AuthorizationService::require_admin(authenticated_actor, "delete_hardware")?;
    let current: Hardware = load_hardware(persistence, hardware_id)?;
    let now: String = current_timestamp()?;
    commit(
        persistence,
        authenticated_actor,
        Some(&current),
        Command::SoftDelete,
        &now,
    )
}

/// Soft-deletes several rows in one transaction.
///
/// # Errors
///
/// Returns an error if the actor is not an admin, or any row does not exist
/// or is already deleted. Nothing is written in that case.
pub fn batch_soft_delete(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
    request: &BatchDeleteRequest,
) -> Result<BatchResponse, ApiError> {
    AuthorizationService::require_admin(authenticated_actor, "delete_hardware")?;
    let rows: Vec<Hardware> = load_batch(persistence, &request.hardware_ids)?;
    let now: String = current_timestamp()?;
    let affected: usize = commit_batch(
        persistence,
        authenticated_actor,
        &rows,
        &Command::SoftDelete,
        &now,
    )?;

    info!(user_id = authenticated_actor.user_id, affected, "Batch soft delete");

    Ok(BatchResponse {
        affected,
        message: format!("Deleted {affected} item(s)"),
    })
}

/// Restores a soft-deleted row.
///
/// # Errors
///
/// Returns an error if the actor is not an admin, or the row does not exist
/// or is not deleted.
pub fn restore_hardware(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
    hardware_id: i64,
) -> Result<HardwareMutationResponse, ApiError> {
    AuthorizationService::require_admin(authenticated_actor, "restore_hardware")?;
    let current: Hardware = load_hardware(persistence, hardware_id)?;
    let now: String = current_timestamp()?;
    commit(
        persistence,
        authenticated_actor,
        Some(&current),
        Command::Restore,
        &now,
    )
}

/// Permanently removes a soft-deleted row.
///
/// Its history rows stay, detached from the removed row.
///
/// # Errors
///
/// Returns an error if the actor is not an admin, or the row does not exist
/// or is not deleted.
pub fn purge_hardware(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
    hardware_id: i64,
) -> Result<HardwareMutationResponse, ApiError> {
    AuthorizationService::require_admin(authenticated_actor, "purge_hardware")?;
    let current: Hardware = load_hardware(persistence, hardware_id)?;
    let now: String = current_timestamp()?;
    commit(
        persistence,
        authenticated_actor,
        Some(&current),
        Command::Purge,
        &now,
    )
}

// ========================================================================
// History
// ========================================================================

/// Normalizes a history date bound.
///
/// A bare `YYYY-MM-DD` covers the whole day: it becomes midnight for the
/// lower bound and `23:59:59` for the upper bound.
fn history_bound(field: &str, value: &str, end_of_day: bool) -> Result<String, ApiError> {
    let value: &str = value.trim();
    if time::Date::parse(value, format_description!("[year]-[month]-[day]")).is_ok() {
        let clock: &str = if end_of_day { "23:59:59" } else { "00:00:00" };
        return Ok(format!("{value} {clock}"));
    }
    parse_timestamp(value).map_err(|_| ApiError::InvalidInput {
        field: field.to_string(),
        message: format!("'{value}' is not a date (YYYY-MM-DD) or timestamp (YYYY-MM-DD HH:MM:SS)"),
    })?;
    Ok(value.to_string())
}

fn history_filter(query: &HistoryQuery) -> Result<HistoryFilter, ApiError> {
    let action: Option<String> = non_empty(query.action.as_ref())
        .map(|value| {
            HistoryAction::from_str(&value)
                .map(|action| action.as_str().to_string())
                .map_err(|e| ApiError::InvalidInput {
                    field: String::from("action"),
                    message: e.to_string(),
                })
        })
        .transpose()?;
    let from: Option<String> = non_empty(query.from.as_ref())
        .map(|value| history_bound("from", &value, false))
        .transpose()?;
    let to: Option<String> = non_empty(query.to.as_ref())
        .map(|value| history_bound("to", &value, true))
        .transpose()?;

    Ok(HistoryFilter {
        hardware_id: query.hardware_id,
        user_id: query.user_id,
        action,
        search: non_empty(query.search.as_ref()),
        from,
        to,
        limit: None,
        offset: None,
    })
}

/// Lists a page of the history log, newest first.
///
/// # Errors
///
/// Returns an error if a filter is malformed or the query fails.
pub fn list_history(
    persistence: &mut Persistence,
    _authenticated_actor: &AuthenticatedActor,
    query: &HistoryQuery,
) -> Result<ListHistoryResponse, ApiError> {
    let (page, per_page, limit, offset) = page_window(query.page, query.per_page);
    let filter: HistoryFilter = HistoryFilter {
        limit: Some(limit),
        offset: Some(offset),
        ..history_filter(query)?
    };
    let result: HistoryPage = persistence
        .list_history(&filter)
        .map_err(translate_persistence_error)?;

    Ok(ListHistoryResponse {
        entries: result.entries.iter().map(HistoryEntryInfo::from).collect(),
        total: result.total,
        page,
        per_page,
    })
}

/// Exports the filtered history log as CSV, ignoring paging.
///
/// # Errors
///
/// Returns an error if a filter is malformed or the query fails.
pub fn export_history(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
    query: &HistoryQuery,
) -> Result<FileDownload, ApiError> {
    let filter: HistoryFilter = history_filter(query)?;
    let entries: Vec<HistoryEntry> = persistence
        .list_history(&filter)
        .map_err(translate_persistence_error)?
        .entries;
    let now: String = current_timestamp()?;

    info!(user_id = authenticated_actor.user_id, rows = entries.len(), "Exported history CSV");

    Ok(FileDownload {
        file_name: download_name("inventory_history", "csv", &now),
        content_type: "text/csv; charset=utf-8",
        body: export_history_csv(&entries)?,
    })
}

// ========================================================================
// CSV Import & Export
// ========================================================================

/// Exports every active hardware row as CSV.
///
/// # Errors
///
/// Returns an error if the query or the CSV writer fails.
pub fn export_hardware(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
) -> Result<FileDownload, ApiError> {
    let items: Vec<Hardware> = persistence
        .list_all_hardware()
        .map_err(translate_persistence_error)?;
    let now: String = current_timestamp()?;

    info!(user_id = authenticated_actor.user_id, rows = items.len(), "Exported hardware CSV");

    Ok(FileDownload {
        file_name: download_name("hardware_inventory", "csv", &now),
        content_type: "text/csv; charset=utf-8",
        body: export_hardware_csv(&items)?,
    })
}

/// Validates an uploaded CSV without importing it.
///
/// # Errors
///
/// Returns an error if the actor is not an admin or the CSV header is invalid.
pub fn preview_import(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
    request: &CsvImportRequest,
) -> Result<CsvPreviewResponse, ApiError> {
    AuthorizationService::require_admin(authenticated_actor, "import_csv")?;
    preview_csv_import(persistence, &request.csv_content)
}

/// Imports an uploaded CSV row by row.
///
/// # Errors
///
/// Returns an error if the actor is not an admin or the CSV header is
/// invalid. Row failures are reported in the response.
pub fn import_hardware(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
    request: &CsvImportRequest,
) -> Result<CsvImportResponse, ApiError> {
    AuthorizationService::require_admin(authenticated_actor, "import_csv")?;
    let now: String = current_timestamp()?;
    import_csv(
        persistence,
        &request.csv_content,
        &authenticated_actor.to_history_actor(),
        &now,
    )
}

// ========================================================================
// Users
// ========================================================================

/// Lists every user account with per-account capabilities.
///
/// # Errors
///
/// Returns an error if the actor is not an admin or the query fails.
pub fn list_users(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
) -> Result<ListUsersResponse, ApiError> {
    AuthorizationService::require_admin(authenticated_actor, "list_users")?;
    let admin_count: i64 = persistence
        .count_admins()
        .map_err(translate_persistence_error)?;
    let users: Vec<UserData> = persistence
        .list_users()
        .map_err(translate_persistence_error)?;

    Ok(ListUsersResponse {
        users: users
            .iter()
            .map(|user| {
                user_info(
                    user,
                    Some(compute_user_capabilities(
                        authenticated_actor,
                        user,
                        admin_count,
                    )),
                )
            })
            .collect(),
    })
}

/// Creates a user account.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not an admin
/// - The username, full name, or role is invalid
/// - The username is taken, ignoring case
/// - The password violates the policy
pub fn create_user(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
    request: &CreateUserRequest,
) -> Result<CreateUserResponse, ApiError> {
    AuthorizationService::require_admin(authenticated_actor, "create_user")?;
    let username: String = validate_username(&request.username).map_err(translate_domain_error)?;
    let full_name: String =
        validate_full_name(&request.full_name).map_err(translate_domain_error)?;
    let role: Role = parse_role(&request.role)?;
    PasswordPolicy::default().validate(
        &request.password,
        &request.password_confirmation,
        &username,
        &full_name,
    )?;

    if persistence
        .get_user_by_username(&username)
        .map_err(translate_persistence_error)?
        .is_some()
    {
        return Err(ApiError::Conflict {
            message: format!("Username '{username}' is already taken"),
        });
    }

    let now: String = current_timestamp()?;
    let user_id: i64 = persistence
        .create_user(&username, &full_name, &request.password, role, &now)
        .map_err(translate_persistence_error)?;

    info!(
        user_id = authenticated_actor.user_id,
        created_user_id = user_id,
        role = %role,
        "Created user"
    );

    Ok(CreateUserResponse {
        user_id,
        message: format!("User '{username}' created"),
        username,
    })
}

/// Updates a user's full name and role.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not an admin
/// - The user does not exist
/// - The full name or role is invalid
/// - The change would demote the last admin
pub fn update_user(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
    user_id: i64,
    request: &UpdateUserRequest,
) -> Result<UserInfo, ApiError> {
    AuthorizationService::require_admin(authenticated_actor, "update_user")?;
    let target: UserData = load_user(persistence, user_id)?;
    let full_name: String =
        validate_full_name(&request.full_name).map_err(translate_domain_error)?;
    let role: Role = parse_role(&request.role)?;

    if target.role == Role::Admin.as_str() && role == Role::Staff {
        let admin_count: i64 = persistence
            .count_admins()
            .map_err(translate_persistence_error)?;
        if admin_count <= 1 {
            return Err(ApiError::DomainRuleViolation {
                rule: String::from("last_admin"),
                message: String::from("The last admin cannot be demoted"),
            });
        }
    }

    persistence
        .update_user(user_id, &full_name, role)
        .map_err(translate_persistence_error)?;

    info!(
        user_id = authenticated_actor.user_id,
        target_user_id = user_id,
        role = %role,
        "Updated user"
    );

    let updated: UserData = load_user(persistence, user_id)?;
    Ok(user_info(&updated, None))
}

/// Deletes a user account and all of its sessions.
///
/// History rows written by the user keep the user's name.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not an admin
/// - The actor tries to delete their own account
/// - The user does not exist
/// - The user is the last admin
pub fn delete_user(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
    user_id: i64,
) -> Result<MessageResponse, ApiError> {
    AuthorizationService::require_admin(authenticated_actor, "delete_user")?;
    if user_id == authenticated_actor.user_id {
        return Err(ApiError::DomainRuleViolation {
            rule: String::from("self_delete"),
            message: String::from("You cannot delete your own account"),
        });
    }

    let target: UserData = load_user(persistence, user_id)?;
    if target.role == Role::Admin.as_str() {
        let admin_count: i64 = persistence
            .count_admins()
            .map_err(translate_persistence_error)?;
        if admin_count <= 1 {
            return Err(ApiError::DomainRuleViolation {
                rule: String::from("last_admin"),
                message: String::from("The last admin cannot be deleted"),
            });
        }
    }

    persistence
        .delete_user(user_id)
        .map_err(translate_persistence_error)?;

    info!(
        user_id = authenticated_actor.user_id,
        deleted_user_id = user_id,
        "Deleted user"
    );

    Ok(MessageResponse {
        message: format!("User '{}' deleted", target.username),
    })
}

/// Sets another user's password and ends all of their sessions.
///
/// # Errors
///
/// Returns an error if the actor is not an admin, the user does not exist,
/// or the password violates the policy.
pub fn reset_password(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
    user_id: i64,
    request: &ResetPasswordRequest,
) -> Result<MessageResponse, ApiError> {
    AuthorizationService::require_admin(authenticated_actor, "reset_password")?;
    let target: UserData = load_user(persistence, user_id)?;
    PasswordPolicy::default().validate(
        &request.new_password,
        &request.new_password_confirmation,
        &target.username,
        &target.full_name,
    )?;

    let sessions_ended: usize = persistence
        .update_password(user_id, &request.new_password)
        .map_err(translate_persistence_error)?;

    info!(
        user_id = authenticated_actor.user_id,
        target_user_id = user_id,
        sessions_ended,
        "Reset password"
    );

    Ok(MessageResponse {
        message: format!("Password for '{}' reset", target.username),
    })
}

/// Changes the actor's own password and ends all of their sessions.
///
/// # Errors
///
/// Returns an error if the current password is wrong or the new password
/// violates the policy.
pub fn change_password(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
    request: &ChangePasswordRequest,
) -> Result<MessageResponse, ApiError> {
    let user: UserData = load_user(persistence, authenticated_actor.user_id)?;
    let verified: bool = persistence
        .verify_password(&request.current_password, &user.password_hash)
        .map_err(translate_persistence_error)?;
    if !verified {
        return Err(ApiError::InvalidInput {
            field: String::from("current_password"),
            message: String::from("Current password is incorrect"),
        });
    }

    PasswordPolicy::default().validate(
        &request.new_password,
        &request.new_password_confirmation,
        &user.username,
        &user.full_name,
    )?;

    let sessions_ended: usize = persistence
        .update_password(user.user_id, &request.new_password)
        .map_err(translate_persistence_error)?;

    info!(user_id = user.user_id, sessions_ended, "Changed own password");

    Ok(MessageResponse {
        message: String::from("Password changed; log in again with the new password"),
    })
}

// ========================================================================
// Backup & Restore
// ========================================================================

/// Renders a SQL backup of the whole dataset.
///
/// # Errors
///
/// Returns an error if the actor is not an admin or the export fails.
pub fn download_backup(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
) -> Result<FileDownload, ApiError> {
    AuthorizationService::require_admin(authenticated_actor, "backup")?;
    let snapshot: BackupSnapshot = persistence
        .export_snapshot()
        .map_err(translate_persistence_error)?;
    let now: String = current_timestamp()?;

    info!(user_id = authenticated_actor.user_id, "Generated database backup");

    Ok(FileDownload {
        file_name: download_name("pcinv_backup", "sql", &now),
        content_type: "application/sql; charset=utf-8",
        body: create_backup(&snapshot, persistence.sql_dialect(), &now),
    })
}

/// Replaces the whole dataset with an uploaded backup.
///
/// The backup is validated before anything runs, then executed in a single
/// transaction. Every session ends, including the actor's.
///
/// # Errors
///
/// Returns an error if the actor is not an admin, validation fails, or a
/// statement fails (in which case nothing changes).
pub fn restore_backup(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
    request: &RestoreBackupRequest,
) -> Result<RestoreBackupResponse, ApiError> {
    AuthorizationService::require_admin(authenticated_actor, "restore")?;
    let statements: Vec<String> = validate_backup(&request.sql_content, persistence.sql_dialect())
        .inspect_err(|e| {
            warn!(user_id = authenticated_actor.user_id, error = %e, "Rejected backup upload");
        })?;

    let rows_affected: usize = persistence
        .execute_restore(&statements)
        .map_err(|e| match e {
            PersistenceError::QueryFailed(reason) => ApiError::InvalidBackup { reason },
            other => translate_persistence_error(other),
        })?;

    info!(
        user_id = authenticated_actor.user_id,
        statements = statements.len(),
        rows_affected,
        "Restored database backup"
    );

    Ok(RestoreBackupResponse {
        statements_executed: statements.len(),
        rows_affected,
        message: String::from("Backup restored; log in again"),
    })
}
