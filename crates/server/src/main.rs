// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

mod session;

#[cfg(test)]
mod tests;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Path, Query, State as AxumState},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::Parser;
use pcinv_api::{
    ApiError, BatchDeleteRequest, BatchMoveStatusRequest, BatchResponse, BootstrapStatusResponse,
    CategoryInfo, CategoryNameRequest, CategoryResponse, ChangePasswordRequest,
    CreateFirstAdminRequest, CreateUserRequest, CreateUserResponse, CsvImportRequest,
    CsvImportResponse, CsvPreviewResponse, DashboardResponse, FileDownload, HardwareInfo,
    HardwareMutationResponse, HardwareRequest, HistoryQuery, ListCategoriesResponse,
    ListHardwareQuery, ListHardwareResponse, ListHistoryResponse, ListUsersResponse, LoginRequest,
    LoginResponse, MessageResponse, MoveStatusRequest, ResetPasswordRequest,
    RestoreBackupRequest, RestoreBackupResponse, UpdateUserRequest, UserInfo, WhoAmIResponse,
};
use pcinv_persistence::Persistence;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use time::{Duration, OffsetDateTime};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::session::{SessionUser, clear_session_cookie, session_cookie, session_token};

/// PC Inventory Server - HTTP server for the PC hardware inventory
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long)]
    database: Option<String>,

    /// `MySQL` connection URL. Takes precedence over `--database`.
    #[arg(long)]
    mysql_url: Option<String>,

    /// Address to bind the server to
    #[arg(short, long, default_value = "127.0.0.1")]
    bind: String,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Hours a session stays valid after login
    #[arg(long, default_value_t = 8, value_parser = clap::value_parser!(i64).range(1..))]
    session_hours: i64,

    /// Minutes of inactivity before a user is shown as offline
    #[arg(long, default_value_t = 15, value_parser = clap::value_parser!(i64).range(1..))]
    presence_timeout_minutes: i64,

    /// Seconds between presence sweeps
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u64).range(1..))]
    sweep_interval_seconds: u64,

    /// Largest accepted CSV import or backup upload, in megabytes
    #[arg(long, default_value_t = 16, value_parser = clap::value_parser!(u64).range(1..=1024))]
    max_upload_mb: u64,
}

/// Runtime settings derived from the command line.
#[derive(Debug, Clone, Copy)]
struct ServerConfig {
    /// How long a new session stays valid.
    session_ttl: Duration,
    /// Inactivity after which a user is shown as offline.
    presence_timeout: Duration,
    /// Interval between presence sweeps.
    sweep_interval: std::time::Duration,
    /// Body limit for upload routes, in bytes.
    max_upload_bytes: usize,
}

impl ServerConfig {
    fn from_args(args: &Args) -> Self {
        let max_upload_bytes: usize =
            usize::try_from(args.max_upload_mb.saturating_mul(1024 * 1024)).unwrap_or(usize::MAX);
        Self {
            session_ttl: Duration::hours(args.session_hours),
            presence_timeout: Duration::minutes(args.presence_timeout_minutes),
            sweep_interval: std::time::Duration::from_secs(args.sweep_interval_seconds),
            max_upload_bytes,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            session_ttl: Duration::hours(8),
            presence_timeout: Duration::minutes(15),
            sweep_interval: std::time::Duration::from_secs(60),
            max_upload_bytes: 16 * 1024 * 1024,
        }
    }
}

/// Application state shared across handlers.
///
/// This contains the persistence layer wrapped in a Mutex to allow
/// safe concurrent access.
#[derive(Clone)]
struct AppState {
    /// The persistence layer.
    persistence: Arc<Mutex<Persistence>>,
    /// Runtime settings.
    config: ServerConfig,
}

/// Error response type.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Error indicator.
    error: bool,
    /// Error message.
    message: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
#[derive(Debug)]
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The error message.
    message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status: StatusCode = match &err {
            ApiError::AuthenticationFailed { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Unauthorized { .. } => StatusCode::FORBIDDEN,
            ApiError::InvalidInput { .. }
            | ApiError::InvalidCsvFormat { .. }
            | ApiError::InvalidBackup { .. }
            | ApiError::PasswordPolicyViolation { .. } => StatusCode::BAD_REQUEST,
            ApiError::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::DomainRuleViolation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal { .. } => {
                error!(error = %err, "Internal error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

/// Turns a rendered file into an attachment download.
fn download_response(download: FileDownload) -> Response {
    let disposition: String = format!("attachment; filename=\"{}\"", download.file_name);
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, download.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        download.body,
    )
        .into_response()
}

// ========================================================================
// Bootstrap & Authentication
// ========================================================================

/// Handler for GET `/api/bootstrap/status`.
async fn handle_bootstrap_status(
    AxumState(app_state): AxumState<AppState>,
) -> Result<Json<BootstrapStatusResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(pcinv_api::get_bootstrap_status(&mut persistence)?))
}

/// Handler for POST `/api/bootstrap/admin`.
///
/// Creates the first admin account. Refused once any account exists.
async fn handle_create_first_admin(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<CreateFirstAdminRequest>,
) -> Result<Json<CreateUserResponse>, HttpError> {
    info!(username = %req.username, "Handling create_first_admin request");
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(pcinv_api::create_first_admin(&mut persistence, &req)?))
}

/// Handler for POST `/api/auth/login`.
///
/// Returns the session token in the body and sets the session cookie.
async fn handle_login(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Response, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: LoginResponse =
        pcinv_api::login(&mut persistence, &req, app_state.config.session_ttl)?;
    drop(persistence);

    let cookie: String = session_cookie(&response.session_token, app_state.config.session_ttl);
    Ok(([(header::SET_COOKIE, cookie)], Json(response)).into_response())
}

/// Handler for POST `/api/auth/logout`.
///
/// Deletes the session named by the request and clears the cookie.
async fn handle_logout(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
) -> Result<Response, HttpError> {
    let token: String = session_token(&headers).map_err(|_| HttpError {
        status: StatusCode::UNAUTHORIZED,
        message: String::from("Not logged in"),
    })?;

    let mut persistence = app_state.persistence.lock().await;
    pcinv_api::logout(&mut persistence, &token)?;
    drop(persistence);

    Ok((
        [(header::SET_COOKIE, clear_session_cookie())],
        Json(MessageResponse {
            message: String::from("Logged out"),
        }),
    )
        .into_response())
}

/// Handler for GET `/api/auth/whoami`.
async fn handle_whoami(SessionUser(actor, user): SessionUser) -> Json<WhoAmIResponse> {
    Json(pcinv_api::whoami(&actor, &user))
}

/// Handler for GET `/api/dashboard`.
async fn handle_dashboard(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
) -> Result<Json<DashboardResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(pcinv_api::get_dashboard(&mut persistence, &actor)?))
}

// ========================================================================
// Categories
// ========================================================================

/// Handler for GET `/api/categories`.
async fn handle_list_categories(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
) -> Result<Json<ListCategoriesResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(pcinv_api::list_categories(&mut persistence, &actor)?))
}

/// Handler for POST `/api/categories`.
async fn handle_create_category(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Json(req): Json<CategoryNameRequest>,
) -> Result<(StatusCode, Json<CategoryResponse>), HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: CategoryResponse = pcinv_api::create_category(&mut persistence, &actor, &req)?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Handler for GET `/api/categories/{id}`.
async fn handle_get_category(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Path(category_id): Path<i64>,
) -> Result<Json<CategoryInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(pcinv_api::get_category(
        &mut persistence,
        &actor,
        category_id,
    )?))
}

/// Handler for PUT `/api/categories/{id}`.
async fn handle_rename_category(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Path(category_id): Path<i64>,
    Json(req): Json<CategoryNameRequest>,
) -> Result<Json<CategoryResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(pcinv_api::rename_category(
        &mut persistence,
        &actor,
        category_id,
        &req,
    )?))
}

/// Handler for DELETE `/api/categories/{id}`.
async fn handle_delete_category(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Path(category_id): Path<i64>,
) -> Result<Json<MessageResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(pcinv_api::delete_category(
        &mut persistence,
        &actor,
        category_id,
    )?))
}

// ========================================================================
// Hardware
// ========================================================================

/// Handler for GET `/api/hardware`.
async fn handle_list_hardware(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Query(query): Query<ListHardwareQuery>,
) -> Result<Json<ListHardwareResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(pcinv_api::list_hardware(
        &mut persistence,
        &actor,
        &query,
    )?))
}

/// Handler for POST `/api/hardware`.
async fn handle_create_hardware(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Json(req): Json<HardwareRequest>,
) -> Result<(StatusCode, Json<HardwareMutationResponse>), HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: HardwareMutationResponse =
        pcinv_api::create_hardware(&mut persistence, &actor, &req)?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Handler for GET `/api/hardware/{id}`.
async fn handle_get_hardware(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Path(hardware_id): Path<i64>,
) -> Result<Json<HardwareInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(pcinv_api::get_hardware(
        &mut persistence,
        &actor,
        hardware_id,
    )?))
}

/// Handler for PUT `/api/hardware/{id}`.
async fn handle_update_hardware(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Path(hardware_id): Path<i64>,
    Json(req): Json<HardwareRequest>,
) -> Result<Json<HardwareMutationResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(pcinv_api::update_hardware(
        &mut persistence,
        &actor,
        hardware_id,
        &req,
    )?))
}

/// Handler for DELETE `/api/hardware/{id}`.
///
/// Soft-deletes the row.
async fn handle_delete_hardware(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Path(hardware_id): Path<i64>,
) -> Result<Json<HardwareMutationResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(pcinv_api::soft_delete_hardware(
        &mut persistence,
        &actor,
        hardware_id,
    )?))
}

/// Handler for POST `/api/hardware/{id}/status`.
async fn handle_move_status(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Path(hardware_id): Path<i64>,
    Json(req): Json<MoveStatusRequest>,
) -> Result<Json<HardwareMutationResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(pcinv_api::move_hardware_status(
        &mut persistence,
        &actor,
        hardware_id,
        &req,
    )?))
}

/// Handler for POST `/api/hardware/{id}/restore`.
async fn handle_restore_hardware(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Path(hardware_id): Path<i64>,
) -> Result<Json<HardwareMutationResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(pcinv_api::restore_hardware(
        &mut persistence,
        &actor,
        hardware_id,
    )?))
}

/// Handler for POST `/api/hardware/{id}/purge`.
async fn handle_purge_hardware(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Path(hardware_id): Path<i64>,
) -> Result<Json<HardwareMutationResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(pcinv_api::purge_hardware(
        &mut persistence,
        &actor,
        hardware_id,
    )?))
}

/// Handler for POST `/api/hardware/batch/delete`.
async fn handle_batch_delete(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Json(req): Json<BatchDeleteRequest>,
) -> Result<Json<BatchResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(pcinv_api::batch_soft_delete(
        &mut persistence,
        &actor,
        &req,
    )?))
}

/// Handler for POST `/api/hardware/batch/status`.
async fn handle_batch_status(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Json(req): Json<BatchMoveStatusRequest>,
) -> Result<Json<BatchResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(pcinv_api::batch_move_status(
        &mut persistence,
        &actor,
        &req,
    )?))
}

// ========================================================================
// History, Import & Export
// ========================================================================

/// Handler for GET `/api/history`.
async fn handle_list_history(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<ListHistoryResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(pcinv_api::list_history(
        &mut persistence,
        &actor,
        &query,
    )?))
}

/// Handler for GET `/api/history/export`.
async fn handle_export_history(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Query(query): Query<HistoryQuery>,
) -> Result<Response, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let download: FileDownload = pcinv_api::export_history(&mut persistence, &actor, &query)?;
    Ok(download_response(download))
}

/// Handler for GET `/api/export`.
async fn handle_export_hardware(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
) -> Result<Response, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let download: FileDownload = pcinv_api::export_hardware(&mut persistence, &actor)?;
    Ok(download_response(download))
}

/// Handler for POST `/api/import/preview`.
async fn handle_preview_import(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Json(req): Json<CsvImportRequest>,
) -> Result<Json<CsvPreviewResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(pcinv_api::preview_import(
        &mut persistence,
        &actor,
        &req,
    )?))
}

/// Handler for POST `/api/import`.
async fn handle_import(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Json(req): Json<CsvImportRequest>,
) -> Result<Json<CsvImportResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(pcinv_api::import_hardware(
        &mut persistence,
        &actor,
        &req,
    )?))
}

// ========================================================================
// Users
// ========================================================================

/// Handler for GET `/api/users`.
async fn handle_list_users(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
) -> Result<Json<ListUsersResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(pcinv_api::list_users(&mut persistence, &actor)?))
}

/// Handler for POST `/api/users`.
async fn handle_create_user(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<CreateUserResponse>), HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: CreateUserResponse = pcinv_api::create_user(&mut persistence, &actor, &req)?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Handler for PUT `/api/users/{id}`.
async fn handle_update_user(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Path(user_id): Path<i64>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<UserInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(pcinv_api::update_user(
        &mut persistence,
        &actor,
        user_id,
        &req,
    )?))
}

/// Handler for DELETE `/api/users/{id}`.
async fn handle_delete_user(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Path(user_id): Path<i64>,
) -> Result<Json<MessageResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(pcinv_api::delete_user(
        &mut persistence,
        &actor,
        user_id,
    )?))
}

/// Handler for POST `/api/users/{id}/password`.
async fn handle_reset_password(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Path(user_id): Path<i64>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(pcinv_api::reset_password(
        &mut persistence,
        &actor,
        user_id,
        &req,
    )?))
}

/// Handler for POST `/api/me/password`.
///
/// Every session of the user ends, so the cookie is cleared as well.
async fn handle_change_password(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Response, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: MessageResponse = pcinv_api::change_password(&mut persistence, &actor, &req)?;
    Ok(([(header::SET_COOKIE, clear_session_cookie())], Json(response)).into_response())
}

// ========================================================================
// Backup & Restore
// ========================================================================

/// Handler for GET `/api/backup`.
async fn handle_download_backup(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
) -> Result<Response, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let download: FileDownload = pcinv_api::download_backup(&mut persistence, &actor)?;
    Ok(download_response(download))
}

/// Handler for POST `/api/backup/restore`.
///
/// A restore ends every session, so the cookie is cleared as well.
async fn handle_restore_backup(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Json(req): Json<RestoreBackupRequest>,
) -> Result<Response, HttpError> {
    warn!(user_id = actor.user_id, "Handling database restore request");
    let mut persistence = app_state.persistence.lock().await;
    let response: RestoreBackupResponse =
        pcinv_api::restore_backup(&mut persistence, &actor, &req)?;
    Ok(([(header::SET_COOKIE, clear_session_cookie())], Json(response)).into_response())
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    let upload_limit: DefaultBodyLimit = DefaultBodyLimit::max(app_state.config.max_upload_bytes);

    Router::new()
        .route("/api/bootstrap/status", get(handle_bootstrap_status))
        .route("/api/bootstrap/admin", post(handle_create_first_admin))
        .route("/api/auth/login", post(handle_login))
        .route("/api/auth/logout", post(handle_logout))
        .route("/api/auth/whoami", get(handle_whoami))
        .route("/api/dashboard", get(handle_dashboard))
        .route(
            "/api/categories",
            get(handle_list_categories).post(handle_create_category),
        )
        .route(
            "/api/categories/{id}",
            get(handle_get_category)
                .put(handle_rename_category)
                .delete(handle_delete_category),
        )
        .route(
            "/api/hardware",
            get(handle_list_hardware).post(handle_create_hardware),
        )
        .route("/api/hardware/batch/delete", post(handle_batch_delete))
        .route("/api/hardware/batch/status", post(handle_batch_status))
        .route(
            "/api/hardware/{id}",
            get(handle_get_hardware)
                .put(handle_update_hardware)
                .delete(handle_delete_hardware),
        )
        .route("/api/hardware/{id}/status", post(handle_move_status))
        .route("/api/hardware/{id}/restore", post(handle_restore_hardware))
        .route("/api/hardware/{id}/purge", post(handle_purge_hardware))
        .route("/api/history", get(handle_list_history))
        .route("/api/history/export", get(handle_export_history))
        .route("/api/export", get(handle_export_hardware))
        .route(
            "/api/import/preview",
            post(handle_preview_import).layer(upload_limit),
        )
        .route("/api/import", post(handle_import).layer(upload_limit))
        .route(
            "/api/users",
            get(handle_list_users).post(handle_create_user),
        )
        .route(
            "/api/users/{id}",
            axum::routing::put(handle_update_user).delete(handle_delete_user),
        )
        .route("/api/users/{id}/password", post(handle_reset_password))
        .route("/api/me/password", post(handle_change_password))
        .route("/api/backup", get(handle_download_backup))
        .route(
            "/api/backup/restore",
            post(handle_restore_backup).layer(upload_limit),
        )
        .with_state(app_state)
}

/// Runs the presence sweep on a fixed interval for the life of the server.
fn spawn_presence_sweeper(app_state: AppState) {
    tokio::spawn(async move {
        let mut ticker: tokio::time::Interval =
            tokio::time::interval(app_state.config.sweep_interval);
        loop {
            ticker.tick().await;
            let mut persistence = app_state.persistence.lock().await;
            if let Err(e) = pcinv_api::sweep_presence(
                &mut persistence,
                OffsetDateTime::now_utc(),
                app_state.config.presence_timeout,
            ) {
                warn!(error = %e, "Presence sweep failed");
            }
        }
    });
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing PC Inventory Server");

    let persistence: Persistence = if let Some(url) = &args.mysql_url {
        info!("Using MySQL database");
        Persistence::new_with_mysql(url)?
    } else if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        Persistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        Persistence::new_in_memory()?
    };

    let app_state: AppState = AppState {
        persistence: Arc::new(Mutex::new(persistence)),
        config: ServerConfig::from_args(&args),
    };

    spawn_presence_sweeper(app_state.clone());

    // Build router
    let app: Router = build_router(app_state);

    // Bind to address
    let addr: std::net::SocketAddr = format!("{}:{}", args.bind, args.port).parse()?;
    info!("Server listening on {}", addr);

    // Run server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
