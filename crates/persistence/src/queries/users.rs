// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! User and session queries.
//!
//! This module contains backend-agnostic queries for retrieving users
//! and sessions. All queries use Diesel DSL and work across all supported
//! database backends.

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use tracing::debug;

use crate::data_models::{SessionData, UserData, UserRecord};
use crate::diesel_schema::{sessions, users};
use crate::error::PersistenceError;

/// Diesel Queryable struct for session rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = sessions)]
struct SessionRow {
    session_id: i64,
    session_token: String,
    user_id: i64,
    created_at: String,
    last_activity_at: String,
    expires_at: String,
}

fn user_from_record(row: UserRecord) -> UserData {
    UserData {
        user_id: row.user_id,
        username: row.username,
        full_name: row.full_name,
        password_hash: row.password_hash,
        role: row.role,
        created_at: row.created_at,
        last_login_at: row.last_login_at,
        last_activity_at: row.last_activity_at,
        is_active: row.is_active != 0,
        session_started_at: row.session_started_at,
    }
}

backend_fn! {
/// Retrieves a user by username.
///
/// The `username` is normalized to lowercase for case-insensitive lookup.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the user is not found.
pub fn get_user_by_username(
    conn: &mut _,
    username: &str,
) -> Result<Option<UserData>, PersistenceError> {
    let normalized: String = username.trim().to_lowercase();

    debug!("Looking up user by username: {}", normalized);

    let result: Result<UserRecord, diesel::result::Error> = users::table
        .filter(users::username.eq(&normalized))
        .select(UserRecord::as_select())
        .first(conn);

    match result {
        Ok(row) => Ok(Some(user_from_record(row))),
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(PersistenceError::from(e)),
    }
}
}

backend_fn! {
/// Retrieves a user by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the user is not found.
pub fn get_user_by_id(conn: &mut _, user_id: i64) -> Result<Option<UserData>, PersistenceError> {
    debug!("Looking up user by ID: {}", user_id);

    let result: Result<UserRecord, diesel::result::Error> = users::table
        .filter(users::user_id.eq(user_id))
        .select(UserRecord::as_select())
        .first(conn);

    match result {
        Ok(row) => Ok(Some(user_from_record(row))),
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(PersistenceError::from(e)),
    }
}
}

backend_fn! {
/// Lists all users ordered by username.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_users(conn: &mut _) -> Result<Vec<UserData>, PersistenceError> {
    debug!("Listing all users");

    let rows: Vec<UserRecord> = users::table
        .select(UserRecord::as_select())
        .order_by(users::username.asc())
        .load(conn)?;

    Ok(rows.into_iter().map(user_from_record).collect())
}
}

backend_fn! {
/// Lists users whose presence flag is set, most recently active first.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_active_users(conn: &mut _) -> Result<Vec<UserData>, PersistenceError> {
    let rows: Vec<UserRecord> = users::table
        .filter(users::is_active.eq(1))
        .select(UserRecord::as_select())
        .order_by(users::last_activity_at.desc())
        .load(conn)?;

    Ok(rows.into_iter().map(user_from_record).collect())
}
}

backend_fn! {
/// Counts the total number of users.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn count_users(conn: &mut _) -> Result<i64, PersistenceError> {
    use diesel::dsl::count;

    let count: i64 = users::table.select(count(users::user_id)).first(conn)?;

    debug!("Total users: {}", count);
    Ok(count)
}
}

backend_fn! {
/// Counts the number of users with the admin role.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn count_admins(conn: &mut _) -> Result<i64, PersistenceError> {
    use diesel::dsl::count;

    let count: i64 = users::table
        .filter(users::role.eq("admin"))
        .select(count(users::user_id))
        .first(conn)?;

    debug!("Admin users: {}", count);
    Ok(count)
}
}

backend_fn! {
/// Retrieves a session by token.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the session is not found.
pub fn get_session_by_token(
    conn: &mut _,
    session_token: &str,
) -> Result<Option<SessionData>, PersistenceError> {
    debug!("Looking up session by token");

    let result: Result<SessionRow, diesel::result::Error> = sessions::table
        .filter(sessions::session_token.eq(session_token))
        .select(SessionRow::as_select())
        .first(conn);

    match result {
        Ok(row) => Ok(Some(SessionData {
            session_id: row.session_id,
            session_token: row.session_token,
            user_id: row.user_id,
            created_at: row.created_at,
            last_activity_at: row.last_activity_at,
            expires_at: row.expires_at,
        })),
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(PersistenceError::from(e)),
    }
}
}

/// Verifies a password against a stored hash.
///
/// This is a backend-agnostic utility function that uses bcrypt.
///
/// # Errors
///
/// Returns an error if the stored hash is malformed.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, PersistenceError> {
    bcrypt::verify(password, password_hash)
        .map_err(|e| PersistenceError::Other(format!("Failed to verify password: {e}")))
}
