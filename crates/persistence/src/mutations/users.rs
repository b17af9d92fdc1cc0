// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! User, presence, and session mutations.
//!
//! Presence is tracked on the user row: `is_active` is raised on login and on
//! every authenticated request, and lowered when the user's last session ends
//! or by the idle sweep.
//! `session_started_at` marks the start of the current presence period and is
//! what the dashboard measures online durations from.

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use tracing::{debug, info};

use crate::backend::PersistenceBackend;
use crate::diesel_schema::{sessions, users};
use crate::error::PersistenceError;

backend_fn! {
/// Creates a new user.
///
/// The `username` is normalized to lowercase.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `username` - The login name (will be normalized)
/// * `full_name` - The display name
/// * `password` - The plain-text password (will be hashed)
/// * `role` - The stored role string
/// * `cost` - The bcrypt cost factor
/// * `now` - The creation timestamp
///
/// # Errors
///
/// Returns `PersistenceError::UniqueViolation` if the username is taken, or
/// another error if the user cannot be created.
#[allow(clippy::too_many_arguments)]
pub fn create_user(
    conn: &mut _,
    username: &str,
    full_name: &str,
    password: &str,
    role: &str,
    cost: u32,
    now: &str,
) -> Result<i64, PersistenceError> {
    let normalized: String = username.trim().to_lowercase();

    info!(username = %normalized, role, "Creating user");

    let password_hash: String = bcrypt::hash(password, cost)?;

    diesel::insert_into(users::table)
        .values((
            users::username.eq(&normalized),
            users::password_hash.eq(&password_hash),
            users::full_name.eq(full_name.trim()),
            users::role.eq(role),
            users::created_at.eq(now),
            users::is_active.eq(0),
        ))
        .execute(conn)?;

    let user_id: i64 = conn.get_last_insert_rowid()?;

    info!(user_id, "User created");
    Ok(user_id)
}
}

backend_fn! {
/// Updates a user's full name and role.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the user does not exist.
pub fn update_user(
    conn: &mut _,
    user_id: i64,
    full_name: &str,
    role: &str,
) -> Result<(), PersistenceError> {
    info!(user_id, role, "Updating user");

    let rows_affected: usize = diesel::update(users::table)
        .filter(users::user_id.eq(user_id))
        .set((users::full_name.eq(full_name.trim()), users::role.eq(role)))
        .execute(conn)?;

    if rows_affected == 0 {
        return Err(PersistenceError::NotFound(format!(
            "User with ID {user_id} not found"
        )));
    }
    Ok(())
}
}

backend_fn! {
/// Replaces a user's password and ends every session they hold.
///
/// Both writes run in one transaction, so a failure leaves the old password
/// and the old sessions in place together.
///
/// # Returns
///
/// The number of sessions deleted.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the user does not exist, or an
/// error if hashing or either write fails.
pub fn update_password(
    conn: &mut _,
    user_id: i64,
    password: &str,
    cost: u32,
) -> Result<usize, PersistenceError> {
    info!(user_id, "Updating password");

    let password_hash: String = bcrypt::hash(password, cost)?;

    conn.transaction::<_, PersistenceError, _>(|conn| {
        let rows_affected: usize = diesel::update(users::table)
            .filter(users::user_id.eq(user_id))
            .set(users::password_hash.eq(&password_hash))
            .execute(conn)?;

        if rows_affected == 0 {
            return Err(PersistenceError::NotFound(format!(
                "User with ID {user_id} not found"
            )));
        }

        let sessions_ended: usize = diesel::delete(sessions::table)
            .filter(sessions::user_id.eq(user_id))
            .execute(conn)?;

        info!(user_id, sessions_ended, "Password replaced and sessions ended");
        Ok(sessions_ended)
    })
}
}

backend_fn! {
/// Deletes a user.
///
/// Their sessions are removed by cascade. History rows keep the user's name
/// and lose the user ID.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the user does not exist.
pub fn delete_user(conn: &mut _, user_id: i64) -> Result<(), PersistenceError> {
    info!(user_id, "Deleting user");

    let rows_affected: usize = diesel::delete(users::table)
        .filter(users::user_id.eq(user_id))
        .execute(conn)?;

    if rows_affected == 0 {
        return Err(PersistenceError::NotFound(format!(
            "User with ID {user_id} not found"
        )));
    }
    Ok(())
}
}

backend_fn! {
/// Records a successful login and starts a new presence period.
///
/// # Errors
///
/// Returns an error if the database update fails.
pub fn mark_login(conn: &mut _, user_id: i64, now: &str) -> Result<(), PersistenceError> {
    debug!(user_id, "Recording login");

    diesel::update(users::table)
        .filter(users::user_id.eq(user_id))
        .set((
            users::last_login_at.eq(Some(now)),
            users::last_activity_at.eq(Some(now)),
            users::is_active.eq(1),
            users::session_started_at.eq(Some(now)),
        ))
        .execute(conn)?;

    Ok(())
}
}

backend_fn! {
/// Records activity for a user.
///
/// A user marked idle by the sweep becomes active again and starts a new
/// presence period.
///
/// # Errors
///
/// Returns an error if the database update fails.
pub fn touch_user_activity(conn: &mut _, user_id: i64, now: &str) -> Result<(), PersistenceError> {
    diesel::update(users::table)
        .filter(users::user_id.eq(user_id))
        .set((users::last_activity_at.eq(Some(now)), users::is_active.eq(1)))
        .execute(conn)?;

    diesel::update(users::table)
        .filter(users::user_id.eq(user_id))
        .filter(users::session_started_at.is_null())
        .set(users::session_started_at.eq(Some(now)))
        .execute(conn)?;

    Ok(())
}
}

backend_fn! {
/// Clears presence for every active user whose last activity is older
/// than `cutoff`.
///
/// # Returns
///
/// The number of users marked idle.
///
/// # Errors
///
/// Returns an error if the database update fails.
pub fn reset_idle_presence(conn: &mut _, cutoff: &str) -> Result<usize, PersistenceError> {
    let rows_affected: usize = diesel::update(users::table)
        .filter(users::is_active.eq(1))
        .filter(
            users::last_activity_at
                .lt(cutoff)
                .or(users::last_activity_at.is_null()),
        )
        .set((
            users::is_active.eq(0),
            users::session_started_at.eq(None::<String>),
        ))
        .execute(conn)?;

    if rows_affected > 0 {
        info!(rows_affected, cutoff, "Marked idle users inactive");
    }
    Ok(rows_affected)
}
}

backend_fn! {
/// Creates a new session.
///
/// # Errors
///
/// Returns an error if the session cannot be created.
pub fn create_session(
    conn: &mut _,
    session_token: &str,
    user_id: i64,
    now: &str,
    expires_at: &str,
) -> Result<i64, PersistenceError> {
    debug!(user_id, expires_at, "Creating session");

    diesel::insert_into(sessions::table)
        .values((
            sessions::session_token.eq(session_token),
            sessions::user_id.eq(user_id),
            sessions::created_at.eq(now),
            sessions::last_activity_at.eq(now),
            sessions::expires_at.eq(expires_at),
        ))
        .execute(conn)?;

    let session_id: i64 = conn.get_last_insert_rowid()?;

    info!(session_id, user_id, "Session created");
    Ok(session_id)
}
}

backend_fn! {
/// Updates the last activity timestamp of a session.
///
/// # Errors
///
/// Returns an error if the database update fails.
pub fn update_session_activity(
    conn: &mut _,
    session_id: i64,
    now: &str,
) -> Result<(), PersistenceError> {
    diesel::update(sessions::table)
        .filter(sessions::session_id.eq(session_id))
        .set(sessions::last_activity_at.eq(now))
        .execute(conn)?;

    Ok(())
}
}

backend_fn! {
/// Deletes a session by token.
///
/// Deleting a token that does not exist is not an error.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn delete_session(conn: &mut _, session_token: &str) -> Result<(), PersistenceError> {
    diesel::delete(sessions::table)
        .filter(sessions::session_token.eq(session_token))
        .execute(conn)?;

    debug!("Deleted session");
    Ok(())
}
}

backend_fn! {
/// Ends one session and clears the owner's presence if it was their last.
///
/// Presence stays up while the user still holds another unexpired session,
/// such as one in a second browser.
///
/// # Returns
///
/// The ID of the user who owned the session, or `None` for an unknown token.
///
/// # Errors
///
/// Returns an error if a database operation fails. Nothing is changed in
/// that case.
pub fn end_session(
    conn: &mut _,
    session_token: &str,
    now: &str,
) -> Result<Option<i64>, PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        let owner: Option<i64> = sessions::table
            .filter(sessions::session_token.eq(session_token))
            .select(sessions::user_id)
            .first::<i64>(conn)
            .optional()?;
        let Some(user_id) = owner else {
            return Ok(None);
        };

        diesel::delete(sessions::table)
            .filter(sessions::session_token.eq(session_token))
            .execute(conn)?;

        let remaining: i64 = sessions::table
            .filter(sessions::user_id.eq(user_id))
            .filter(sessions::expires_at.gt(now))
            .count()
            .get_result(conn)?;

        if remaining == 0 {
            diesel::update(users::table)
                .filter(users::user_id.eq(user_id))
                .set((
                    users::is_active.eq(0),
                    users::session_started_at.eq(None::<String>),
                ))
                .execute(conn)?;
        }

        debug!(user_id, remaining, "Ended session");
        Ok(Some(user_id))
    })
}
}

backend_fn! {
/// Deletes every session that expired before `now`.
///
/// # Returns
///
/// The number of sessions deleted.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn delete_expired_sessions(conn: &mut _, now: &str) -> Result<usize, PersistenceError> {
    let rows_affected: usize = diesel::delete(sessions::table)
        .filter(sessions::expires_at.lt(now))
        .execute(conn)?;

    if rows_affected > 0 {
        info!(rows_affected, "Deleted expired sessions");
    }
    Ok(rows_affected)
}
}
