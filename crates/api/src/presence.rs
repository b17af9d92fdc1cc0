// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Online presence.
//!
//! A user is online from login until logout, or until they have been idle
//! longer than the presence timeout. The sweep clears stale presence flags
//! and expired sessions; the server runs it on a fixed interval.

use pcinv_domain::{format_duration, format_timestamp, seconds_between};
use pcinv_persistence::{Persistence, UserData};
use time::{Duration, OffsetDateTime};
use tracing::{debug, info};

use crate::error::{ApiError, translate_domain_error, translate_persistence_error};
use crate::request_response::OnlineUserInfo;

/// What one presence sweep cleaned up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepResult {
    /// Users marked offline for being idle.
    pub idle_users: usize,
    /// Expired sessions deleted.
    pub expired_sessions: usize,
}

/// Clears idle presence flags and deletes expired sessions.
///
/// # Arguments
///
/// * `persistence` - The persistence layer
/// * `now` - The current instant
/// * `idle_timeout` - How long a user may be inactive before going offline
///
/// # Errors
///
/// Returns an error if a timestamp cannot be formatted or a write fails.
pub fn sweep_presence(
    persistence: &mut Persistence,
    now: OffsetDateTime,
    idle_timeout: Duration,
) -> Result<SweepResult, ApiError> {
    let cutoff: String = format_timestamp(now - idle_timeout).map_err(translate_domain_error)?;
    let now_str: String = format_timestamp(now).map_err(translate_domain_error)?;

    let idle_users: usize = persistence
        .reset_idle_presence(&cutoff)
        .map_err(translate_persistence_error)?;
    let expired_sessions: usize = persistence
        .delete_expired_sessions(&now_str)
        .map_err(translate_persistence_error)?;

    if idle_users > 0 || expired_sessions > 0 {
        info!(idle_users, expired_sessions, "Presence sweep");
    } else {
        debug!("Presence sweep found nothing to clear");
    }

    Ok(SweepResult {
        idle_users,
        expired_sessions,
    })
}

fn online_user(user: UserData, now: &str) -> Result<OnlineUserInfo, ApiError> {
    let since: Option<&str> = user
        .session_started_at
        .as_deref()
        .or(user.last_login_at.as_deref());
    let online_seconds: i64 = match since {
        Some(start) => seconds_between(start, now)
            .map_err(translate_domain_error)?
            .max(0),
        None => 0,
    };

    Ok(OnlineUserInfo {
        user_id: user.user_id,
        username: user.username,
        full_name: user.full_name,
        role: user.role,
        session_started_at: user.session_started_at,
        last_activity_at: user.last_activity_at,
        online_seconds,
        online_for: format_duration(online_seconds),
    })
}

/// Lists users currently online with the length of their presence period.
///
/// # Errors
///
/// Returns an error if the query fails or a stored timestamp is malformed.
pub fn online_users(
    persistence: &mut Persistence,
    now: &str,
) -> Result<Vec<OnlineUserInfo>, ApiError> {
    persistence
        .list_active_users()
        .map_err(translate_persistence_error)?
        .into_iter()
        .map(|user| online_user(user, now))
        .collect()
}
