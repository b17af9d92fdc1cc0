// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Authentication and authorization types and services.

use std::str::FromStr;

use pcinv_domain::{Role, format_timestamp, now_timestamp};
use pcinv_history::Actor;
use pcinv_persistence::{Persistence, PersistenceError, SessionData, UserData};
use time::{Duration, OffsetDateTime};
use tracing::{debug, info, warn};

use crate::error::AuthError;

/// The message returned for every failed login.
///
/// It never says whether the username or the password was wrong.
pub const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// An authenticated user with an associated role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedActor {
    /// The user's database ID.
    pub user_id: i64,
    /// The normalized username.
    pub username: String,
    /// The user's full name, copied onto history rows.
    pub full_name: String,
    /// The role assigned to this user.
    pub role: Role,
}

impl AuthenticatedActor {
    /// Creates a new authenticated actor.
    #[must_use]
    pub const fn new(user_id: i64, username: String, full_name: String, role: Role) -> Self {
        Self {
            user_id,
            username,
            full_name,
            role,
        }
    }

    /// Builds an actor from a stored user row.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored role is not recognized.
    pub fn from_user(user: &UserData) -> Result<Self, AuthError> {
        let role: Role = Role::from_str(&user.role).map_err(|e| AuthError::Internal {
            message: format!("User {} has an invalid stored role: {e}", user.user_id),
        })?;
        Ok(Self::new(
            user.user_id,
            user.username.clone(),
            user.full_name.clone(),
            role,
        ))
    }

    /// Returns `true` if this actor has the admin role.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }

    /// Converts this actor into the history actor recorded on audit rows.
    #[must_use]
    pub fn to_history_actor(&self) -> Actor {
        Actor::new(Some(self.user_id), self.full_name.clone())
    }
}

/// Authorization service for enforcing role-based access control.
pub struct AuthorizationService;

impl AuthorizationService {
    /// Checks that an actor holds the admin role.
    ///
    /// # Arguments
    ///
    /// * `actor` - The authenticated actor
    /// * `action` - The action being attempted, reported on failure
    ///
    /// # Errors
    ///
    /// Returns an error if the actor does not have the Admin role.
    pub fn require_admin(actor: &AuthenticatedActor, action: &str) -> Result<(), AuthError> {
        match actor.role {
            Role::Admin => Ok(()),
            Role::Staff => Err(AuthError::Unauthorized {
                action: action.to_string(),
                required_role: String::from("Admin"),
            }),
        }
    }
}

/// The result of a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    /// The new session token.
    pub session_token: String,
    /// When the session expires.
    pub expires_at: String,
    /// The authenticated actor.
    pub actor: AuthenticatedActor,
}

/// Authentication service for session-based authentication.
pub struct AuthenticationService;

impl AuthenticationService {
    /// Authenticates a user and creates a session.
    ///
    /// # Arguments
    ///
    /// * `persistence` - The persistence layer
    /// * `username` - The username as typed; matched ignoring case
    /// * `password` - The plain-text password
    /// * `session_ttl` - How long the new session stays valid
    ///
    /// # Errors
    ///
    /// Returns `AuthenticationFailed` with [`INVALID_CREDENTIALS`] when the
    /// username is unknown or the password is wrong. Database failures
    /// return `Internal`.
    pub fn login(
        persistence: &mut Persistence,
        username: &str,
        password: &str,
        session_ttl: Duration,
    ) -> Result<LoginOutcome, AuthError> {
        let normalized: String = username.trim().to_lowercase();
        let Some(user) = persistence
            .get_user_by_username(&normalized)
            .map_err(Self::map_persistence_error)?
        else {
            info!(username = %normalized, "Login rejected: unknown username");
            return Err(Self::invalid_credentials());
        };

        let verified: bool = persistence
            .verify_password(password, &user.password_hash)
            .unwrap_or_else(|e| {
                warn!(user_id = user.user_id, error = %e, "Stored password hash is unreadable");
                false
            });
        if !verified {
            info!(user_id = user.user_id, "Login rejected: wrong password");
            return Err(Self::invalid_credentials());
        }

        let actor: AuthenticatedActor = AuthenticatedActor::from_user(&user)?;
        let now: OffsetDateTime = OffsetDateTime::now_utc();
        let now_str: String = format_timestamp(now).map_err(|e| AuthError::Internal {
            message: e.to_string(),
        })?;
        let expires_at: String =
            format_timestamp(now + session_ttl).map_err(|e| AuthError::Internal {
                message: e.to_string(),
            })?;

        let session_token: String = Self::generate_session_token();
        persistence
            .create_session(&session_token, user.user_id, &now_str, &expires_at)
            .map_err(Self::map_persistence_error)?;
        persistence
            .mark_login(user.user_id, &now_str)
            .map_err(Self::map_persistence_error)?;

        info!(user_id = user.user_id, username = %user.username, "User logged in");

        Ok(LoginOutcome {
            session_token,
            expires_at,
            actor,
        })
    }

    /// Validates a session token and returns the authenticated actor.
    ///
    /// A valid session refreshes both the session's and the user's
    /// last-activity timestamps. Expired sessions are deleted.
    ///
    /// # Returns
    ///
    /// A tuple of (`authenticated_actor`, `user_data`)
    ///
    /// # Errors
    ///
    /// Returns an error if the session is unknown or expired, or if its
    /// user no longer exists.
    pub fn validate_session(
        persistence: &mut Persistence,
        session_token: &str,
    ) -> Result<(AuthenticatedActor, UserData), AuthError> {
        let session: SessionData = persistence
            .get_session_by_token(session_token)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from("Invalid session token"),
            })?;

        let now: String = now_timestamp().map_err(|e| AuthError::Internal {
            message: e.to_string(),
        })?;
        if session.expires_at <= now {
            debug!(session_id = session.session_id, "Session expired");
            persistence
                .delete_session(session_token)
                .map_err(Self::map_persistence_error)?;
            return Err(AuthError::AuthenticationFailed {
                reason: String::from("Session expired"),
            });
        }

        let user: UserData = persistence
            .get_user_by_id(session.user_id)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from("User not found"),
            })?;
        let actor: AuthenticatedActor = AuthenticatedActor::from_user(&user)?;

        persistence
            .update_session_activity(session.session_id, &now)
            .map_err(Self::map_persistence_error)?;
        persistence
            .touch_user_activity(user.user_id, &now)
            .map_err(Self::map_persistence_error)?;

        Ok((actor, user))
    }

    /// Logs out by deleting the session.
    ///
    /// The user's presence is cleared only when this was their last unexpired
    /// session. Unknown tokens are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be updated.
    pub fn logout(persistence: &mut Persistence, session_token: &str) -> Result<(), AuthError> {
        let now: String = now_timestamp().map_err(|e| AuthError::Internal {
            message: e.to_string(),
        })?;
        if let Some(user_id) = persistence
            .end_session(session_token, &now)
            .map_err(Self::map_persistence_error)?
        {
            info!(user_id, "User logged out");
        }

        Ok(())
    }

    /// Generates a 256-bit random session token as lowercase hex.
    #[must_use]
    pub fn generate_session_token() -> String {
        (0..4).fold(String::with_capacity(64), |mut token, _| {
            token.push_str(&format!("{:016x}", rand::random::<u64>()));
            token
        })
    }

    fn invalid_credentials() -> AuthError {
        AuthError::AuthenticationFailed {
            reason: String::from(INVALID_CREDENTIALS),
        }
    }

    /// Maps persistence errors to authentication errors.
    fn map_persistence_error(err: PersistenceError) -> AuthError {
        AuthError::Internal {
            message: format!("Database error: {err}"),
        }
    }
}
