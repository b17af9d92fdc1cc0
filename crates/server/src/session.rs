// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Session extraction for the server.
//!
//! This module provides the Axum extractor that validates session tokens
//! and the helpers that write and clear the session cookie.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{HeaderMap, StatusCode, header, request::Parts},
    response::{IntoResponse, Response},
};
use pcinv_api::{AuthError, AuthenticatedActor, AuthenticationService};
use pcinv_persistence::UserData;
use time::Duration;
use tracing::{debug, error, warn};

use crate::{AppState, ErrorResponse};

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "pcinv_session";

/// Extractor for authenticated users.
///
/// # Usage
///
/// ```ignore
/// async fn my_handler(
///     SessionUser(actor, user): SessionUser,
/// ) -> Result<Json<Response>, HttpError> {
///     // actor: AuthenticatedActor
///     // user: UserData
///     Ok(Json(Response { ... }))
/// }
/// ```
///
/// # Authentication Flow
///
/// 1. Take the token from `Authorization: Bearer <token>`, or else from the
///    `pcinv_session` cookie
/// 2. Validate it via `AuthenticationService::validate_session`, which also
///    checks expiry and records activity
/// 3. Return `AuthenticatedActor` and `UserData`
///
/// # Errors
///
/// Returns HTTP 401 Unauthorized if no token is present, or the session is
/// unknown or expired. Returns HTTP 500 if the session store cannot be read.
pub struct SessionUser(pub AuthenticatedActor, pub UserData);

impl FromRequestParts<AppState> for SessionUser {
    type Rejection = SessionError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token: String = session_token(&parts.headers)?;

        let mut persistence = state.persistence.lock().await;
        let (actor, user) = AuthenticationService::validate_session(&mut persistence, &token)
            .map_err(SessionError::from)?;

        debug!(
            user_id = actor.user_id,
            role = %actor.role,
            "Session validated"
        );

        Ok(Self(actor, user))
    }
}

/// Reads the session token from the request headers.
///
/// The `Authorization` header wins over the cookie when both are present.
///
/// # Errors
///
/// Returns an error if neither carries a token, or the header is malformed.
pub fn session_token(headers: &HeaderMap) -> Result<String, SessionError> {
    if let Some(value) = headers.get(header::AUTHORIZATION) {
        let value: &str = value.to_str().map_err(|_| {
            warn!("Invalid Authorization header encoding");
            SessionError::InvalidAuthorizationHeader
        })?;
        return value
            .strip_prefix("Bearer ")
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                warn!("Authorization header does not start with 'Bearer '");
                SessionError::InvalidAuthorizationHeader
            });
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
        .ok_or(SessionError::MissingToken)
}

/// Builds the `Set-Cookie` value for a new session.
#[must_use]
pub fn session_cookie(token: &str, ttl: Duration) -> String {
    format!(
        "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Strict; Max-Age={}",
        ttl.whole_seconds()
    )
}

/// Builds the `Set-Cookie` value that removes the session cookie.
#[must_use]
pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Strict; Max-Age=0")
}

/// Session extraction errors.
#[derive(Debug)]
pub enum SessionError {
    /// No bearer token and no session cookie.
    MissingToken,
    /// Authorization header format is invalid.
    InvalidAuthorizationHeader,
    /// Session validation failed.
    InvalidSession(String),
    /// The session store could not be read or written.
    Internal(String),
}

impl From<AuthError> for SessionError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Internal { .. } => {
                error!(error = %err, "Session lookup failed");
                Self::Internal(err.to_string())
            }
            AuthError::AuthenticationFailed { .. } | AuthError::Unauthorized { .. } => {
                debug!(error = %err, "Session validation failed");
                Self::InvalidSession(err.to_string())
            }
        }
    }
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        let (status, message): (StatusCode, String) = match self {
            Self::MissingToken => (StatusCode::UNAUTHORIZED, String::from("Not logged in")),
            Self::InvalidAuthorizationHeader => (
                StatusCode::UNAUTHORIZED,
                String::from("Invalid Authorization header format. Expected: 'Bearer <token>'"),
            ),
            Self::InvalidSession(reason) => (StatusCode::UNAUTHORIZED, reason),
            Self::Internal(reason) => (StatusCode::INTERNAL_SERVER_ERROR, reason),
        };

        (
            status,
            Json(ErrorResponse {
                error: true,
                message,
            }),
        )
            .into_response()
    }
}
