//! Authentication state and token types

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Username recorded for every session. The identity endpoint does not
/// echo who logged in, so the client cannot know better.
pub const PLACEHOLDER_USERNAME: &str = "user";

/// Username/password pair submitted to the login endpoint.
///
/// Never persisted. `Debug` redacts the password.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Account name.
    pub username: String,
    /// Account password.
    pub password: String,
}

impl Credentials {
    /// Creates a new credentials pair.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Tokens returned by a successful login or refresh exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// Bearer token attached to API requests.
    #[serde(rename = "access_token")]
    pub access_token: String,
    /// Token exchanged for a new pair once the access token expires.
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
    /// Lifetime of the access token in seconds.
    #[serde(rename = "expires_in", default)]
    pub access_expires_in_seconds: u64,
    /// Lifetime of the refresh token in seconds.
    #[serde(rename = "refresh_expires_in", default)]
    pub refresh_expires_in_seconds: u64,
}

impl TokenPair {
    /// Creates a token pair.
    #[must_use]
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        access_expires_in_seconds: u64,
        refresh_expires_in_seconds: u64,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            access_expires_in_seconds,
            refresh_expires_in_seconds,
        }
    }
}

/// The user a session belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    /// Login name.
    pub username: String,
}

impl AuthenticatedUser {
    /// Creates a user record.
    #[must_use]
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }

    /// The identity derived for every acquired token pair.
    #[must_use]
    pub fn placeholder() -> Self {
        Self::new(PLACEHOLDER_USERNAME)
    }
}

/// An authenticated session: the token and the user are always set together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Current access token.
    pub access_token: String,
    /// Refresh token, if one is known.
    pub refresh_token: Option<String>,
    /// Owner of the session.
    pub user: AuthenticatedUser,
    /// When the access token expires, if known. Sessions restored from
    /// durable storage do not know their expiry.
    pub access_expires_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Builds a session from a freshly acquired token pair.
    #[must_use]
    pub fn from_token_pair(pair: &TokenPair) -> Self {
        let expires_at = (pair.access_expires_in_seconds > 0).then(|| {
            Utc::now() + chrono::Duration::seconds(pair.access_expires_in_seconds.cast_signed())
        });

        Self {
            access_token: pair.access_token.clone(),
            refresh_token: Some(pair.refresh_token.clone()),
            user: AuthenticatedUser::placeholder(),
            access_expires_at: expires_at,
        }
    }

    /// Rebuilds a session from persisted values.
    ///
    /// A missing user falls back to the placeholder identity.
    #[must_use]
    pub fn restored(
        access_token: String,
        refresh_token: Option<String>,
        user: Option<AuthenticatedUser>,
    ) -> Self {
        Self {
            access_token,
            refresh_token,
            user: user.unwrap_or_else(AuthenticatedUser::placeholder),
            access_expires_at: None,
        }
    }

    /// Seconds until the access token expires, or None if unknown.
    #[must_use]
    pub fn seconds_until_expiry(&self) -> Option<i64> {
        self.access_expires_at
            .map(|exp| (exp - Utc::now()).num_seconds())
    }

    /// Returns the Authorization header value.
    #[must_use]
    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

/// Aggregate authentication state.
///
/// `is_authenticated()` is true exactly when a session exists, and the
/// user is present exactly when the token is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    session: Option<Session>,
}

impl AuthState {
    /// The unauthenticated state.
    #[must_use]
    pub const fn unauthenticated() -> Self {
        Self { session: None }
    }

    /// State holding the given session.
    #[must_use]
    pub const fn authenticated(session: Session) -> Self {
        Self {
            session: Some(session),
        }
    }

    /// Returns the session, if any.
    #[must_use]
    pub const fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Returns the access token, if any.
    #[must_use]
    pub fn access_token(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.access_token.as_str())
    }

    /// Returns the refresh token, if any.
    #[must_use]
    pub fn refresh_token(&self) -> Option<&str> {
        self.session
            .as_ref()
            .and_then(|s| s.refresh_token.as_deref())
    }

    /// Returns the authenticated user, if any.
    #[must_use]
    pub fn user(&self) -> Option<&AuthenticatedUser> {
        self.session.as_ref().map(|s| &s.user)
    }

    /// Returns true if a session exists.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }
}

/// Authentication errors.
///
/// Cloneable so a single refresh failure can be handed to every request
/// that was waiting on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// A refresh was requested but no refresh token is stored.
    #[error("No refresh token available")]
    NoRefreshToken,

    /// The API rejected the token and no refresh was possible.
    #[error("session expired")]
    SessionExpired,

    /// The identity endpoint answered with a non-success status.
    #[error("authentication rejected ({status}): {message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated.
        message: String,
    },

    /// The identity endpoint could not be reached.
    #[error("network error: {message}")]
    Network {
        /// Error description.
        message: String,
    },

    /// The token request body could not be encoded.
    #[error("invalid token request: {message}")]
    InvalidRequest {
        /// Error description.
        message: String,
    },

    /// The identity endpoint answered with an unexpected body.
    #[error("invalid token response: {message}")]
    InvalidResponse {
        /// Error description.
        message: String,
    },

    /// The task driving a refresh was dropped before it finished.
    #[error("token refresh was abandoned before completing")]
    RefreshAbandoned,
}

/// Get a preview of a token for logging (first 8 chars + ...).
#[must_use]
pub fn token_preview(token: &str) -> String {
    if token.len() > 12 {
        let cut = token
            .char_indices()
            .nth(8)
            .map_or(token.len(), |(idx, _)| idx);
        format!("{}...", &token[..cut])
    } else {
        token.to_string()
    }
}
