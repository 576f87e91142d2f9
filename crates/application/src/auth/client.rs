//! Login, refresh and logout against the identity endpoints.

use std::sync::Arc;

use petmanager_domain::{ApiRequest, AuthError, Credentials, TokenPair, token_preview};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use super::guard::DEFAULT_LOGIN_PATH;
use super::token_store::TokenStore;
use crate::ports::HttpTransport;

/// Login endpoint, relative to the API base URL.
pub const LOGIN_ENDPOINT: &str = "/autenticacao/login";
/// Refresh endpoint, relative to the API base URL.
pub const REFRESH_ENDPOINT: &str = "/autenticacao/refresh";

const EVENT_CAPACITY: usize = 16;

/// Session lifecycle events for the UI layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    /// Login succeeded.
    LoggedIn {
        /// Preview of the new access token.
        token_preview: String,
        /// Seconds until expiry, if the server said.
        expires_in: Option<u64>,
    },
    /// The token pair was refreshed.
    Refreshed {
        /// Preview of the new access token.
        token_preview: String,
        /// Seconds until expiry, if the server said.
        expires_in: Option<u64>,
    },
    /// The session ended; the UI should navigate to `redirect_to`.
    LoggedOut {
        /// Route of the login screen.
        redirect_to: String,
    },
}

impl AuthEvent {
    fn for_pair(pair: &TokenPair, refreshed: bool) -> Self {
        let token_preview = token_preview(&pair.access_token);
        let expires_in = (pair.access_expires_in_seconds > 0).then_some(pair.access_expires_in_seconds);
        if refreshed {
            Self::Refreshed {
                token_preview,
                expires_in,
            }
        } else {
            Self::LoggedIn {
                token_preview,
                expires_in,
            }
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

/// Talks to the identity endpoints and keeps the token store current.
///
/// Token requests go straight to the transport, never through the
/// interceptor, so a rejected login or refresh cannot trigger another
/// refresh.
pub struct AuthClient {
    store: Arc<TokenStore>,
    transport: Arc<dyn HttpTransport>,
    events: broadcast::Sender<AuthEvent>,
    login_path: String,
}

impl AuthClient {
    /// Creates a client that redirects to the default login route.
    #[must_use]
    pub fn new(store: Arc<TokenStore>, transport: Arc<dyn HttpTransport>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            store,
            transport,
            events,
            login_path: DEFAULT_LOGIN_PATH.to_string(),
        }
    }

    /// Sets the route announced on logout.
    #[must_use]
    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    /// Returns the token store this client writes to.
    #[must_use]
    pub const fn token_store(&self) -> &Arc<TokenStore> {
        &self.store
    }

    /// Subscribes to lifecycle events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    /// Returns true if a refresh token is stored.
    #[must_use]
    pub fn has_refresh_token(&self) -> bool {
        self.store.refresh_token().is_some()
    }

    /// Exchanges credentials for a token pair and installs it.
    ///
    /// # Errors
    ///
    /// Returns the failure unchanged; the store is left as it was.
    pub async fn login(&self, credentials: &Credentials) -> Result<TokenPair, AuthError> {
        let request = ApiRequest::post(LOGIN_ENDPOINT)
            .with_json(credentials)
            .map_err(|e| AuthError::InvalidRequest {
                message: e.to_string(),
            })?;

        let pair = self.exchange(&request).await.inspect_err(|err| {
            warn!(username = %credentials.username, error = %err, "login failed");
        })?;

        self.store.apply_token_pair(&pair);
        info!(
            username = %credentials.username,
            token = %token_preview(&pair.access_token),
            "logged in"
        );
        self.emit(AuthEvent::for_pair(&pair, false));
        Ok(pair)
    }

    /// Exchanges the stored refresh token for a new pair.
    ///
    /// On any failure after the request was attempted the session is
    /// logged out before the error is returned.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NoRefreshToken` without contacting the server
    /// when none is stored, otherwise the exchange failure.
    pub async fn refresh(&self) -> Result<TokenPair, AuthError> {
        let Some(refresh_token) = self.store.refresh_token() else {
            debug!("refresh requested without a refresh token");
            return Err(AuthError::NoRefreshToken);
        };

        let result = match ApiRequest::put(REFRESH_ENDPOINT).with_json(&RefreshRequest {
            refresh_token: &refresh_token,
        }) {
            Ok(request) => self.exchange(&request).await,
            Err(err) => Err(AuthError::InvalidRequest {
                message: err.to_string(),
            }),
        };

        match result {
            Ok(pair) => {
                self.store.apply_token_pair(&pair);
                info!(token = %token_preview(&pair.access_token), "token refreshed");
                self.emit(AuthEvent::for_pair(&pair, true));
                Ok(pair)
            }
            Err(err) => {
                warn!(error = %err, "token refresh failed, logging out");
                self.logout();
                Err(err)
            }
        }
    }

    /// Ends the session and announces the login route. Idempotent.
    pub fn logout(&self) {
        self.store.clear();
        info!(redirect_to = %self.login_path, "logged out");
        self.emit(AuthEvent::LoggedOut {
            redirect_to: self.login_path.clone(),
        });
    }

    async fn exchange(&self, request: &ApiRequest) -> Result<TokenPair, AuthError> {
        debug!(request_id = %request.id, path = %request.path, "token exchange");

        let response = self
            .transport
            .send(request)
            .await
            .map_err(|e| AuthError::Network {
                message: e.to_string(),
            })?;

        if !response.is_success() {
            return Err(AuthError::Rejected {
                status: response.status.as_u16(),
                message: response.summary(),
            });
        }

        response
            .json_body::<TokenPair>()
            .map_err(|e| AuthError::InvalidResponse {
                message: e.to_string(),
            })
    }

    fn emit(&self, event: AuthEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

impl std::fmt::Debug for AuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthClient")
            .field("store", &self.store)
            .field("login_path", &self.login_path)
            .finish_non_exhaustive()
    }
}
