//! Session state with durable persistence.
//!
//! The store is the single source of truth for the access token, the
//! refresh token and the current user. State lives in a `watch` channel so
//! every reader sees one consistent snapshot and observers get each change
//! in order. Every change is mirrored to [`DurableStorage`]; storage
//! failures are logged and otherwise ignored, the in-memory state stays
//! authoritative.

use std::sync::Arc;

use petmanager_domain::{AuthState, AuthenticatedUser, Session, TokenPair, token_preview};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::ports::{
    CURRENT_USER_KEY, DurableStorage, REFRESH_TOKEN_KEY, SESSION_KEYS, StorageEvent, TOKEN_KEY,
};

/// Thread-safe session store backed by durable storage.
pub struct TokenStore {
    state: watch::Sender<AuthState>,
    storage: Arc<dyn DurableStorage>,
}

impl TokenStore {
    /// Creates a store, restoring any session found in `storage`.
    #[must_use]
    pub fn new(storage: Arc<dyn DurableStorage>) -> Self {
        let initial = read_persisted(storage.as_ref());
        if let Some(token) = initial.access_token() {
            info!(token = %token_preview(token), "restored session from storage");
        }
        let (state, _) = watch::channel(initial);
        Self { state, storage }
    }

    /// Returns the current access token.
    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        self.state.borrow().access_token().map(str::to_owned)
    }

    /// Returns the current refresh token.
    #[must_use]
    pub fn refresh_token(&self) -> Option<String> {
        self.state.borrow().refresh_token().map(str::to_owned)
    }

    /// Returns the current user.
    #[must_use]
    pub fn current_user(&self) -> Option<AuthenticatedUser> {
        self.state.borrow().user().cloned()
    }

    /// Returns true when an access token is held.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    /// Returns a copy of the whole state.
    #[must_use]
    pub fn snapshot(&self) -> AuthState {
        self.state.borrow().clone()
    }

    /// Subscribes to state changes. The receiver starts at the current state.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    /// Installs a freshly acquired token pair and persists it.
    pub fn apply_token_pair(&self, pair: &TokenPair) {
        let session = Session::from_token_pair(pair);
        self.persist(&session);
        debug!(token = %token_preview(&session.access_token), "token pair applied");
        self.state.send_replace(AuthState::authenticated(session));
    }

    /// Drops the session and removes it from storage. Idempotent.
    pub fn clear(&self) {
        for key in SESSION_KEYS {
            if let Err(err) = self.storage.remove(key) {
                warn!(key, error = %err, "failed to remove session key from storage");
            }
        }

        let changed = self.state.send_if_modified(|state| {
            if state.is_authenticated() {
                *state = AuthState::unauthenticated();
                true
            } else {
                false
            }
        });
        if changed {
            debug!("session cleared");
        }
    }

    /// Re-reads the session from storage, after another handle changed it.
    ///
    /// Observers are only notified when the token, refresh token or user
    /// actually differ from what is held.
    pub fn reload_from_storage(&self) {
        let next = read_persisted(self.storage.as_ref());
        self.state.send_if_modified(|current| {
            let same = current.access_token() == next.access_token()
                && current.refresh_token() == next.refresh_token()
                && current.user() == next.user();
            if same {
                false
            } else {
                debug!(
                    authenticated = next.is_authenticated(),
                    "session changed in storage"
                );
                *current = next;
                true
            }
        });
    }

    /// Follows storage changes made elsewhere until `events` closes.
    pub fn watch_storage(
        self: &Arc<Self>,
        mut events: broadcast::Receiver<StorageEvent>,
    ) -> JoinHandle<()> {
        let store = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => {
                        if SESSION_KEYS.contains(&event.key.as_str()) {
                            store.reload_from_storage();
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "missed storage events, reloading session");
                        store.reload_from_storage();
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    /// Starts [`Self::watch_storage`] if the storage reports external changes.
    pub fn spawn_storage_listener(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        self.storage.subscribe().map(|events| self.watch_storage(events))
    }

    fn persist(&self, session: &Session) {
        let user = match serde_json::to_string(&session.user) {
            Ok(user) => Some(user),
            Err(err) => {
                warn!(error = %err, "failed to encode current user");
                None
            }
        };

        let writes = [
            (TOKEN_KEY, Some(session.access_token.as_str())),
            (REFRESH_TOKEN_KEY, session.refresh_token.as_deref()),
            (CURRENT_USER_KEY, user.as_deref()),
        ];

        for (key, value) in writes {
            let result = match value {
                Some(value) => self.storage.set(key, value),
                None => self.storage.remove(key),
            };
            if let Err(err) = result {
                warn!(key, error = %err, "failed to persist session key");
            }
        }
    }
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("TokenStore")
            .field("authenticated", &state.is_authenticated())
            .field("token", &state.access_token().map(token_preview))
            .finish_non_exhaustive()
    }
}

/// Reads the persisted session. A token without a stored user restores
/// with the placeholder user; no token means no session.
fn read_persisted(storage: &dyn DurableStorage) -> AuthState {
    let read = |key: &str| match storage.get(key) {
        Ok(value) => value,
        Err(err) => {
            warn!(key, error = %err, "failed to read session key from storage");
            None
        }
    };

    let Some(token) = read(TOKEN_KEY) else {
        return AuthState::unauthenticated();
    };

    let user = read(CURRENT_USER_KEY).and_then(|raw| {
        serde_json::from_str::<AuthenticatedUser>(&raw)
            .inspect_err(|err| warn!(error = %err, "stored user is not valid JSON"))
            .ok()
    });

    AuthState::authenticated(Session::restored(token, read(REFRESH_TOKEN_KEY), user))
}
