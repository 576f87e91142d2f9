//! Single-flight token refresh for requests rejected with 401.
//!
//! The first rejected request starts a refresh on its own task; requests
//! rejected while it runs queue up behind it. When the refresh lands every
//! queued request, the one that started it included, is released in
//! arrival order with the new access token and replays itself. If the
//! refresh fails every queued request receives the same error.
//!
//! The refresh task is detached from the request that started it, so a
//! caller going away never abandons a refresh the server may already have
//! honoured.
//!
//! A request that was sent with an access token other than the one now
//! held (a refresh completed in the meantime) is replayed with the current
//! token straight away instead of starting another refresh.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use petmanager_domain::{ApiRequest, ApiResponse, AuthError, token_preview};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use super::client::AuthClient;
use crate::error::ApiResult;
use crate::ports::HttpTransport;

/// Outcome handed to a queued request: the token to replay with, or why
/// there is none.
type Outcome = Result<String, AuthError>;

enum RefreshState {
    Idle,
    Refreshing {
        waiters: VecDeque<oneshot::Sender<Outcome>>,
    },
}

enum Role {
    /// Refresh started by this request.
    Drive(oneshot::Receiver<Outcome>),
    /// Queued behind a refresh already in flight.
    Wait(oneshot::Receiver<Outcome>),
    /// Token changed since the request was sent.
    Replay(String),
    /// Nothing to refresh with.
    Expired,
}

/// Coordinates recovery of requests rejected with 401.
pub struct RefreshCoordinator {
    auth: Arc<AuthClient>,
    state: Arc<Mutex<RefreshState>>,
}

impl RefreshCoordinator {
    /// Creates an idle coordinator refreshing through `auth`.
    #[must_use]
    pub fn new(auth: Arc<AuthClient>) -> Self {
        Self {
            auth,
            state: Arc::new(Mutex::new(RefreshState::Idle)),
        }
    }

    /// Returns true while a refresh is in flight.
    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        matches!(*self.state.lock(), RefreshState::Refreshing { .. })
    }

    /// Number of requests waiting on the refresh in flight, the one that
    /// started it included.
    #[must_use]
    pub fn pending_waiters(&self) -> usize {
        match &*self.state.lock() {
            RefreshState::Idle => 0,
            RefreshState::Refreshing { waiters } => waiters.len(),
        }
    }

    /// Recovers `request`, which the API rejected with 401 when sent with
    /// `sent_token`.
    ///
    /// Must be called inside a tokio runtime. The replayed response is
    /// returned as is, even a second 401.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Auth` when the session cannot be refreshed, or
    /// the transport error of the replay.
    pub async fn recover(
        &self,
        request: ApiRequest,
        sent_token: Option<&str>,
        transport: &dyn HttpTransport,
    ) -> ApiResult<ApiResponse> {
        let token = match self.claim(&request, sent_token) {
            Role::Replay(token) => {
                debug!(
                    request_id = %request.id,
                    token = %token_preview(&token),
                    "token changed since request was sent, replaying"
                );
                token
            }
            Role::Expired => {
                info!(request_id = %request.id, "401 without refresh token, ending session");
                self.auth.logout();
                return Err(AuthError::SessionExpired.into());
            }
            Role::Drive(rx) => {
                debug!(request_id = %request.id, "401 received, refreshing token");
                tokio::spawn(run_refresh(
                    Arc::clone(&self.auth),
                    Arc::clone(&self.state),
                ));
                await_outcome(rx).await?
            }
            Role::Wait(rx) => await_outcome(rx).await?,
        };

        replay(transport, &request, &token).await
    }

    fn claim(&self, request: &ApiRequest, sent_token: Option<&str>) -> Role {
        let mut state = self.state.lock();
        if let RefreshState::Refreshing { waiters } = &mut *state {
            let (reply, rx) = oneshot::channel();
            waiters.push_back(reply);
            debug!(
                request_id = %request.id,
                queued = waiters.len(),
                "queued behind refresh in flight"
            );
            return Role::Wait(rx);
        }

        if let Some(current) = self.auth.token_store().access_token()
            && sent_token != Some(current.as_str())
        {
            return Role::Replay(current);
        }
        if !self.auth.has_refresh_token() {
            return Role::Expired;
        }

        let (reply, rx) = oneshot::channel();
        *state = RefreshState::Refreshing {
            waiters: VecDeque::from([reply]),
        };
        Role::Drive(rx)
    }
}

impl std::fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshCoordinator")
            .field("refreshing", &self.is_refreshing())
            .field("pending_waiters", &self.pending_waiters())
            .finish_non_exhaustive()
    }
}

/// Runs one refresh and releases every queued request with its outcome.
async fn run_refresh(auth: Arc<AuthClient>, state: Arc<Mutex<RefreshState>>) {
    let flight = Flight {
        state,
        landed: false,
    };

    let outcome = auth.refresh().await.map(|pair| pair.access_token);
    // refresh() logs out on every failure except a token that vanished
    // between the check in claim() and the call.
    if outcome == Err(AuthError::NoRefreshToken) {
        auth.logout();
    }

    let waiters = flight.land();
    match &outcome {
        Ok(token) => debug!(
            released = waiters.len(),
            token = %token_preview(token),
            "refresh complete"
        ),
        Err(err) => warn!(
            failed = waiters.len(),
            error = %err,
            "refresh failed, rejecting queued requests"
        ),
    }
    for waiter in waiters {
        if waiter.send(outcome.clone()).is_err() {
            debug!("queued request went away before the refresh landed");
        }
    }
}

async fn await_outcome(rx: oneshot::Receiver<Outcome>) -> Outcome {
    rx.await.unwrap_or(Err(AuthError::RefreshAbandoned))
}

async fn replay(
    transport: &dyn HttpTransport,
    request: &ApiRequest,
    token: &str,
) -> ApiResult<ApiResponse> {
    let response = transport.send(&request.with_bearer(token)).await?;
    if response.is_unauthorized() {
        warn!(request_id = %request.id, "replayed request rejected again");
    }
    Ok(response)
}

/// Marks the refresh in flight. Returns the coordinator to idle when
/// landed, or when dropped early (runtime shutdown), in which case queued
/// requests see their reply channel close.
struct Flight {
    state: Arc<Mutex<RefreshState>>,
    landed: bool,
}

impl Flight {
    fn land(mut self) -> VecDeque<oneshot::Sender<Outcome>> {
        self.landed = true;
        take_waiters(&self.state)
    }
}

impl Drop for Flight {
    fn drop(&mut self) {
        if !self.landed {
            let abandoned = take_waiters(&self.state);
            warn!(abandoned = abandoned.len(), "refresh dropped before completing");
        }
    }
}

fn take_waiters(state: &Mutex<RefreshState>) -> VecDeque<oneshot::Sender<Outcome>> {
    match std::mem::replace(&mut *state.lock(), RefreshState::Idle) {
        RefreshState::Idle => VecDeque::new(),
        RefreshState::Refreshing { waiters } => waiters,
    }
}
