//! Bearer attachment and 401 recovery for every API call.

use std::sync::Arc;

use petmanager_domain::{ApiRequest, ApiResponse, token_preview};
use tracing::debug;

use super::refresh::RefreshCoordinator;
use super::token_store::TokenStore;
use crate::error::ApiResult;
use crate::ports::HttpTransport;

/// Sends API requests with the current access token attached.
///
/// A 401 response is handed to the [`RefreshCoordinator`]; every other
/// response and every transport failure reaches the caller unchanged.
pub struct AuthInterceptor {
    store: Arc<TokenStore>,
    coordinator: Arc<RefreshCoordinator>,
    transport: Arc<dyn HttpTransport>,
}

impl AuthInterceptor {
    /// Creates an interceptor sending through `transport`.
    #[must_use]
    pub fn new(
        store: Arc<TokenStore>,
        coordinator: Arc<RefreshCoordinator>,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            store,
            coordinator,
            transport,
        }
    }

    /// Sends `request`, refreshing the session once if the API rejects
    /// the token.
    ///
    /// # Errors
    ///
    /// Returns the transport error, or `ApiError::Auth` if the session
    /// could not be recovered after a 401.
    pub async fn send(&self, request: ApiRequest) -> ApiResult<ApiResponse> {
        let token = self.store.access_token();
        let authorized = token.as_deref().map(|t| request.with_bearer(t));
        let outgoing = authorized.as_ref().unwrap_or(&request);

        debug!(
            request_id = %request.id,
            method = %request.method,
            path = %request.path,
            token = ?token.as_deref().map(token_preview),
            "sending request"
        );

        let response = self.transport.send(outgoing).await?;
        if !response.is_unauthorized() {
            return Ok(response);
        }

        debug!(request_id = %request.id, "request rejected with 401");
        self.coordinator
            .recover(request, token.as_deref(), self.transport.as_ref())
            .await
    }
}

impl std::fmt::Debug for AuthInterceptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthInterceptor")
            .field("store", &self.store)
            .field("coordinator", &self.coordinator)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::ports::TransportError;
    use crate::testing::{FakeApi, Harness};
    use petmanager_domain::AUTHORIZATION;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_attaches_current_token() {
        let h = Harness::new(FakeApi::new(|_| Ok(ApiResponse::empty(204)))).logged_in("T1", "R1");

        let request = ApiRequest::delete("/v1/pets/4");
        h.interceptor.send(request.clone()).await.unwrap();

        let sent = h.api.requests().pop().unwrap();
        assert_eq!(sent.bearer_token(), Some("T1"));
        assert_eq!(sent, request.with_bearer("T1"));
    }

    #[tokio::test]
    async fn test_anonymous_request_has_no_authorization() {
        let h = Harness::new(FakeApi::new(|_| Ok(ApiResponse::empty(200))));

        h.interceptor.send(ApiRequest::get("/v1/pets")).await.unwrap();

        assert!(h.api.requests()[0].header(AUTHORIZATION).is_none());
    }

    #[tokio::test]
    async fn test_other_errors_pass_through() {
        let h = Harness::new(FakeApi::new(|_| {
            Ok(ApiResponse::json(403, &serde_json::json!({"message": "forbidden"})))
        }))
        .logged_in("T1", "R1");

        let response = h.interceptor.send(ApiRequest::get("/v1/pets")).await.unwrap();

        assert_eq!(response.status.as_u16(), 403);
        assert_eq!(h.api.refresh_calls(), 0);
        assert!(h.store.is_authenticated());
    }

    #[tokio::test]
    async fn test_transport_failure_passes_through() {
        let h = Harness::new(FakeApi::new(|_| Err(TransportError::Timeout(30_000))))
            .logged_in("T1", "R1");

        let err = h.interceptor.send(ApiRequest::get("/v1/pets")).await.unwrap_err();

        assert_eq!(err, ApiError::Transport(TransportError::Timeout(30_000)));
        assert!(h.store.is_authenticated());
    }
}
