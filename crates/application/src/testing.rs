//! In-process fakes for the transport and storage ports.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use petmanager_domain::{ApiRequest, ApiResponse, HttpMethod, TokenPair};
use tokio::sync::Semaphore;

use crate::auth::{AuthClient, AuthInterceptor, REFRESH_ENDPOINT, RefreshCoordinator, TokenStore};
use crate::ports::{DurableStorage, HttpTransport, StorageError, TransportError};

/// Map-backed storage that can be told to fail.
#[derive(Debug, Default)]
pub struct MapStorage {
    entries: Mutex<HashMap<String, String>>,
    failing: AtomicBool,
}

impl MapStorage {
    pub fn insert(&self, key: &str, value: &str) {
        self.entries.lock().insert(key.to_string(), value.to_string());
    }

    pub fn value(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear_all(&self) {
        self.entries.lock().clear();
    }

    pub fn fail_all(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(StorageError::Unavailable("quota exceeded".to_string()))
        } else {
            Ok(())
        }
    }
}

impl DurableStorage for MapStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check()?;
        Ok(self.value(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check()?;
        self.insert(key, value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.check()?;
        self.entries.lock().remove(key);
        Ok(())
    }
}

type Handler = dyn Fn(&ApiRequest) -> Result<ApiResponse, TransportError> + Send + Sync;
type Matcher = dyn Fn(&ApiRequest) -> bool + Send + Sync;

/// Scripted transport recording every request it receives.
///
/// When gated, refresh calls wait for [`FakeApi::release_refresh`].
/// Requests matched by [`FakeApi::stalling`] never get an answer.
pub struct FakeApi {
    handler: Box<Handler>,
    log: Mutex<Vec<ApiRequest>>,
    gate: Option<Semaphore>,
    stall: Option<Box<Matcher>>,
}

impl FakeApi {
    pub fn new(
        handler: impl Fn(&ApiRequest) -> Result<ApiResponse, TransportError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            handler: Box::new(handler),
            log: Mutex::new(Vec::new()),
            gate: None,
            stall: None,
        }
    }

    /// Holds refresh calls until released.
    pub fn gated(mut self) -> Self {
        self.gate = Some(Semaphore::new(0));
        self
    }

    pub fn stalling(mut self, matcher: impl Fn(&ApiRequest) -> bool + Send + Sync + 'static) -> Self {
        self.stall = Some(Box::new(matcher));
        self
    }

    pub fn release_refresh(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(1);
        }
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.log.lock().clone()
    }

    pub fn count(&self, method: HttpMethod, path: &str) -> usize {
        self.log
            .lock()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    pub fn refresh_calls(&self) -> usize {
        self.count(HttpMethod::Put, REFRESH_ENDPOINT)
    }
}

#[async_trait]
impl HttpTransport for FakeApi {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        self.log.lock().push(request.clone());
        if request.path == REFRESH_ENDPOINT
            && let Some(gate) = &self.gate
        {
            gate.acquire()
                .await
                .map_err(|e| TransportError::Other(e.to_string()))?
                .forget();
        }
        if self.stall.as_ref().is_some_and(|stall| stall(request)) {
            std::future::pending::<()>().await;
        }
        (self.handler)(request)
    }
}

/// JSON body the identity endpoint answers with.
pub fn token_body(access: &str, refresh: &str) -> serde_json::Value {
    serde_json::to_value(TokenPair::new(access, refresh, 300, 1800)).unwrap_or_default()
}

/// A fully wired client stack over a fake API.
pub struct Harness {
    pub api: Arc<FakeApi>,
    pub storage: Arc<MapStorage>,
    pub store: Arc<TokenStore>,
    pub auth: Arc<AuthClient>,
    pub coordinator: Arc<RefreshCoordinator>,
    pub interceptor: Arc<AuthInterceptor>,
}

impl Harness {
    pub fn new(api: FakeApi) -> Self {
        let api = Arc::new(api);
        let storage = Arc::new(MapStorage::default());
        let store = Arc::new(TokenStore::new(storage.clone()));
        let auth = Arc::new(AuthClient::new(store.clone(), api.clone()));
        let coordinator = Arc::new(RefreshCoordinator::new(auth.clone()));
        let interceptor = Arc::new(AuthInterceptor::new(
            store.clone(),
            coordinator.clone(),
            api.clone(),
        ));
        Self {
            api,
            storage,
            store,
            auth,
            coordinator,
            interceptor,
        }
    }

    /// Starts logged in with the given tokens.
    pub fn logged_in(self, access: &str, refresh: &str) -> Self {
        self.store
            .apply_token_pair(&TokenPair::new(access, refresh, 300, 1800));
        self
    }
}
