//! Pet Manager client - component wiring.
//!
//! [`PetManager`] assembles the token store, auth client, refresh
//! coordinator, interceptor, guards and resource services over a transport
//! and a durable storage.

use std::sync::Arc;

use petmanager_application::auth::{
    AuthClient, AuthInterceptor, RefreshCoordinator, RouteGuard, TokenStore,
};
use petmanager_application::ports::{DurableStorage, HttpTransport, TransportError};
use petmanager_application::{PetService, SavePet, SaveTutor, TutorService};
use petmanager_infrastructure::{AppConfig, ConfigError, FileStorage, ReqwestTransport};
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::info;

/// Errors raised while assembling the client.
#[derive(Debug, Error)]
pub enum StartupError {
    /// Configuration is unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The HTTP transport could not be created.
    #[error("cannot create HTTP transport: {0}")]
    Transport(#[from] TransportError),
}

/// A fully wired Pet Manager client.
pub struct PetManager {
    /// Session state.
    pub store: Arc<TokenStore>,
    /// Login, refresh and logout.
    pub auth: Arc<AuthClient>,
    /// Route guards.
    pub guard: RouteGuard,
    /// `/v1/pets` client.
    pub pets: PetService,
    /// `/v1/tutores` client.
    pub tutors: TutorService,
    coordinator: Arc<RefreshCoordinator>,
    storage_listener: Option<JoinHandle<()>>,
}

impl PetManager {
    /// Builds a client storing its session under the configured data
    /// directory.
    ///
    /// # Errors
    ///
    /// Returns an error if no data directory is available or the transport
    /// cannot be created.
    pub fn from_config(config: &AppConfig) -> Result<Self, StartupError> {
        let dir = config.session_dir()?;
        info!(dir = %dir.display(), "using session directory");
        Self::with_storage(config, Arc::new(FileStorage::in_dir(&dir)))
    }

    /// Builds a client over the given storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport cannot be created.
    pub fn with_storage(
        config: &AppConfig,
        storage: Arc<dyn DurableStorage>,
    ) -> Result<Self, StartupError> {
        let transport = ReqwestTransport::new(&config.api_url, config.request_timeout())?;
        Ok(Self::with_parts(config, storage, Arc::new(transport)))
    }

    /// Builds a client from explicit parts.
    ///
    /// Must be called inside a tokio runtime when `storage` reports
    /// external changes, since the session then follows them.
    #[must_use]
    pub fn with_parts(
        config: &AppConfig,
        storage: Arc<dyn DurableStorage>,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        let store = Arc::new(TokenStore::new(storage));
        let storage_listener = store.spawn_storage_listener();

        let auth = Arc::new(
            AuthClient::new(store.clone(), transport.clone())
                .with_login_path(config.login_path.clone()),
        );
        let coordinator = Arc::new(RefreshCoordinator::new(auth.clone()));
        let api = Arc::new(AuthInterceptor::new(
            store.clone(),
            coordinator.clone(),
            transport,
        ));
        let guard = RouteGuard::new(store.clone())
            .with_paths(config.login_path.clone(), config.landing_path.clone());

        Self {
            store,
            auth,
            guard,
            pets: PetService::new(api.clone()),
            tutors: TutorService::new(api),
            coordinator,
            storage_listener,
        }
    }

    /// The refresh coordinator, for diagnostics.
    #[must_use]
    pub const fn coordinator(&self) -> &Arc<RefreshCoordinator> {
        &self.coordinator
    }

    /// Use case saving a pet with its photo.
    #[must_use]
    pub fn save_pet(&self) -> SavePet {
        SavePet::new(self.pets.clone())
    }

    /// Use case saving a tutor with their photo.
    #[must_use]
    pub fn save_tutor(&self) -> SaveTutor {
        SaveTutor::new(self.tutors.clone())
    }
}

impl Drop for PetManager {
    fn drop(&mut self) {
        if let Some(listener) = self.storage_listener.take() {
            listener.abort();
        }
    }
}
