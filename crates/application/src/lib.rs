//! Pet Manager Application - Session handling and API services
//!
//! This crate defines the application layer with:
//! - Port traits for the HTTP transport and durable storage
//! - The token store, auth client and refresh coordination
//! - Resource services and use cases built on the authenticated pipeline

pub mod auth;
pub mod error;
pub mod ports;
pub mod services;
pub mod use_cases;

#[cfg(test)]
pub(crate) mod testing;

pub use auth::{
    AuthClient, AuthEvent, AuthInterceptor, GuardDecision, RefreshCoordinator, RouteGuard,
    TokenStore,
};
pub use error::{ApiError, ApiResult};
pub use ports::{DurableStorage, HttpTransport, StorageError, StorageEvent, TransportError};
pub use services::{PetService, TutorService};
pub use use_cases::{SavePet, SavePetInput, SaveTutor, SaveTutorInput};
