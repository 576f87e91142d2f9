//! Pet Manager Domain - Core business types
//!
//! This crate defines the domain model for the Pet Manager client.
//! All types here are pure Rust with no I/O dependencies.

pub mod auth;
pub mod error;
pub mod id;
pub mod page;
pub mod pet;
pub mod photo;
pub mod request;
pub mod response;
pub mod tutor;

pub use auth::{
    AuthError, AuthState, AuthenticatedUser, Credentials, PLACEHOLDER_USERNAME, Session,
    TokenPair, token_preview,
};
pub use error::{DomainError, DomainResult};
pub use id::generate_request_id;
pub use page::{Page, PageRequest};
pub use pet::{Pet, PetForm};
pub use photo::{PHOTO_FIELD, Photo};
pub use request::{AUTHORIZATION, ApiRequest, HttpMethod, MultipartFile, QueryParams, RequestBody};
pub use response::{ApiResponse, StatusCode};
pub use tutor::{Tutor, TutorForm};
