//! Authentication for the Pet Manager client.
//!
//! This module provides:
//! - The token store holding the session, mirrored to durable storage
//! - The auth client for login, refresh and logout
//! - Single-flight refresh coordination for requests rejected with 401
//! - The request interceptor and route guards built on top of them

mod client;
mod guard;
mod interceptor;
mod refresh;
mod token_store;

pub use client::{AuthClient, AuthEvent, LOGIN_ENDPOINT, REFRESH_ENDPOINT};
pub use guard::{
    DEFAULT_LANDING_PATH, DEFAULT_LOGIN_PATH, GuardDecision, RETURN_URL_PARAM, RouteGuard,
};
pub use interceptor::AuthInterceptor;
pub use refresh::RefreshCoordinator;
pub use token_store::TokenStore;
