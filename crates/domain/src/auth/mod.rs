//! Authentication domain types

mod types;

pub use types::{
    AuthError, AuthState, AuthenticatedUser, Credentials, PLACEHOLDER_USERNAME, Session,
    TokenPair, token_preview,
};
