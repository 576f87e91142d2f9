//! Navigation guards for protected and anonymous-only routes.

use std::sync::Arc;

use tracing::debug;

use super::token_store::TokenStore;

/// Route of the login screen.
pub const DEFAULT_LOGIN_PATH: &str = "/auth/login";
/// Route an authenticated user lands on.
pub const DEFAULT_LANDING_PATH: &str = "/pets";
/// Query parameter carrying the route to resume after login.
pub const RETURN_URL_PARAM: &str = "returnUrl";

/// Outcome of a guard check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Navigation may proceed.
    Allow,
    /// Navigation must go elsewhere.
    Redirect {
        /// Target route.
        path: String,
        /// Route to come back to, passed as `returnUrl`.
        return_url: Option<String>,
    },
}

impl GuardDecision {
    /// Returns true if navigation may proceed.
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    /// Returns the full redirect location, query string included.
    #[must_use]
    pub fn location(&self) -> Option<String> {
        match self {
            Self::Allow => None,
            Self::Redirect {
                path,
                return_url: None,
            } => Some(path.clone()),
            Self::Redirect {
                path,
                return_url: Some(return_url),
            } => {
                let query = serde_urlencoded::to_string([(RETURN_URL_PARAM, return_url)])
                    .unwrap_or_default();
                Some(format!("{path}?{query}"))
            }
        }
    }
}

/// Decides whether a route may be entered given the current session.
#[derive(Debug, Clone)]
pub struct RouteGuard {
    store: Arc<TokenStore>,
    login_path: String,
    landing_path: String,
}

impl RouteGuard {
    /// Creates a guard using the default login and landing routes.
    #[must_use]
    pub fn new(store: Arc<TokenStore>) -> Self {
        Self {
            store,
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            landing_path: DEFAULT_LANDING_PATH.to_string(),
        }
    }

    /// Overrides the login and landing routes.
    #[must_use]
    pub fn with_paths(mut self, login: impl Into<String>, landing: impl Into<String>) -> Self {
        self.login_path = login.into();
        self.landing_path = landing.into();
        self
    }

    /// Admits authenticated users; sends everyone else to login with the
    /// requested route as `returnUrl`.
    #[must_use]
    pub fn require_authenticated(&self, requested_url: &str) -> GuardDecision {
        if self.store.is_authenticated() {
            return GuardDecision::Allow;
        }
        debug!(requested_url, "protected route needs login");
        GuardDecision::Redirect {
            path: self.login_path.clone(),
            return_url: Some(requested_url.to_string()),
        }
    }

    /// Admits anonymous users; sends authenticated users to the landing route.
    #[must_use]
    pub fn require_anonymous(&self) -> GuardDecision {
        if self.store.is_authenticated() {
            GuardDecision::Redirect {
                path: self.landing_path.clone(),
                return_url: None,
            }
        } else {
            GuardDecision::Allow
        }
    }
}
