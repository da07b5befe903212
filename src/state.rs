//! Shared application state.
//!
//! Contains the state that is shared across all request handlers: the
//! credential providers, the session provider and the guard.

use crate::config::ConfigV1;
use crate::guard::RouteGuard;
use crate::providers::Providers;
use crate::session::SessionAuth;
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// Immutable after startup; cloning only bumps reference counts.
#[derive(Clone)]
pub struct AppState {
    /// Credential providers, consulted at login and for account lookups.
    pub providers: Arc<Providers>,
    /// Owner of the authentication state: issues and reads session tokens.
    pub sessions: Arc<SessionAuth>,
    /// Decides between rendering a view and redirecting to the login page.
    pub guard: RouteGuard,
}

impl AppState {
    /// Wire up providers and sessions from a loaded configuration.
    pub fn from_config(config: &ConfigV1) -> Self {
        let providers = Arc::new(Providers::new(&config.providers));
        let sessions = Arc::new(SessionAuth::new(
            config.session.clone(),
            config.jwt.clone(),
            providers.clone(),
        ));
        AppState {
            providers,
            sessions,
            guard: RouteGuard::new(),
        }
    }
}
