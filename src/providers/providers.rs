use std::fmt;

use base64::{engine::general_purpose, Engine as _};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::plain_provider::{PlainAuthConfig, PlainAuthProvider};
use crate::models::{AccountStatus, User};

/// Configuration options for each credential provider.
#[derive(Deserialize, Serialize, JsonSchema, Debug)]
#[serde(tag = "type")]
pub enum ProviderConfig {
    #[serde(rename = "plain")]
    Plain(PlainAuthConfig),
}

/// A username/password pair presented at login.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Decode the payload of a `Basic` authorization header (base64 "username:password").
    pub fn from_basic(encoded: &str) -> Result<Credentials, String> {
        let decoded_bytes = general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|e| {
                warn!("Base64 decode error: {}", e);
                "Invalid base64 in Basic auth".to_string()
            })?;

        let decoded_str = String::from_utf8(decoded_bytes).map_err(|e| {
            warn!("Invalid UTF-8 in Basic auth: {}", e);
            "Invalid UTF-8 in Basic auth".to_string()
        })?;

        let (username, password) = decoded_str.split_once(':').unwrap_or((decoded_str.as_str(), ""));
        if username.is_empty() {
            return Err("No username in Basic credentials".to_string());
        }

        Ok(Credentials {
            username: username.to_string(),
            password: password.to_string(),
        })
    }
}

/// A credential provider must be able to return a User or an error.
#[async_trait::async_trait]
pub trait Provider: Send + Sync {
    fn get_name(&self) -> &str;
    fn get_type(&self) -> &str;
    async fn authenticate(&self, credentials: &Credentials) -> Result<User, String>;
    /// Accounts this provider can enumerate. Remote providers usually can't.
    fn users(&self) -> Vec<User> {
        Vec::new()
    }
}

/// Create a credential provider from a given config.
pub fn create_auth_provider(config: &ProviderConfig) -> Box<dyn Provider> {
    match config {
        ProviderConfig::Plain(cfg) => Box::new(PlainAuthProvider::new(cfg)),
    }
}

/// Why a login attempt was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginError {
    InvalidCredentials,
    AccountBlocked(AccountStatus),
}

impl fmt::Display for LoginError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoginError::InvalidCredentials => write!(f, "Invalid username or password"),
            LoginError::AccountBlocked(_) => write!(
                f,
                "Your account is disabled or suspended. Please contact support."
            ),
        }
    }
}

/// All configured credential providers, consulted in order.
pub struct Providers {
    providers: Vec<Box<dyn Provider>>,
}

impl Providers {
    pub fn new(config: &[ProviderConfig]) -> Self {
        info!("Creating credential providers...");
        Providers {
            providers: config.iter().map(create_auth_provider).collect(),
        }
    }

    pub fn from_providers(providers: Vec<Box<dyn Provider>>) -> Self {
        Providers { providers }
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Every account the providers can enumerate, in provider order.
    pub fn users(&self) -> Vec<User> {
        self.providers.iter().flat_map(|p| p.users()).collect()
    }

    /// Look up an account by id.
    pub fn find_user(&self, user_id: &str) -> Option<User> {
        self.providers
            .iter()
            .flat_map(|p| p.users())
            .find(|user| user.user_id == user_id)
    }

    /// Check credentials against each provider; the first that accepts them wins.
    /// A matched account that is disabled or suspended is refused outright.
    pub async fn login(&self, credentials: &Credentials) -> Result<User, LoginError> {
        for provider in &self.providers {
            match provider.authenticate(credentials).await {
                Ok(user) => {
                    if user.status.is_blocked() {
                        warn!(
                            user_id = %user.user_id,
                            status = ?user.status,
                            "Login refused for blocked account"
                        );
                        return Err(LoginError::AccountBlocked(user.status));
                    }
                    info!(
                        "Provider '{}' authenticated user '{}'",
                        provider.get_name(),
                        user.username
                    );
                    return Ok(user);
                }
                Err(e) => debug!("Provider '{}' ({}) failed: {}", provider.get_name(), provider.get_type(), e),
            }
        }

        warn!("All providers rejected login for '{}'", credentials.username);
        Err(LoginError::InvalidCredentials)
    }
}
