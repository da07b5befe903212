use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{AccountStatus, User};
use crate::providers::{Credentials, Provider};

/// PlainAuthConfig defines a static list of accounts.
#[derive(Deserialize, Serialize, Debug, JsonSchema, Clone)]
pub struct PlainAuthConfig {
    /// A friendly name for logs.
    pub name: String,
    pub users: Vec<PlainUserEntry>,
}

/// A single configured account.
#[derive(Deserialize, Serialize, Debug, JsonSchema, Clone)]
pub struct PlainUserEntry {
    /// Stable identifier; defaults to the username.
    pub user_id: Option<String>,
    pub username: String,
    pub password: String,
    pub email: Option<String>,
    pub roles: Option<Vec<String>>,
    pub tier: Option<String>,
    pub status: Option<AccountStatus>,
}

impl PlainUserEntry {
    fn to_user(&self) -> User {
        User::new(
            self.user_id.clone().unwrap_or_else(|| self.username.clone()),
            self.username.clone(),
            self.roles.clone(),
            self.email.clone(),
            self.tier.clone(),
            self.status,
        )
    }
}

/// A `PlainAuthProvider` compares credentials to the user list in `PlainAuthConfig`.
pub struct PlainAuthProvider {
    pub config: PlainAuthConfig,
}

impl PlainAuthProvider {
    /// Create a new `PlainAuthProvider` from the config struct.
    pub fn new(config: &PlainAuthConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }
}

#[async_trait]
impl Provider for PlainAuthProvider {
    fn get_name(&self) -> &str {
        &self.config.name
    }

    fn get_type(&self) -> &str {
        "plain"
    }

    async fn authenticate(&self, credentials: &Credentials) -> Result<User, String> {
        if credentials.username.is_empty() {
            return Err("No username given".to_string());
        }

        debug!("Plain login attempt for user '{}'", credentials.username);
        self.config
            .users
            .iter()
            .find(|entry| {
                entry.username == credentials.username && entry.password == credentials.password
            })
            .map(PlainUserEntry::to_user)
            .ok_or_else(|| "Wrong username or password".to_string())
    }

    fn users(&self) -> Vec<User> {
        self.config.users.iter().map(PlainUserEntry::to_user).collect()
    }
}
