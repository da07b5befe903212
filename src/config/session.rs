use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Where the session token lives on the client side.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct SessionConfig {
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Mark the session cookie `Secure` (only sent over HTTPS).
    #[serde(default)]
    pub secure: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            cookie_name: default_cookie_name(),
            secure: false,
        }
    }
}

fn default_cookie_name() -> String {
    "session_token".to_string()
}
