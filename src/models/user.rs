use crate::state::AppState;
use crate::utils::http_helpers::HTTPError;
use axum::extract::FromRequestParts;
use axum::http::StatusCode;
use http::request::Parts;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::guard::AuthStateReader;

/// Account lifecycle status. Only `Active` accounts hold a usable session.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    #[default]
    Active,
    Disabled,
    Suspended,
}

impl AccountStatus {
    /// Disabled and suspended accounts may neither log in nor pass the guard.
    pub fn is_blocked(self) -> bool {
        !matches!(self, AccountStatus::Active)
    }
}

/// The User struct represents an authenticated user in the system.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub user_id: String,
    pub username: String,
    pub email: Option<String>,
    pub roles: Vec<String>,
    /// Subscription tier, e.g. "free", "pro".
    pub tier: String,
    pub status: AccountStatus,
}

impl User {
    /// Construct a new User; missing roles default to `["user"]`, tier to `"free"`.
    pub fn new(
        user_id: String,
        username: String,
        roles: Option<Vec<String>>,
        email: Option<String>,
        tier: Option<String>,
        status: Option<AccountStatus>,
    ) -> Self {
        User {
            user_id,
            username,
            email,
            roles: roles.unwrap_or_else(|| vec!["user".to_string()]),
            tier: tier.unwrap_or_else(|| "free".to_string()),
            status: status.unwrap_or_default(),
        }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// True if the user holds at least one of `roles`.
    pub fn has_any_role(&self, roles: &[&str]) -> bool {
        roles.iter().any(|role| self.has_role(role))
    }
}

/// Request extractor for API handlers.
///
/// Behind the route guard the user is already in the request extensions.
/// Elsewhere the session is read directly and a missing user is a 401 with a
/// `Bearer` challenge, not a redirect: API callers are not browsers.
impl FromRequestParts<AppState> for User {
    type Rejection = HTTPError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<User, HTTPError> {
        if let Some(user) = parts.extensions.get::<User>() {
            return Ok(user.clone());
        }

        match state.sessions.read(&parts.headers).current_user() {
            Some(user) => Ok(user),
            None => {
                debug!("No session user for API request to {}", parts.uri.path());
                Err(HTTPError::new(
                    StatusCode::UNAUTHORIZED,
                    "Unauthorized access",
                    Some("Bearer".to_string()),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_user_gets_defaults() {
        let user = User::new("u1".to_string(), "ada".to_string(), None, None, None, None);
        assert_eq!(user.roles, vec!["user".to_string()]);
        assert_eq!(user.tier, "free");
        assert_eq!(user.status, AccountStatus::Active);
    }

    #[test]
    fn role_checks() {
        let user = User::new(
            "u2".to_string(),
            "grace".to_string(),
            Some(vec!["creator".to_string()]),
            None,
            None,
            None,
        );
        assert!(user.has_role("creator"));
        assert!(!user.has_role("admin"));
        assert!(user.has_any_role(&["admin", "creator"]));
        assert!(!user.has_any_role(&[]));
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_value(AccountStatus::Suspended).unwrap();
        assert_eq!(json, "suspended");
        assert!(AccountStatus::Suspended.is_blocked());
        assert!(AccountStatus::Disabled.is_blocked());
        assert!(!AccountStatus::Active.is_blocked());
    }
}
