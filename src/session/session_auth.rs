use axum::http::HeaderMap;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use std::sync::Arc;

use crate::config::{JWTConfig, SessionConfig};
use crate::guard::AuthStateReader;
use crate::models::{AccountStatus, User};
use crate::providers::Providers;

/// Claims carried by a session token.
#[derive(Serialize, Deserialize, Debug, Clone)]
struct Claims {
    sub: String,
    iss: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    aud: Option<String>,
    exp: i64,
    iat: i64,
    jti: String,

    username: String,
    email: Option<String>,
    roles: Vec<String>,
    tier: String,
    status: AccountStatus,
}

/// Issues and verifies session tokens and reads them back off requests.
///
/// This is the only owner of authentication state; the route guard sees it
/// through [`RequestAuthState`]. Tokens only name an account: the profile is
/// looked up again in `accounts` on every read.
pub struct SessionAuth {
    session: SessionConfig,
    jwt: JWTConfig,
    accounts: Arc<Providers>,
}

impl SessionAuth {
    pub fn new(session: SessionConfig, jwt: JWTConfig, accounts: Arc<Providers>) -> Self {
        SessionAuth {
            session,
            jwt,
            accounts,
        }
    }

    /// Sign a session token for `user`.
    pub fn issue(&self, user: &User) -> Result<String, String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user.user_id.clone(),
            iss: self.jwt.iss.clone(),
            aud: self.jwt.aud.clone(),
            exp: now + self.jwt.exp,
            iat: now,
            jti: Uuid::new_v4().to_string(),
            username: user.username.clone(),
            email: user.email.clone(),
            roles: user.roles.clone(),
            tier: user.tier.clone(),
            status: user.status,
        };

        let key = EncodingKey::from_secret(self.jwt.secret.as_ref());
        encode(&Header::new(Algorithm::HS256), &claims, &key)
            .map_err(|e| format!("Failed to encode session token: {}", e))
    }

    /// Validate signature, issuer, audience and expiry, then resolve the
    /// account afresh. Removed and blocked accounts are refused.
    pub fn verify(&self, token: &str) -> Result<User, String> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.jwt.iss]);
        match &self.jwt.aud {
            Some(aud) => validation.set_audience(&[aud]),
            None => validation.validate_aud = false,
        }

        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt.secret.as_ref()),
            &validation,
        )
        .map_err(|e| format!("Invalid session token: {}", e))?
        .claims;

        let user = self
            .accounts
            .find_user(&claims.sub)
            .ok_or_else(|| format!("Account '{}' no longer exists", claims.sub))?;
        if user.status.is_blocked() {
            return Err(format!(
                "Account '{}' is {:?}",
                user.user_id, user.status
            ));
        }
        Ok(user)
    }

    /// Session tokens carried by the request, in order of precedence: the
    /// session cookie, then `Authorization: Bearer`.
    pub fn tokens_from_headers(&self, headers: &HeaderMap) -> Vec<String> {
        let mut tokens = Vec::new();

        let jar = CookieJar::from_headers(headers);
        if let Some(cookie) = jar.get(&self.session.cookie_name) {
            if !cookie.value().is_empty() {
                tokens.push(cookie.value().to_string());
            }
        }

        let bearer = headers
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            .and_then(|header| header.trim().split_once(' '))
            .filter(|(scheme, token)| {
                scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty()
            });
        if let Some((_, token)) = bearer {
            tokens.push(token.trim().to_string());
        }

        tokens
    }

    /// Resolve the authentication state of a request. Never fails: the first
    /// token that verifies wins, and with none the request is unauthenticated.
    pub fn read(&self, headers: &HeaderMap) -> RequestAuthState {
        let user = self
            .tokens_from_headers(headers)
            .iter()
            .find_map(|token| match self.verify(token) {
                Ok(user) => Some(user),
                Err(e) => {
                    debug!("Session rejected: {}", e);
                    None
                }
            });
        RequestAuthState { user }
    }

    /// The session cookie carrying `token`.
    pub fn session_cookie(&self, token: String) -> Cookie<'static> {
        Cookie::build((self.session.cookie_name.clone(), token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.session.secure)
            .max_age(time::Duration::seconds(self.jwt.exp))
            .build()
    }

    /// An expired, empty session cookie that makes the browser drop the session.
    pub fn removal_cookie(&self) -> Cookie<'static> {
        Cookie::build((self.session.cookie_name.clone(), ""))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.session.secure)
            .max_age(time::Duration::ZERO)
            .build()
    }
}

/// Authentication state of a single request, as resolved by [`SessionAuth::read`].
#[derive(Debug, Clone, Default)]
pub struct RequestAuthState {
    user: Option<User>,
}

impl RequestAuthState {
    pub fn into_user(self) -> Option<User> {
        self.user
    }
}

impl AuthStateReader for RequestAuthState {
    fn current_user(&self) -> Option<User> {
        self.user.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::plain_provider::{PlainAuthConfig, PlainAuthProvider, PlainUserEntry};
    use axum::http::header::{AUTHORIZATION, COOKIE};
    use axum::http::HeaderValue;

    fn entry(status: Option<AccountStatus>) -> PlainUserEntry {
        PlainUserEntry {
            user_id: Some("u-1".to_string()),
            username: "ada".to_string(),
            password: "lovelace".to_string(),
            email: Some("ada@example.org".to_string()),
            roles: Some(vec!["admin".to_string()]),
            tier: Some("pro".to_string()),
            status,
        }
    }

    fn sessions_with(users: Vec<PlainUserEntry>) -> SessionAuth {
        let provider = PlainAuthProvider::new(&PlainAuthConfig {
            name: "test".to_string(),
            users,
        });
        SessionAuth::new(
            SessionConfig::default(),
            JWTConfig {
                iss: "routeguard-test".to_string(),
                aud: None,
                exp: 3600,
                secret: "secretkey".to_string(),
            },
            Arc::new(Providers::from_providers(vec![Box::new(provider)])),
        )
    }

    fn sessions() -> SessionAuth {
        sessions_with(vec![entry(None)])
    }

    fn ada() -> User {
        User::new(
            "u-1".to_string(),
            "ada".to_string(),
            Some(vec!["admin".to_string()]),
            Some("ada@example.org".to_string()),
            Some("pro".to_string()),
            None,
        )
    }

    fn headers_with(name: axum::http::HeaderName, value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(name, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn issued_token_verifies_to_same_user() {
        let sessions = sessions();
        let token = sessions.issue(&ada()).unwrap();
        assert_eq!(sessions.verify(&token).unwrap(), ada());
    }

    #[test]
    fn verify_returns_current_profile_not_token_snapshot() {
        let sessions = sessions();
        let mut stale = ada();
        stale.roles = vec!["user".to_string()];
        stale.tier = "free".to_string();
        let token = sessions.issue(&stale).unwrap();

        let user = sessions.verify(&token).unwrap();
        assert_eq!(user.roles, vec!["admin"]);
        assert_eq!(user.tier, "pro");
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let mut other = sessions();
        other.jwt.secret = "another".to_string();
        let token = other.issue(&ada()).unwrap();
        assert!(sessions().verify(&token).is_err());
    }

    #[test]
    fn token_from_other_issuer_is_rejected() {
        let mut other = sessions();
        other.jwt.iss = "someone-else".to_string();
        let token = other.issue(&ada()).unwrap();
        assert!(sessions().verify(&token).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let mut short = sessions();
        // Well past the default validation leeway.
        short.jwt.exp = -600;
        let token = short.issue(&ada()).unwrap();
        let err = sessions().verify(&token).unwrap_err();
        assert!(err.contains("Invalid session token"), "{err}");
    }

    #[test]
    fn account_suspended_after_issue_is_rejected() {
        let token = sessions().issue(&ada()).unwrap();
        let sessions = sessions_with(vec![entry(Some(AccountStatus::Suspended))]);
        let err = sessions.verify(&token).unwrap_err();
        assert!(err.contains("Suspended"), "{err}");
    }

    #[test]
    fn account_removed_after_issue_is_rejected() {
        let token = sessions().issue(&ada()).unwrap();
        let err = sessions_with(vec![]).verify(&token).unwrap_err();
        assert!(err.contains("no longer exists"), "{err}");
    }

    #[test]
    fn reads_bearer_token() {
        let sessions = sessions();
        let token = sessions.issue(&ada()).unwrap();
        let headers = headers_with(AUTHORIZATION, &format!("Bearer {token}"));
        assert_eq!(sessions.read(&headers).current_user(), Some(ada()));
    }

    #[test]
    fn reads_cookie_and_prefers_it_over_bearer() {
        let sessions = sessions();
        let token = sessions.issue(&ada()).unwrap();
        let mut headers = headers_with(COOKIE, &format!("theme=dark; session_token={token}"));
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer garbage"));

        assert_eq!(
            sessions.tokens_from_headers(&headers),
            vec![token.clone(), "garbage".to_string()]
        );
        assert_eq!(sessions.read(&headers).current_user(), Some(ada()));
    }

    #[test]
    fn stale_cookie_falls_back_to_bearer() {
        let sessions = sessions();
        let token = sessions.issue(&ada()).unwrap();
        let mut headers = headers_with(COOKIE, "session_token=stale.cookie.value");
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        assert_eq!(sessions.read(&headers).current_user(), Some(ada()));
    }

    #[test]
    fn missing_or_malformed_credentials_read_as_unauthenticated() {
        let sessions = sessions();
        assert!(sessions.read(&HeaderMap::new()).current_user().is_none());
        assert!(sessions
            .read(&headers_with(AUTHORIZATION, "Basic YWRhOmxvdmVsYWNl"))
            .current_user()
            .is_none());
        assert!(sessions
            .read(&headers_with(AUTHORIZATION, "Bearer not.a.jwt"))
            .current_user()
            .is_none());
    }

    #[test]
    fn removal_cookie_expires_immediately() {
        let cookie = sessions().removal_cookie();
        assert_eq!(cookie.name(), "session_token");
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
    }
}
