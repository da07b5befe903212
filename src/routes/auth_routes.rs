//! Login, logout and current-user endpoints.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{error, info};

use crate::guard::LOGIN_PATH;
use crate::models::User;
use crate::providers::{Credentials, LoginError};
use crate::state::AppState;
use crate::utils::http_helpers::HTTPError;

/// Registers authentication routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(LOGIN_PATH, get(login_page).post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
}

#[derive(Serialize)]
struct LoginResponse {
    message: &'static str,
    user_id: String,
    token: String,
}

/// Credentials come from a JSON body `{username, password}` or, with an empty
/// body, from an `Authorization: Basic` header.
fn credentials_from_request(headers: &HeaderMap, body: &[u8]) -> Result<Credentials, HTTPError> {
    if !body.iter().all(u8::is_ascii_whitespace) {
        return serde_json::from_slice::<Credentials>(body).map_err(|e| {
            HTTPError::new(
                StatusCode::BAD_REQUEST,
                format!("Invalid login body: {}", e),
                None,
            )
        });
    }

    let basic = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().split_once(' '))
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("basic"))
        .map(|(_, encoded)| encoded);

    match basic {
        Some(encoded) => Credentials::from_basic(encoded)
            .map_err(|e| HTTPError::new(StatusCode::BAD_REQUEST, e, None)),
        None => Err(HTTPError::new(
            StatusCode::BAD_REQUEST,
            "Username and password are required for login.",
            None,
        )),
    }
}

/// The page unauthenticated visitors are redirected to.
async fn login_page() -> Json<Value> {
    Json(json!({
        "view": "login",
        "message": "Authentication required. POST credentials to this path to sign in.",
        "fields": ["username", "password"],
    }))
}

/// Verifies credentials, sets the session cookie and returns the session token.
async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, HTTPError> {
    let credentials = credentials_from_request(&headers, &body)?;

    let user = state
        .providers
        .login(&credentials)
        .await
        .map_err(|e| match e {
            LoginError::InvalidCredentials => HTTPError::new(
                StatusCode::UNAUTHORIZED,
                e.to_string(),
                Some("Basic".to_string()),
            ),
            LoginError::AccountBlocked(_) => HTTPError::new(StatusCode::FORBIDDEN, e.to_string(), None),
        })?;

    let token = state.sessions.issue(&user).map_err(|e| {
        error!("Session issue failed for '{}': {}", user.user_id, e);
        HTTPError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Could not create a session",
            None,
        )
    })?;

    info!(user_id = %user.user_id, "User logged in");
    let jar = jar.add(state.sessions.session_cookie(token.clone()));
    Ok((
        jar,
        Json(LoginResponse {
            message: "Login successful",
            user_id: user.user_id,
            token,
        }),
    ))
}

/// Drops the session cookie. Bearer tokens simply expire.
async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    (jar.add(state.sessions.removal_cookie()), StatusCode::NO_CONTENT)
}

/// The current user; 401 rather than a redirect since this is an API endpoint.
async fn me(user: User) -> Json<User> {
    Json(user)
}
