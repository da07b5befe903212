//! Axum middleware putting the route guard in front of views.

use std::time::Duration;

use axum::extract::rejection::RawPathParamsRejection;
use axum::extract::{MatchedPath, RawPathParams, Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use tracing::{info, warn};

use super::guard::GuardDecision;
use super::request::RouteRequest;
use crate::models::User;
use crate::state::AppState;
use crate::utils::http_helpers::HTTPError;
use crate::utils::log_throttle::should_emit;

/// Roles allowed through [`require_admin`].
pub const ADMIN_ROLES: &[&str] = &["admin", "creator"];

const REDIRECT_LOG_INTERVAL: Duration = Duration::from_secs(60);

/// Build the guard's view of a routed request from what axum matched.
fn route_request(request: &Request, params: Option<RawPathParams>) -> RouteRequest {
    let path = request.uri().path().to_string();
    let template = request
        .extensions()
        .get::<MatchedPath>()
        .map(|m| m.as_str().to_string());

    let mut route = RouteRequest::new(path.as_str());
    if let Some(params) = params {
        for (key, value) in &params {
            route = route.with_prop(key, value);
        }
    }
    route.exact = route.matched_props.is_empty() && template.as_deref() == Some(path.as_str());
    route
}

/// Middleware: forward to the wrapped view when the session holds a user,
/// otherwise answer with a redirect to the login page.
///
/// On success the `User` and the `RouteRequest` are placed in the request
/// extensions for the view; the request itself is passed on unmodified.
pub async fn require_user(
    State(state): State<AppState>,
    params: Result<RawPathParams, RawPathParamsRejection>,
    mut request: Request,
    next: Next,
) -> Response {
    let reader = state.sessions.read(request.headers());
    let route = route_request(&request, params.ok());

    match state.guard.evaluate(&reader, route, next) {
        GuardDecision::Render { view, props } => {
            if let Some(user) = reader.into_user() {
                request.extensions_mut().insert(user);
            }
            request.extensions_mut().insert(props);
            view.run(request).await
        }
        GuardDecision::Redirect { to } => {
            let key = request
                .extensions()
                .get::<MatchedPath>()
                .map(|m| m.as_str().to_string())
                .unwrap_or_else(|| "<unmatched>".to_string());
            if let Some(suppressed) = should_emit(&format!("guard.redirect:{key}"), REDIRECT_LOG_INTERVAL) {
                info!(
                    route = %key,
                    suppressed,
                    "Redirecting unauthenticated request to {}",
                    to
                );
            }
            Redirect::to(to).into_response()
        }
    }
}

/// Middleware: only let through users holding one of `roles`.
///
/// Meant to sit inside [`require_user`]; if it is reached without a user the
/// request is redirected the same way the outer guard would.
pub async fn require_role(roles: &[&str], request: Request, next: Next) -> Response {
    let Some(user) = request.extensions().get::<User>() else {
        warn!("Role check reached without an authenticated user");
        return Redirect::to(super::LOGIN_PATH).into_response();
    };

    if !user.has_any_role(roles) {
        warn!(
            user_id = %user.user_id,
            roles = ?user.roles,
            "Authorization failure: one of {:?} required",
            roles
        );
        return HTTPError::new(
            StatusCode::FORBIDDEN,
            format!("Not authorized. Requires one of: {}", roles.join(", ")),
            None,
        )
        .into_response();
    }

    next.run(request).await
}

pub async fn require_admin(request: Request, next: Next) -> Response {
    require_role(ADMIN_ROLES, request, next).await
}
