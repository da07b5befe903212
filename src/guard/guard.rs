use tracing::trace;

use super::reader::AuthStateReader;
use super::request::RouteRequest;

/// Where unauthenticated requests are sent, whatever they asked for.
pub const LOGIN_PATH: &str = "/login";

/// The two states a request can be in from the guard's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessState {
    Authenticated,
    Unauthenticated,
}

/// Outcome of guarding a route. Both variants are expected results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision<V> {
    Render { view: V, props: RouteRequest },
    Redirect { to: &'static str },
}

/// Conditional-access route guard.
///
/// Stateless: every call reads the current user afresh from the supplied
/// reader and never writes anything back.
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteGuard;

impl RouteGuard {
    pub fn new() -> Self {
        RouteGuard
    }

    pub fn state<R: AuthStateReader + ?Sized>(&self, reader: &R) -> AccessState {
        match reader.current_user() {
            Some(_) => AccessState::Authenticated,
            None => AccessState::Unauthenticated,
        }
    }

    /// Render `view` with the request's props if a user is present, otherwise
    /// redirect to [`LOGIN_PATH`].
    pub fn evaluate<R, V>(&self, reader: &R, request: RouteRequest, view: V) -> GuardDecision<V>
    where
        R: AuthStateReader + ?Sized,
    {
        match self.state(reader) {
            AccessState::Authenticated => {
                trace!("Granting access to '{}'", request.path);
                GuardDecision::Render {
                    view,
                    props: request,
                }
            }
            AccessState::Unauthenticated => {
                trace!("No user for '{}', redirecting to {}", request.path, LOGIN_PATH);
                GuardDecision::Redirect { to: LOGIN_PATH }
            }
        }
    }
}
