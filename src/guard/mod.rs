//! Conditional-access route guarding.
//!
//! [`RouteGuard`] is the pure decision; [`layer`] wires it into axum.

pub mod guard;
pub mod layer;
pub mod reader;
pub mod request;

pub use guard::{AccessState, GuardDecision, RouteGuard, LOGIN_PATH};
pub use layer::{require_admin, require_role, require_user, ADMIN_ROLES};
pub use reader::AuthStateReader;
pub use request::RouteRequest;
