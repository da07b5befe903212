//! Views that are only reachable with a signed-in user.
//!
//! Every route here sits behind [`require_user`]; the admin view additionally
//! behind [`require_admin`].

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{middleware, Extension, Json, Router};
use serde::Serialize;
use serde_json::{json, Value};

use crate::guard::{require_admin, require_user, RouteRequest, ADMIN_ROLES};
use crate::models::User;
use crate::state::AppState;
use crate::utils::http_helpers::HTTPError;

/// Registers the guarded views. Needs the state up front for the guard layer.
pub fn routes(state: AppState) -> Router<AppState> {
    let admin = Router::new()
        .route("/admin", get(admin_view))
        .route_layer(middleware::from_fn(require_admin));

    Router::new()
        .route("/dashboard", get(dashboard_view))
        .route("/users/{user_id}", get(profile_view))
        .merge(admin)
        .route_layer(middleware::from_fn_with_state(state, require_user))
}

/// What a rendered view returns: its name, the route props it was given and
/// the user it was rendered for.
#[derive(Serialize)]
struct ViewResponse {
    view: &'static str,
    props: RouteRequest,
    user: User,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

async fn dashboard_view(user: User, Extension(props): Extension<RouteRequest>) -> Json<ViewResponse> {
    Json(ViewResponse {
        view: "dashboard",
        props,
        user,
        data: None,
    })
}

/// A user's profile: your own, or anyone's if you are an admin.
async fn profile_view(
    user: User,
    Extension(props): Extension<RouteRequest>,
    State(state): State<AppState>,
) -> Result<Json<ViewResponse>, HTTPError> {
    let user_id = props.prop("user_id").unwrap_or_default().to_string();
    if user.user_id != user_id && !user.has_any_role(ADMIN_ROLES) {
        return Err(HTTPError::new(
            StatusCode::FORBIDDEN,
            "Not authorized to view this user's profile",
            None,
        ));
    }

    let profile = state
        .providers
        .find_user(&user_id)
        .ok_or_else(|| HTTPError::new(StatusCode::NOT_FOUND, "User not found", None))?;

    Ok(Json(ViewResponse {
        view: "profile",
        props,
        user,
        data: Some(json!({ "profile": profile })),
    }))
}

async fn admin_view(
    user: User,
    Extension(props): Extension<RouteRequest>,
    State(state): State<AppState>,
) -> Json<ViewResponse> {
    let users = state.providers.users();
    Json(ViewResponse {
        view: "admin",
        props,
        user,
        data: Some(json!({ "user_count": users.len(), "users": users })),
    })
}
