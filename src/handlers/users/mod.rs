// handlers/users/mod.rs - account routes
//
// Registration, login and listing are public. Everything under
// /users/:userID requires a bearer token naming that same user.

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};

use crate::app::AppState;
use crate::middleware::require_authentication;

pub mod account;  // GET/PUT/DELETE /users/:userID, GET /users/:userID/playlists
pub mod login;    // POST /users/login
pub mod register; // GET /users, POST /users

pub use account::{delete_user, get_user, get_user_playlists, replace_user};
pub use login::login_post;
pub use register::{list_users, register_post};

pub(crate) const INVALID_USER: &str = "Request doesn't contain a valid user.";
pub(crate) const FETCH_FAILED: &str = "Failed to fetch user.";

pub fn routes(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/users", get(list_users).post(register_post))
        .route("/users/login", post(login_post));

    let protected = Router::new()
        .route(
            "/users/:user_id",
            get(get_user).put(replace_user).delete(delete_user),
        )
        .route("/users/:user_id/playlists", get(get_user_playlists))
        .route_layer(from_fn_with_state(state, require_authentication));

    public.merge(protected)
}
