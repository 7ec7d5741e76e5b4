// handlers/users/account.rs - routes on one account, owner only
//
// Every handler checks the caller against the path before touching a store.

use axum::{
    extract::{OriginalUri, Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::app::AppState;
use crate::auth::hash_password;
use crate::catalog::{PLAYLISTS, PLAYLIST_OWNER};
use crate::database::models::User;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, Links, Updated};
use crate::validation::Record;

use super::{FETCH_FAILED, INVALID_USER};

const UPDATE_FAILED: &str = "Failed to update user.";
const DELETE_FAILED: &str = "Failed to delete user.";
const PLAYLISTS_FAILED: &str = "Unable to fetch playlists.  Please try again later.";

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: String,
    pub password: String,
}

impl UpdateUserRequest {
    fn is_complete(&self) -> bool {
        !self.name.is_empty() && !self.password.is_empty()
    }
}

#[derive(Debug, Serialize)]
pub struct UserPlaylists {
    pub playlists: Vec<Record>,
}

pub async fn get_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<String>,
    OriginalUri(uri): OriginalUri,
) -> ApiResult<User> {
    auth.ensure_is(&user_id)?;

    state
        .users
        .find(&user_id)
        .await
        .map_err(|e| ApiError::store_failure(e, FETCH_FAILED))?
        .map(ApiResponse::success)
        .ok_or_else(|| ApiError::not_found(uri.path()))
}

/// Replace the display name and password. The new name must not belong to
/// another account.
pub async fn replace_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<String>,
    OriginalUri(uri): OriginalUri,
    body: Option<Json<UpdateUserRequest>>,
) -> ApiResult<Updated> {
    auth.ensure_is(&user_id)?;
    let Some(Json(request)) = body.filter(|Json(r)| r.is_complete()) else {
        return Err(ApiError::validation_error(INVALID_USER));
    };

    let current = state
        .users
        .find(&user_id)
        .await
        .map_err(|e| ApiError::store_failure(e, FETCH_FAILED))?
        .ok_or_else(|| ApiError::not_found(uri.path()))?;

    if current.name != request.name {
        let taken = state
            .users
            .name_taken(&request.name)
            .await
            .map_err(|e| ApiError::store_failure(e, FETCH_FAILED))?;
        if taken {
            return Err(ApiError::validation_error(INVALID_USER));
        }
    }

    let password_hash = hash_password(&request.password)?;
    let existed = state
        .users
        .replace(&user_id, &request.name, &password_hash)
        .await
        .map_err(|e| match e.is_unique_violation() {
            true => ApiError::validation_error(INVALID_USER),
            false => ApiError::store_failure(e, UPDATE_FAILED),
        })?;
    if !existed {
        return Err(ApiError::not_found(uri.path()));
    }

    Ok(ApiResponse::success(Updated {
        links: Links::to("user", format!("/users/{}", user_id)),
    }))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<String>,
    OriginalUri(uri): OriginalUri,
) -> ApiResult<()> {
    auth.ensure_is(&user_id)?;

    let existed = state
        .users
        .delete(&user_id)
        .await
        .map_err(|e| ApiError::store_failure(e, DELETE_FAILED))?;
    if !existed {
        return Err(ApiError::not_found(uri.path()));
    }

    tracing::info!("Deleted user '{}'", user_id);
    Ok(ApiResponse::no_content())
}

/// Playlists owned by the caller, read from the catalog store.
pub async fn get_user_playlists(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<String>,
) -> ApiResult<UserPlaylists> {
    auth.ensure_is(&user_id)?;

    let playlists = state
        .repository(&PLAYLISTS)
        .list_where(PLAYLIST_OWNER, &Value::String(user_id))
        .await
        .map_err(|e| ApiError::store_failure(e, PLAYLISTS_FAILED))?;

    Ok(ApiResponse::success(UserPlaylists { playlists }))
}
