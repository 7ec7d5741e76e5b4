// Playlists: public reads, owner-only writes.
//
// The owner is the record's `userid`. Creating or deleting a playlist also
// maintains the owner's embedded playlist list in the account store; when the
// second store write fails the first one is undone.

use axum::{
    extract::{OriginalUri, Path, State},
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde_json::Value;

use crate::app::AppState;
use crate::catalog::{PLAYLISTS, PLAYLIST_OWNER};
use crate::error::ApiError;
use crate::middleware::{require_authentication, ApiResponse, ApiResult, AuthUser, Created, Links, Updated};
use crate::pagination::Page;
use crate::validation::Record;

use super::catalog::{self, validated_fields};
use super::{parse_id, PageQuery};

pub fn routes(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/playlists", get(list_playlists))
        .route("/playlists/:id", get(get_playlist));

    let owned = Router::new()
        .route("/playlists", post(create_playlist))
        .route("/playlists/:id", put(replace_playlist).delete(delete_playlist))
        .route_layer(from_fn_with_state(state, require_authentication));

    public.merge(owned)
}

/// The record's owner, when it is a user id at all.
fn owner_of(record: &Record) -> Option<&str> {
    record.get(PLAYLIST_OWNER).and_then(Value::as_str)
}

fn ensure_owner(auth: &AuthUser, record: &Record) -> Result<(), ApiError> {
    match owner_of(record) {
        Some(owner) => auth.ensure_is(owner),
        None => {
            tracing::warn!("User '{}' denied access to an unowned playlist", auth.user_id);
            Err(ApiError::forbidden())
        }
    }
}

pub async fn list_playlists(State(state): State<AppState>, query: PageQuery) -> ApiResult<Page<Record>> {
    catalog::list(state.repository(&PLAYLISTS), query).await
}

pub async fn get_playlist(
    State(state): State<AppState>,
    Path(id): Path<String>,
    OriginalUri(uri): OriginalUri,
) -> ApiResult<Record> {
    catalog::get_by_id(state.repository(&PLAYLISTS), id, uri).await
}

pub async fn create_playlist(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    body: Option<Json<Value>>,
) -> ApiResult<Created> {
    let fields = validated_fields(&PLAYLISTS, body)?;
    ensure_owner(&auth, &fields)?;

    let playlists = state.repository(&PLAYLISTS);
    let id = playlists
        .create(&fields)
        .await
        .map_err(|e| ApiError::store_failure(e, PLAYLISTS.messages.insert_failed))?;

    if let Err(e) = state.users.add_playlist(&auth.user_id, id).await {
        // the row must not outlive a failed link to its owner
        if let Err(cleanup) = playlists.delete(id).await {
            tracing::error!("Playlist {} left without an owner link: {}", id, cleanup);
        }
        return Err(ApiError::store_failure(e, PLAYLISTS.messages.insert_failed));
    }

    tracing::info!("User '{}' created playlist {}", auth.user_id, id);
    Ok(ApiResponse::created(Created {
        id,
        links: Links::to(PLAYLISTS.singular, PLAYLISTS.record_path(id)),
    }))
}

pub async fn replace_playlist(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    OriginalUri(uri): OriginalUri,
    body: Option<Json<Value>>,
) -> ApiResult<Updated> {
    let id = parse_id(&id, &uri)?;
    let fields = validated_fields(&PLAYLISTS, body)?;
    ensure_owner(&auth, &fields)?;

    let playlists = state.repository(&PLAYLISTS);
    let stored = playlists
        .get_by_id(id)
        .await
        .map_err(|e| ApiError::store_failure(e, PLAYLISTS.messages.fetch_failed))?
        .ok_or_else(|| ApiError::not_found(uri.path()))?;
    ensure_owner(&auth, &stored)?;

    let existed = playlists
        .replace(id, &fields)
        .await
        .map_err(|e| ApiError::store_failure(e, PLAYLISTS.messages.update_failed))?;
    if !existed {
        return Err(ApiError::not_found(uri.path()));
    }

    Ok(ApiResponse::success(Updated {
        links: Links::to(PLAYLISTS.singular, PLAYLISTS.record_path(id)),
    }))
}

pub async fn delete_playlist(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    OriginalUri(uri): OriginalUri,
) -> ApiResult<()> {
    let id = parse_id(&id, &uri)?;

    let playlists = state.repository(&PLAYLISTS);
    let stored = playlists
        .get_by_id(id)
        .await
        .map_err(|e| ApiError::store_failure(e, PLAYLISTS.messages.fetch_failed))?
        .ok_or_else(|| ApiError::not_found(uri.path()))?;
    ensure_owner(&auth, &stored)?;

    // unlink before deleting; a failed delete relinks
    state
        .users
        .remove_playlist(&auth.user_id, id)
        .await
        .map_err(|e| ApiError::store_failure(e, PLAYLISTS.messages.delete_failed))?;

    let existed = match playlists.delete(id).await {
        Ok(existed) => existed,
        Err(e) => {
            if let Err(relink) = state.users.add_playlist(&auth.user_id, id).await {
                tracing::error!("Playlist {} lost its owner link: {}", id, relink);
            }
            return Err(ApiError::store_failure(e, PLAYLISTS.messages.delete_failed));
        }
    };
    if !existed {
        return Err(ApiError::not_found(uri.path()));
    }

    tracing::info!("User '{}' deleted playlist {}", auth.user_id, id);
    Ok(ApiResponse::no_content())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn owner_must_match_caller() {
        let caller = AuthUser { user_id: "u1".into() };
        assert!(ensure_owner(&caller, &record(json!({ "userid": "u1" }))).is_ok());
        assert!(ensure_owner(&caller, &record(json!({ "userid": "u2" }))).is_err());
        assert!(ensure_owner(&caller, &record(json!({ "userid": 1 }))).is_err());
        assert!(ensure_owner(&caller, &record(json!({ "name": "x" }))).is_err());
    }
}
