// Album relation to streaming sites: /albums/:id/streaming-sites

use axum::{
    extract::{OriginalUri, Path, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::catalog::ALBUMS;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, Links, Updated};

use super::parse_id;

const INVALID_SITES_BODY: &str = "Request body is not a valid list of streaming sites.";
const FETCH_SITES_FAILED: &str = "Unable to fetch streaming sites.  Please try again later.";
const UPDATE_SITES_FAILED: &str = "Unable to update streaming sites.  Please try again later.";

#[derive(Debug, Deserialize)]
pub struct StreamingSitesBody {
    #[serde(rename = "streamingSites")]
    pub streaming_sites: Vec<i64>,
}

#[derive(Debug, Serialize)]
pub struct AlbumStreamingSites {
    #[serde(rename = "albumID")]
    pub album_id: i64,
    #[serde(rename = "streamingSites")]
    pub streaming_sites: Vec<i64>,
}

pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/albums/:id/streaming-sites",
        get(get_streaming_sites).put(put_streaming_sites),
    )
}

pub async fn get_streaming_sites(
    State(state): State<AppState>,
    Path(id): Path<String>,
    OriginalUri(uri): OriginalUri,
) -> ApiResult<AlbumStreamingSites> {
    let album_id = parse_id(&id, &uri)?;
    let albums = state.repository(&ALBUMS);

    let album = albums
        .get_by_id(album_id)
        .await
        .map_err(|e| ApiError::store_failure(e, ALBUMS.messages.fetch_failed))?;
    if album.is_none() {
        return Err(ApiError::not_found(uri.path()));
    }

    let streaming_sites = albums
        .streaming_sites(album_id)
        .await
        .map_err(|e| ApiError::store_failure(e, FETCH_SITES_FAILED))?;

    Ok(ApiResponse::success(AlbumStreamingSites {
        album_id,
        streaming_sites,
    }))
}

/// Replace the album's site links in one transaction.
pub async fn put_streaming_sites(
    State(state): State<AppState>,
    Path(id): Path<String>,
    OriginalUri(uri): OriginalUri,
    body: Option<Json<StreamingSitesBody>>,
) -> ApiResult<Updated> {
    let album_id = parse_id(&id, &uri)?;
    let Some(Json(body)) = body else {
        return Err(ApiError::validation_error(INVALID_SITES_BODY));
    };
    let albums = state.repository(&ALBUMS);

    let album = albums
        .get_by_id(album_id)
        .await
        .map_err(|e| ApiError::store_failure(e, ALBUMS.messages.fetch_failed))?;
    if album.is_none() {
        return Err(ApiError::not_found(uri.path()));
    }

    albums
        .replace_streaming_sites(album_id, &body.streaming_sites)
        .await
        .map_err(|e| ApiError::store_failure(e, UPDATE_SITES_FAILED))?;

    tracing::info!(
        "Album {} now linked to {} streaming sites",
        album_id,
        body.streaming_sites.len()
    );
    Ok(ApiResponse::success(Updated {
        links: Links::to("album", ALBUMS.record_path(album_id))
            .and("streamingSites", format!("{}/streaming-sites", ALBUMS.record_path(album_id))),
    }))
}
