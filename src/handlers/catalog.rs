//! Generic CRUD handlers shared by every catalog resource.
//!
//! GET    /{resource}?page=N  list one page with sibling links
//! POST   /{resource}         validate, insert, 201 with a link to the record
//! GET    /{resource}/:id     one record or the generic 404
//! PUT    /{resource}/:id     validate, replace, 200 with a link or 404
//! DELETE /{resource}/:id     204 or 404

use axum::{
    extract::{OriginalUri, Path, State},
    http::Uri,
    routing::get,
    Json, Router,
};
use serde_json::Value;

use crate::app::AppState;
use crate::catalog::Resource;
use crate::database::Repository;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, Created, Links, Updated};
use crate::pagination::Page;
use crate::validation::Record;

use super::{parse_id, PageQuery};

pub fn routes(resource: &'static Resource) -> Router<AppState> {
    Router::new()
        .route(
            &resource.base_path(),
            get(move |State(state): State<AppState>, query: PageQuery| {
                list(state.repository(resource), query)
            })
            .post(move |State(state): State<AppState>, body: Option<Json<Value>>| {
                create(state.repository(resource), body)
            }),
        )
        .route(
            &format!("{}/:id", resource.base_path()),
            get(
                move |State(state): State<AppState>, Path(id): Path<String>, OriginalUri(uri): OriginalUri| {
                    get_by_id(state.repository(resource), id, uri)
                },
            )
            .put(
                move |State(state): State<AppState>,
                      Path(id): Path<String>,
                      OriginalUri(uri): OriginalUri,
                      body: Option<Json<Value>>| {
                    replace(state.repository(resource), id, uri, body)
                },
            )
            .delete(
                move |State(state): State<AppState>, Path(id): Path<String>, OriginalUri(uri): OriginalUri| {
                    delete(state.repository(resource), id, uri)
                },
            ),
        )
}

/// Schema-validated copy of the body, or the resource's 400.
pub fn validated_fields(resource: &Resource, body: Option<Json<Value>>) -> Result<Record, ApiError> {
    match body {
        Some(Json(Value::Object(record))) if resource.schema.validate(&record) => {
            Ok(resource.schema.extract_fields(&record))
        }
        _ => Err(ApiError::validation_error(resource.messages.invalid_body)),
    }
}

pub async fn list(repo: Repository, query: PageQuery) -> ApiResult<Page<Record>> {
    let page = repo
        .list(query.requested_page())
        .await
        .map_err(|e| ApiError::store_failure(e, repo.resource().messages.list_failed))?;

    Ok(ApiResponse::success(page))
}

pub async fn create(repo: Repository, body: Option<Json<Value>>) -> ApiResult<Created> {
    let resource = repo.resource();
    let fields = validated_fields(resource, body)?;

    let id = repo
        .create(&fields)
        .await
        .map_err(|e| ApiError::store_failure(e, resource.messages.insert_failed))?;

    tracing::info!("Created {} {}", resource.singular, id);
    Ok(ApiResponse::created(Created {
        id,
        links: Links::to(resource.singular, resource.record_path(id)),
    }))
}

pub async fn get_by_id(repo: Repository, id: String, uri: Uri) -> ApiResult<Record> {
    let id = parse_id(&id, &uri)?;

    repo.get_by_id(id)
        .await
        .map_err(|e| ApiError::store_failure(e, repo.resource().messages.fetch_failed))?
        .map(ApiResponse::success)
        .ok_or_else(|| ApiError::not_found(uri.path()))
}

pub async fn replace(repo: Repository, id: String, uri: Uri, body: Option<Json<Value>>) -> ApiResult<Updated> {
    let resource = repo.resource();
    let id = parse_id(&id, &uri)?;
    let fields = validated_fields(resource, body)?;

    let existed = repo
        .replace(id, &fields)
        .await
        .map_err(|e| ApiError::store_failure(e, resource.messages.update_failed))?;
    if !existed {
        return Err(ApiError::not_found(uri.path()));
    }

    Ok(ApiResponse::success(Updated {
        links: Links::to(resource.singular, resource.record_path(id)),
    }))
}

pub async fn delete(repo: Repository, id: String, uri: Uri) -> ApiResult<()> {
    let id = parse_id(&id, &uri)?;

    let existed = repo
        .delete(id)
        .await
        .map_err(|e| ApiError::store_failure(e, repo.resource().messages.delete_failed))?;
    if !existed {
        return Err(ApiError::not_found(uri.path()));
    }

    tracing::info!("Deleted {} {}", repo.resource().singular, id);
    Ok(ApiResponse::no_content())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ALBUMS, GENRES};
    use serde_json::json;

    #[test]
    fn body_must_be_a_valid_object() {
        assert!(validated_fields(&GENRES, None).is_err());
        assert!(validated_fields(&GENRES, Some(Json(json!("genre")))).is_err());
        assert!(validated_fields(&GENRES, Some(Json(json!({ "name": "x" })))).is_err());

        let fields = validated_fields(&GENRES, Some(Json(json!({ "genre": "Jazz", "id": 4 })))).unwrap();
        assert_eq!(Value::Object(fields), json!({ "genre": "Jazz" }));
    }

    #[test]
    fn invalid_body_uses_static_message() {
        let err = validated_fields(&ALBUMS, Some(Json(json!({ "title": "Blue" })))).unwrap_err();
        assert_eq!(err.message(), "Request body is not a valid album object.");
    }
}
