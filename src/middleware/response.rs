use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::json;

/// Serializable body plus status. Bodies are sent as-is, without an envelope.
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub status_code: Option<StatusCode>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a successful API response with default 200 status
    pub fn success(data: T) -> Self {
        Self {
            data,
            status_code: None, // Default to 200 OK
        }
    }

    /// Create an API response with custom status code
    pub fn with_status(data: T, status_code: StatusCode) -> Self {
        Self {
            data,
            status_code: Some(status_code),
        }
    }

    /// Create a 201 Created response
    pub fn created(data: T) -> Self {
        Self::with_status(data, StatusCode::CREATED)
    }
}

impl ApiResponse<()> {
    /// Create a 204 No Content response
    pub fn no_content() -> Self {
        Self::with_status((), StatusCode::NO_CONTENT)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status_code.unwrap_or(StatusCode::OK);

        // For 204 No Content, return empty response
        if status == StatusCode::NO_CONTENT {
            return status.into_response();
        }

        match serde_json::to_value(&self.data) {
            Ok(value) => (status, Json(value)).into_response(),
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "Failed to serialize response data",
                        "code": "INTERNAL_SERVER_ERROR"
                    })),
                )
                    .into_response()
            }
        }
    }
}

/// `{ id, links: { <singular>: <path> } }` answer to a create.
#[derive(Debug, Serialize)]
pub struct Created {
    pub id: i64,
    pub links: Links,
}

/// `{ links: { <singular>: <path> } }` answer to a replace.
#[derive(Debug, Serialize)]
pub struct Updated {
    pub links: Links,
}

/// Single-entry HATEOAS map keyed by the resource's singular name.
#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct Links(pub serde_json::Map<String, serde_json::Value>);

impl Links {
    pub fn to(key: &str, path: String) -> Self {
        let mut map = serde_json::Map::new();
        map.insert(key.to_string(), serde_json::Value::String(path));
        Self(map)
    }

    pub fn and(mut self, key: &str, path: String) -> Self {
        self.0.insert(key.to_string(), serde_json::Value::String(path));
        self
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;
