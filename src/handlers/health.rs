// handlers/health.rs - GET /health

use axum::{extract::State, routing::get, Router};
use serde::Serialize;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub database: &'static str,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_get))
}

/// 200 while the catalog store answers, 503 otherwise.
pub async fn health_get(State(state): State<AppState>) -> ApiResult<Health> {
    match state.catalog.ping().await {
        Ok(()) => Ok(ApiResponse::success(Health {
            status: "ok",
            database: "ok",
        })),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            Err(ApiError::service_unavailable("Database unreachable"))
        }
    }
}
