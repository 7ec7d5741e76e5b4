use axum::{extract::DefaultBodyLimit, http::HeaderValue, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::TokenIssuer;
use crate::catalog::{self, Resource};
use crate::config::AppConfig;
use crate::database::{CatalogStore, Repository, UserStore};
use crate::handlers;

/// Handles injected into every request. Nothing here is global.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogStore>,
    pub users: Arc<dyn UserStore>,
    pub tokens: Arc<TokenIssuer>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        catalog: Arc<dyn CatalogStore>,
        users: Arc<dyn UserStore>,
        tokens: TokenIssuer,
    ) -> Self {
        Self {
            catalog,
            users,
            tokens: Arc::new(tokens),
            config: Arc::new(config),
        }
    }

    pub fn repository(&self, resource: &'static Resource) -> Repository {
        Repository::new(resource, self.catalog.clone())
    }
}

pub fn app(state: AppState) -> Router {
    let mut router = catalog::generic()
        .into_iter()
        .fold(Router::<AppState>::new(), |router, resource| {
            router.merge(handlers::catalog::routes(resource))
        })
        .merge(handlers::health::routes())
        .merge(handlers::albums::routes())
        .merge(handlers::playlists::routes(state.clone()))
        .merge(handlers::users::routes(state.clone()))
        .fallback(handlers::not_found)
        .layer(DefaultBodyLimit::max(state.config.api.max_request_size_bytes));

    if state.config.security.enable_cors {
        router = router.layer(cors_layer(&state.config.security.cors_origins));
    }
    if state.config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router.with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", o);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
}
