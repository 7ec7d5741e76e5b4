// handlers/mod.rs - route handlers by resource
//
// Catalog resources share one generic handler set (catalog.rs). Albums add the
// streaming-site relation, playlists gate mutations on ownership, and users
// live in the account store behind bearer authentication.

pub mod albums;
pub mod catalog;
pub mod health;
pub mod playlists;
pub mod users;

use axum::{
    async_trait,
    extract::{FromRequestParts, OriginalUri, Query},
    http::{request::Parts, Uri},
};
use std::convert::Infallible;

use crate::error::ApiError;

/// `?page=N` on every list route. Never rejects: a repeated `page` uses the
/// first value and an unreadable query string means page 1.
#[derive(Debug, Default)]
pub struct PageQuery {
    pub page: Option<String>,
}

impl PageQuery {
    pub fn from_uri(uri: &Uri) -> Self {
        let page = Query::<Vec<(String, String)>>::try_from_uri(uri)
            .ok()
            .and_then(|Query(pairs)| pairs.into_iter().find(|(key, _)| key == "page"))
            .map(|(_, value)| value);
        Self { page }
    }

    pub fn requested_page(&self) -> i64 {
        crate::pagination::parse_page(self.page.as_deref())
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for PageQuery {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_uri(&parts.uri))
    }
}

/// Router fallback for unmatched routes.
pub async fn not_found(OriginalUri(uri): OriginalUri) -> ApiError {
    ApiError::not_found(uri.path())
}

/// Numeric record ids; anything else cannot name a record.
pub(crate) fn parse_id(raw: &str, uri: &Uri) -> Result<i64, ApiError> {
    raw.parse::<i64>().map_err(|_| ApiError::not_found(uri.path()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_of(uri: &str) -> i64 {
        PageQuery::from_uri(&uri.parse().unwrap()).requested_page()
    }

    #[test]
    fn page_query_is_lenient() {
        assert_eq!(page_of("/albums"), 1);
        assert_eq!(page_of("/albums?page=3"), 3);
        assert_eq!(page_of("/albums?page=2&page=5"), 2);
        assert_eq!(page_of("/albums?sort=title&page=4"), 4);
        assert_eq!(page_of("/albums?page=two&page=3"), 1);
    }
}
