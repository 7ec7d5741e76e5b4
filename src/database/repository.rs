use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::catalog::Resource;
use crate::database::manager::DatabaseError;
use crate::pagination::{paginate, Page, PAGE_SIZE};
use crate::validation::Record;

/// Parameterized access to the relational catalog store.
///
/// `None`/`false` results mean "no such row"; `Err` is reserved for store
/// failures.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn count(&self, table: &str) -> Result<i64, DatabaseError>;

    async fn select_page(&self, table: &str, offset: i64, limit: i64) -> Result<Vec<Record>, DatabaseError>;

    async fn select_by_id(&self, table: &str, id: i64) -> Result<Option<Record>, DatabaseError>;

    async fn select_where(&self, table: &str, column: &str, value: &Value) -> Result<Vec<Record>, DatabaseError>;

    /// Returns the id assigned by the store.
    async fn insert(&self, table: &str, fields: &Record) -> Result<i64, DatabaseError>;

    async fn update(&self, table: &str, id: i64, fields: &Record) -> Result<bool, DatabaseError>;

    async fn delete(&self, table: &str, id: i64) -> Result<bool, DatabaseError>;

    async fn streaming_sites(&self, album_id: i64) -> Result<Vec<i64>, DatabaseError>;

    /// Delete every link of `album_id`, then insert one per site, all or nothing.
    async fn replace_streaming_sites(&self, album_id: i64, site_ids: &[i64]) -> Result<(), DatabaseError>;

    async fn ping(&self) -> Result<(), DatabaseError>;
}

/// CRUD for one catalog resource on top of a shared [`CatalogStore`].
#[derive(Clone)]
pub struct Repository {
    resource: &'static Resource,
    store: Arc<dyn CatalogStore>,
}

impl Repository {
    pub fn new(resource: &'static Resource, store: Arc<dyn CatalogStore>) -> Self {
        Self { resource, store }
    }

    pub fn resource(&self) -> &'static Resource {
        self.resource
    }

    pub async fn list(&self, requested_page: i64) -> Result<Page<Record>, DatabaseError> {
        let table = self.resource.collection;
        let total_count = self.store.count(table).await?;
        let window = paginate(requested_page, total_count, PAGE_SIZE);
        let items = self
            .store
            .select_page(table, window.offset, window.limit())
            .await?;

        Ok(Page::new(
            table,
            &self.resource.base_path(),
            items,
            window,
            total_count,
        ))
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<Record>, DatabaseError> {
        self.store.select_by_id(self.resource.collection, id).await
    }

    pub async fn list_where(&self, column: &str, value: &Value) -> Result<Vec<Record>, DatabaseError> {
        self.store
            .select_where(self.resource.collection, column, value)
            .await
    }

    /// `fields` must already be restricted to the resource schema.
    pub async fn create(&self, fields: &Record) -> Result<i64, DatabaseError> {
        self.store.insert(self.resource.collection, fields).await
    }

    pub async fn replace(&self, id: i64, fields: &Record) -> Result<bool, DatabaseError> {
        self.store.update(self.resource.collection, id, fields).await
    }

    pub async fn delete(&self, id: i64) -> Result<bool, DatabaseError> {
        self.store.delete(self.resource.collection, id).await
    }

    // Album relation to streaming sites.

    pub async fn streaming_sites(&self, album_id: i64) -> Result<Vec<i64>, DatabaseError> {
        self.store.streaming_sites(album_id).await
    }

    pub async fn replace_streaming_sites(&self, album_id: i64, site_ids: &[i64]) -> Result<(), DatabaseError> {
        self.store.replace_streaming_sites(album_id, site_ids).await
    }
}
