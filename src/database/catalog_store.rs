use async_trait::async_trait;
use serde_json::Value;
use sqlx::{PgPool, Row};
use tracing::debug;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::query_builder::{bind_param_query, QueryBuilder, SqlResult};
use crate::database::repository::CatalogStore;
use crate::validation::Record;

/// Catalog store backed by the Postgres pool.
#[derive(Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
    log_queries: bool,
}

impl PgCatalogStore {
    pub fn new(pool: PgPool, log_queries: bool) -> Self {
        Self { pool, log_queries }
    }

    fn trace(&self, sql: &str) {
        if self.log_queries {
            debug!(sql, "catalog query");
        }
    }

    async fn fetch_records(
        &self,
        query: sqlx::query::Query<'_, sqlx::Postgres, sqlx::postgres::PgArguments>,
    ) -> Result<Vec<Record>, DatabaseError> {
        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(row_to_record).collect()
    }
}

fn row_to_record(row: &sqlx::postgres::PgRow) -> Result<Record, DatabaseError> {
    match row.try_get::<Value, _>("row")? {
        Value::Object(map) => Ok(map),
        other => Err(DatabaseError::QueryError(format!(
            "unexpected record format: {}",
            other
        ))),
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn count(&self, table: &str) -> Result<i64, DatabaseError> {
        let sql = QueryBuilder::new(table)?.count();
        self.trace(&sql);
        let row = sqlx::query(&sql).fetch_one(&self.pool).await?;
        let count: i64 = row.try_get("count")?;
        Ok(count)
    }

    async fn select_page(&self, table: &str, offset: i64, limit: i64) -> Result<Vec<Record>, DatabaseError> {
        let sql = QueryBuilder::new(table)?.select_page();
        self.trace(&sql);
        self.fetch_records(sqlx::query(&sql).bind(limit).bind(offset))
            .await
    }

    async fn select_by_id(&self, table: &str, id: i64) -> Result<Option<Record>, DatabaseError> {
        let sql = QueryBuilder::new(table)?.select_by_id();
        self.trace(&sql);
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.as_ref().map(row_to_record).transpose()
    }

    async fn select_where(&self, table: &str, column: &str, value: &Value) -> Result<Vec<Record>, DatabaseError> {
        let sql = QueryBuilder::new(table)?.select_where(column)?;
        self.trace(&sql);
        self.fetch_records(bind_param_query(sqlx::query(&sql), value))
            .await
    }

    async fn insert(&self, table: &str, fields: &Record) -> Result<i64, DatabaseError> {
        let SqlResult { query, params } = QueryBuilder::new(table)?.insert(fields)?;
        self.trace(&query);
        let mut q = sqlx::query(&query);
        for p in params.iter() {
            q = bind_param_query(q, p);
        }
        let row = q.fetch_one(&self.pool).await?;
        let id: i64 = row.try_get("id")?;
        Ok(id)
    }

    async fn update(&self, table: &str, id: i64, fields: &Record) -> Result<bool, DatabaseError> {
        let SqlResult { query, params } = QueryBuilder::new(table)?.update(id, fields)?;
        self.trace(&query);
        let mut q = sqlx::query(&query);
        for p in params.iter() {
            q = bind_param_query(q, p);
        }
        let result = q.execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, table: &str, id: i64) -> Result<bool, DatabaseError> {
        let sql = QueryBuilder::new(table)?.delete();
        self.trace(&sql);
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn streaming_sites(&self, album_id: i64) -> Result<Vec<i64>, DatabaseError> {
        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT site_id FROM album_streaming_sites WHERE album_id = $1 ORDER BY site_id",
        )
        .bind(album_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    async fn replace_streaming_sites(&self, album_id: i64, site_ids: &[i64]) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM album_streaming_sites WHERE album_id = $1")
            .bind(album_id)
            .execute(&mut *tx)
            .await?;

        for site_id in site_ids {
            sqlx::query(
                "INSERT INTO album_streaming_sites (album_id, site_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            )
            .bind(album_id)
            .bind(site_id)
            .execute(&mut *tx)
            .await?;
        }

        // Dropping `tx` on an early return rolls back.
        tx.commit().await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}
