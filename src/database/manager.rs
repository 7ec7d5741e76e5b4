use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors from the catalog and account stores
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error("Duplicate key: {0}")]
    Duplicate(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

impl DatabaseError {
    /// The write collided with an existing row on a unique key.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            DatabaseError::Duplicate(_) => true,
            DatabaseError::Sqlx(sqlx::Error::Database(db)) => db.code().as_deref() == Some(UNIQUE_VIOLATION),
            _ => false,
        }
    }
}

/// Connection setup for the Postgres pool shared by both stores
pub struct DatabaseManager;

impl DatabaseManager {
    /// Open the pool. The pool size bounds concurrent queries across requests.
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let url = config
            .url
            .as_deref()
            .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;

        info!(
            "Created database pool (max_connections={})",
            config.max_connections
        );
        Ok(pool)
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }

    /// Quote SQL identifier after validating it
    pub fn quote_identifier(name: &str) -> Result<String, DatabaseError> {
        if !Self::is_valid_identifier(name) {
            return Err(DatabaseError::InvalidIdentifier(name.to_string()));
        }
        Ok(format!("\"{}\"", name))
    }

    /// Table and column names are interpolated into SQL, so only
    /// `[a-zA-Z_][a-zA-Z0-9_]*` is accepted.
    pub fn is_valid_identifier(name: &str) -> bool {
        let mut chars = name.chars();
        match chars.next() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
            _ => return false,
        }
        chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    }
}
