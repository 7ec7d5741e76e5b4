use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::manager::DatabaseError;
use crate::database::models::user::{NewUser, User, UserCredential, UserRow};
use crate::pagination::{paginate, Page, PAGE_SIZE};

/// Account store: one document per user, keyed by `userID`.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn count(&self) -> Result<i64, DatabaseError>;

    async fn select_page(&self, offset: i64, limit: i64) -> Result<Vec<User>, DatabaseError>;

    async fn find(&self, user_id: &str) -> Result<Option<User>, DatabaseError>;

    async fn find_credential(&self, user_id: &str) -> Result<Option<UserCredential>, DatabaseError>;

    /// True if another account already uses `name`.
    async fn name_taken(&self, name: &str) -> Result<bool, DatabaseError>;

    async fn insert(&self, user: NewUser) -> Result<i64, DatabaseError>;

    async fn replace(&self, user_id: &str, name: &str, password_hash: &str) -> Result<bool, DatabaseError>;

    async fn delete(&self, user_id: &str) -> Result<bool, DatabaseError>;

    async fn add_playlist(&self, user_id: &str, playlist_id: i64) -> Result<bool, DatabaseError>;

    async fn remove_playlist(&self, user_id: &str, playlist_id: i64) -> Result<bool, DatabaseError>;
}

pub async fn list_users(store: &dyn UserStore, requested_page: i64) -> Result<Page<User>, DatabaseError> {
    let total_count = store.count().await?;
    let window = paginate(requested_page, total_count, PAGE_SIZE);
    let users = store.select_page(window.offset, window.limit()).await?;
    Ok(Page::new("users", "/users", users, window, total_count))
}

#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn count(&self) -> Result<i64, DatabaseError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn select_page(&self, offset: i64, limit: i64) -> Result<Vec<User>, DatabaseError> {
        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT id, user_id, name, playlists FROM users ORDER BY id LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn find(&self, user_id: &str) -> Result<Option<User>, DatabaseError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, user_id, name, playlists FROM users WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(User::from))
    }

    async fn find_credential(&self, user_id: &str) -> Result<Option<UserCredential>, DatabaseError> {
        let credential = sqlx::query_as::<_, UserCredential>(
            "SELECT user_id, password FROM users WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(credential)
    }

    async fn name_taken(&self, name: &str) -> Result<bool, DatabaseError> {
        let taken = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE name = $1)")
            .bind(name)
            .fetch_one(&self.pool)
            .await?;
        Ok(taken)
    }

    async fn insert(&self, user: NewUser) -> Result<i64, DatabaseError> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO users (user_id, name, password, playlists) VALUES ($1, $2, $3, '[]'::jsonb) RETURNING id",
        )
        .bind(&user.user_id)
        .bind(&user.name)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    async fn replace(&self, user_id: &str, name: &str, password_hash: &str) -> Result<bool, DatabaseError> {
        let result = sqlx::query("UPDATE users SET name = $2, password = $3 WHERE user_id = $1")
            .bind(user_id)
            .bind(name)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, user_id: &str) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM users WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn add_playlist(&self, user_id: &str, playlist_id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query(
            "UPDATE users SET playlists = playlists || jsonb_build_array($2::bigint) \
             WHERE user_id = $1 AND NOT playlists @> jsonb_build_array($2::bigint)",
        )
        .bind(user_id)
        .bind(playlist_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn remove_playlist(&self, user_id: &str, playlist_id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query(
            "UPDATE users SET playlists = COALESCE( \
                 (SELECT jsonb_agg(e) FROM jsonb_array_elements(playlists) e WHERE e <> to_jsonb($2::bigint)), \
                 '[]'::jsonb) \
             WHERE user_id = $1 AND playlists @> jsonb_build_array($2::bigint)",
        )
        .bind(user_id)
        .bind(playlist_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
