//! In-memory catalog and account stores.
//!
//! Same contracts as the Postgres stores. Used by `serve --in-memory` and by
//! the test suite, which also relies on the call counters and the failure
//! switch.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;

use crate::database::models::user::{NewUser, User, UserCredential};
use crate::database::{CatalogStore, DatabaseError, UserStore};
use crate::validation::Record;

/// Number of streaming sites seeded by the migration, ids `1..=5`.
const SEEDED_STREAMING_SITES: i64 = 5;

fn simulated_outage() -> DatabaseError {
    DatabaseError::QueryError("simulated store outage".to_string())
}

#[derive(Default)]
struct CatalogTables {
    rows: HashMap<String, BTreeMap<i64, Record>>,
    last_id: HashMap<String, i64>,
    album_sites: BTreeMap<i64, BTreeSet<i64>>,
}

pub struct MemoryCatalogStore {
    tables: RwLock<CatalogTables>,
    sites: BTreeSet<i64>,
    calls: AtomicUsize,
    failing: AtomicBool,
}

impl Default for MemoryCatalogStore {
    fn default() -> Self {
        Self {
            tables: RwLock::default(),
            sites: (1..=SEEDED_STREAMING_SITES).collect(),
            calls: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
        }
    }
}

impl MemoryCatalogStore {
    /// Number of store operations attempted so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// While set, every operation fails like an unreachable database.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn enter(&self) -> Result<(), DatabaseError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(simulated_outage());
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn count(&self, table: &str) -> Result<i64, DatabaseError> {
        self.enter()?;
        let tables = self.tables.read().await;
        Ok(tables.rows.get(table).map_or(0, |rows| rows.len() as i64))
    }

    async fn select_page(&self, table: &str, offset: i64, limit: i64) -> Result<Vec<Record>, DatabaseError> {
        self.enter()?;
        let tables = self.tables.read().await;
        Ok(tables
            .rows
            .get(table)
            .map(|rows| {
                rows.values()
                    .skip(offset.max(0) as usize)
                    .take(limit.max(0) as usize)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn select_by_id(&self, table: &str, id: i64) -> Result<Option<Record>, DatabaseError> {
        self.enter()?;
        let tables = self.tables.read().await;
        Ok(tables.rows.get(table).and_then(|rows| rows.get(&id)).cloned())
    }

    async fn select_where(&self, table: &str, column: &str, value: &Value) -> Result<Vec<Record>, DatabaseError> {
        self.enter()?;
        let tables = self.tables.read().await;
        Ok(tables
            .rows
            .get(table)
            .map(|rows| {
                rows.values()
                    .filter(|r| r.get(column) == Some(value))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn insert(&self, table: &str, fields: &Record) -> Result<i64, DatabaseError> {
        self.enter()?;
        let mut tables = self.tables.write().await;
        let id = {
            let last = tables.last_id.entry(table.to_string()).or_insert(0);
            *last += 1;
            *last
        };
        let mut row = fields.clone();
        row.insert("id".to_string(), Value::from(id));
        tables.rows.entry(table.to_string()).or_default().insert(id, row);
        Ok(id)
    }

    async fn update(&self, table: &str, id: i64, fields: &Record) -> Result<bool, DatabaseError> {
        self.enter()?;
        let mut tables = self.tables.write().await;
        let Some(row) = tables.rows.get_mut(table).and_then(|rows| rows.get_mut(&id)) else {
            return Ok(false);
        };
        for (column, value) in fields {
            row.insert(column.clone(), value.clone());
        }
        Ok(true)
    }

    async fn delete(&self, table: &str, id: i64) -> Result<bool, DatabaseError> {
        self.enter()?;
        let mut tables = self.tables.write().await;
        let removed = tables
            .rows
            .get_mut(table)
            .and_then(|rows| rows.remove(&id))
            .is_some();
        if removed && table == "albums" {
            tables.album_sites.remove(&id);
        }
        Ok(removed)
    }

    async fn streaming_sites(&self, album_id: i64) -> Result<Vec<i64>, DatabaseError> {
        self.enter()?;
        let tables = self.tables.read().await;
        Ok(tables
            .album_sites
            .get(&album_id)
            .map(|sites| sites.iter().copied().collect())
            .unwrap_or_default())
    }

    async fn replace_streaming_sites(&self, album_id: i64, site_ids: &[i64]) -> Result<(), DatabaseError> {
        self.enter()?;
        // Validate everything before touching state, like a rolled-back transaction.
        if let Some(unknown) = site_ids.iter().find(|id| !self.sites.contains(id)) {
            return Err(DatabaseError::QueryError(format!(
                "streaming site {} does not exist",
                unknown
            )));
        }
        let mut tables = self.tables.write().await;
        tables
            .album_sites
            .insert(album_id, site_ids.iter().copied().collect());
        Ok(())
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        self.enter()
    }
}

#[derive(Debug, Clone)]
struct StoredUser {
    id: i64,
    user_id: String,
    name: String,
    password_hash: String,
    playlists: Vec<i64>,
}

impl StoredUser {
    fn projection(&self) -> User {
        User {
            id: self.id,
            user_id: self.user_id.clone(),
            name: self.name.clone(),
            playlists: self.playlists.clone(),
        }
    }
}

#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<BTreeMap<i64, StoredUser>>,
    last_id: AtomicUsize,
    calls: AtomicUsize,
    failing: AtomicBool,
}

impl MemoryUserStore {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn enter(&self) -> Result<(), DatabaseError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(simulated_outage());
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn count(&self) -> Result<i64, DatabaseError> {
        self.enter()?;
        Ok(self.users.read().await.len() as i64)
    }

    async fn select_page(&self, offset: i64, limit: i64) -> Result<Vec<User>, DatabaseError> {
        self.enter()?;
        Ok(self
            .users
            .read()
            .await
            .values()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .map(StoredUser::projection)
            .collect())
    }

    async fn find(&self, user_id: &str) -> Result<Option<User>, DatabaseError> {
        self.enter()?;
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.user_id == user_id)
            .map(StoredUser::projection))
    }

    async fn find_credential(&self, user_id: &str) -> Result<Option<UserCredential>, DatabaseError> {
        self.enter()?;
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.user_id == user_id)
            .map(|u| UserCredential {
                user_id: u.user_id.clone(),
                password_hash: u.password_hash.clone(),
            }))
    }

    async fn name_taken(&self, name: &str) -> Result<bool, DatabaseError> {
        self.enter()?;
        Ok(self.users.read().await.values().any(|u| u.name == name))
    }

    async fn insert(&self, user: NewUser) -> Result<i64, DatabaseError> {
        self.enter()?;
        let mut users = self.users.write().await;
        if users.values().any(|u| u.user_id == user.user_id || u.name == user.name) {
            return Err(DatabaseError::Duplicate(user.user_id));
        }
        let id = self.last_id.fetch_add(1, Ordering::SeqCst) as i64 + 1;
        users.insert(
            id,
            StoredUser {
                id,
                user_id: user.user_id,
                name: user.name,
                password_hash: user.password_hash,
                playlists: Vec::new(),
            },
        );
        Ok(id)
    }

    async fn replace(&self, user_id: &str, name: &str, password_hash: &str) -> Result<bool, DatabaseError> {
        self.enter()?;
        let mut users = self.users.write().await;
        if users.values().any(|u| u.user_id != user_id && u.name == name) {
            return Err(DatabaseError::Duplicate(name.to_string()));
        }
        match users.values_mut().find(|u| u.user_id == user_id) {
            Some(user) => {
                user.name = name.to_string();
                user.password_hash = password_hash.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, user_id: &str) -> Result<bool, DatabaseError> {
        self.enter()?;
        let mut users = self.users.write().await;
        let before = users.len();
        users.retain(|_, u| u.user_id != user_id);
        Ok(users.len() < before)
    }

    async fn add_playlist(&self, user_id: &str, playlist_id: i64) -> Result<bool, DatabaseError> {
        self.enter()?;
        let mut users = self.users.write().await;
        match users.values_mut().find(|u| u.user_id == user_id) {
            Some(user) if !user.playlists.contains(&playlist_id) => {
                user.playlists.push(playlist_id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn remove_playlist(&self, user_id: &str, playlist_id: i64) -> Result<bool, DatabaseError> {
        self.enter()?;
        let mut users = self.users.write().await;
        match users.values_mut().find(|u| u.user_id == user_id) {
            Some(user) if user.playlists.contains(&playlist_id) => {
                user.playlists.retain(|id| *id != playlist_id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
