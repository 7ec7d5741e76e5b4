//! Store behavior against a live Postgres. Every test returns early when
//! `DATABASE_URL` is not set.

mod common;

use std::sync::{Arc, OnceLock};

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::{json, Value};
use sqlx::PgPool;

use music_catalog_api::auth::TokenIssuer;
use music_catalog_api::config::AppConfig;
use music_catalog_api::database::models::NewUser;
use music_catalog_api::database::{
    schema, CatalogStore, DatabaseManager, PgCatalogStore, PgUserStore, UserStore,
};
use music_catalog_api::validation::Record;
use music_catalog_api::{app, AppState};

use common::send;

/// Set once the schema exists; the lock serializes the first migration.
static MIGRATED: OnceLock<tokio::sync::Mutex<bool>> = OnceLock::new();

async fn pool() -> Result<Option<PgPool>> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env();
    if config.database.url.is_none() {
        eprintln!("Skipping test: DATABASE_URL not set");
        return Ok(None);
    }
    let pool = DatabaseManager::connect(&config.database).await?;

    let mut migrated = MIGRATED.get_or_init(Default::default).lock().await;
    if !*migrated {
        schema::ensure_tables(&pool).await?;
        *migrated = true;
    }
    Ok(Some(pool))
}

fn record(value: Value) -> Record {
    value.as_object().cloned().unwrap_or_default()
}

/// Distinct per run so reruns against the same database do not collide.
fn unique(prefix: &str) -> String {
    let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
    format!("{}-{}", prefix, nanos)
}

#[tokio::test]
async fn nulls_and_omitted_fields_round_trip() -> Result<()> {
    let Some(pool) = pool().await? else { return Ok(()) };
    let store = PgCatalogStore::new(pool, false);

    let id = store.insert("artists", &record(json!({ "name": "", "genre": null }))).await?;
    let artist = store.select_by_id("artists", id).await?.expect("inserted artist");
    assert_eq!(artist["name"], "");
    assert!(artist["genre"].is_null());

    assert!(store.update("artists", id, &record(json!({ "name": "Nina", "genre": null }))).await?);
    let artist = store.select_by_id("artists", id).await?.expect("updated artist");
    assert_eq!(artist["name"], "Nina");
    assert!(artist["genre"].is_null());

    let song = record(json!({ "title": "River", "artist": id, "album": 1, "length": null }));
    let song_id = store.insert("songs", &song).await?;
    let stored = store.select_by_id("songs", song_id).await?.expect("inserted song");
    assert!(stored["length"].is_null());
    assert!(stored["track"].is_null());

    assert!(store.delete("songs", song_id).await?);
    assert!(store.delete("artists", id).await?);
    assert!(store.select_by_id("artists", id).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn failed_site_replacement_keeps_previous_links() -> Result<()> {
    let Some(pool) = pool().await? else { return Ok(()) };
    let sites: Vec<i64> = sqlx::query_scalar("SELECT id FROM streaming_sites ORDER BY id LIMIT 2")
        .fetch_all(&pool)
        .await?;
    assert_eq!(sites.len(), 2);
    let store = PgCatalogStore::new(pool, false);

    let album = store
        .insert("albums", &record(json!({ "title": "Blue", "artist": 1, "genre": 1, "year": 1971 })))
        .await?;
    store.replace_streaming_sites(album, &sites).await?;
    assert_eq!(store.streaming_sites(album).await?, sites);

    let unknown = i64::MAX;
    assert!(store.replace_streaming_sites(album, &[sites[0], unknown]).await.is_err());
    assert_eq!(store.streaming_sites(album).await?, sites);

    store.replace_streaming_sites(album, &[]).await?;
    assert!(store.streaming_sites(album).await?.is_empty());
    store.delete("albums", album).await?;
    Ok(())
}

#[tokio::test]
async fn account_playlist_list_is_a_set() -> Result<()> {
    let Some(pool) = pool().await? else { return Ok(()) };
    let store = PgUserStore::new(pool);
    let user_id = unique("pg-user");

    store
        .insert(NewUser {
            user_id: user_id.clone(),
            name: user_id.clone(),
            password_hash: "not-a-real-hash".to_string(),
        })
        .await?;

    assert!(store.add_playlist(&user_id, 7).await?);
    assert!(!store.add_playlist(&user_id, 7).await?);
    assert!(store.add_playlist(&user_id, 9).await?);
    let user = store.find(&user_id).await?.expect("stored user");
    assert_eq!(user.playlists, vec![7, 9]);

    assert!(store.remove_playlist(&user_id, 7).await?);
    let user = store.find(&user_id).await?.expect("stored user");
    assert_eq!(user.playlists, vec![9]);

    let duplicate = store
        .insert(NewUser {
            user_id: user_id.clone(),
            name: unique("pg-other"),
            password_hash: "not-a-real-hash".to_string(),
        })
        .await
        .expect_err("user_id is unique");
    assert!(duplicate.is_unique_violation());

    assert!(store.delete(&user_id).await?);
    assert!(!store.add_playlist(&user_id, 9).await?);
    Ok(())
}

#[tokio::test]
async fn router_accepts_null_fields_over_postgres() -> Result<()> {
    let Some(pool) = pool().await? else { return Ok(()) };
    let mut config = AppConfig::development();
    config.api.enable_request_logging = false;
    let tokens = TokenIssuer::from_config(&config.security)?;
    let state = AppState::new(
        config,
        Arc::new(PgCatalogStore::new(pool.clone(), false)),
        Arc::new(PgUserStore::new(pool)),
        tokens,
    );

    let (status, created) = send(
        app(state.clone()),
        Method::POST,
        "/artists",
        Some(json!({ "name": "", "genre": null })),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);

    let path = format!("/artists/{}", created["id"]);
    let (status, body) = send(
        app(state.clone()),
        Method::PUT,
        &path,
        Some(json!({ "name": "Nina", "genre": null })),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["links"]["artist"], path);

    let (status, _) = send(app(state), Method::DELETE, &path, None, None).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);
    Ok(())
}
