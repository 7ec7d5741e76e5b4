//! Table DDL for the catalog and account stores. Every statement is idempotent.

use sqlx::PgPool;
use tracing::info;

use crate::database::manager::DatabaseError;

const CATALOG_DDL: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS genres (
        id BIGSERIAL PRIMARY KEY,
        genre TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS artists (
        id BIGSERIAL PRIMARY KEY,
        name TEXT,
        genre BIGINT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS albums (
        id BIGSERIAL PRIMARY KEY,
        title TEXT,
        artist BIGINT,
        genre BIGINT,
        year INTEGER
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS songs (
        id BIGSERIAL PRIMARY KEY,
        title TEXT,
        artist BIGINT,
        album BIGINT,
        length INTEGER,
        track INTEGER
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS playlists (
        id BIGSERIAL PRIMARY KEY,
        name TEXT,
        userid TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS streaming_sites (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL UNIQUE,
        url TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS album_streaming_sites (
        album_id BIGINT NOT NULL REFERENCES albums (id) ON DELETE CASCADE,
        site_id BIGINT NOT NULL REFERENCES streaming_sites (id) ON DELETE CASCADE,
        PRIMARY KEY (album_id, site_id)
    )
    "#,
];

const ACCOUNT_DDL: &[&str] = &[r#"
    CREATE TABLE IF NOT EXISTS users (
        id BIGSERIAL PRIMARY KEY,
        user_id TEXT NOT NULL UNIQUE,
        name TEXT NOT NULL UNIQUE,
        password TEXT NOT NULL,
        playlists JSONB NOT NULL DEFAULT '[]'::jsonb
    )
    "#];

const STREAMING_SITES: &[(&str, &str)] = &[
    ("Spotify", "https://open.spotify.com"),
    ("Apple Music", "https://music.apple.com"),
    ("YouTube Music", "https://music.youtube.com"),
    ("Tidal", "https://tidal.com"),
    ("Deezer", "https://www.deezer.com"),
];

/// Create all tables if missing and seed the known streaming sites.
pub async fn ensure_tables(pool: &PgPool) -> Result<(), DatabaseError> {
    for ddl in CATALOG_DDL.iter().chain(ACCOUNT_DDL) {
        sqlx::query(ddl).execute(pool).await?;
    }

    for (name, url) in STREAMING_SITES {
        sqlx::query("INSERT INTO streaming_sites (name, url) VALUES ($1, $2) ON CONFLICT (name) DO NOTHING")
            .bind(name)
            .bind(url)
            .execute(pool)
            .await?;
    }

    info!("Catalog and account tables ready");
    Ok(())
}
