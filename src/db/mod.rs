//! SQLite persistence for languages, preferences, tagging results,
//! translations and the provider call journal.
//!
//! All queries go through a shared [`sqlx::SqlitePool`]. The schema is created
//! on connect (`CREATE TABLE IF NOT EXISTS`), so a fresh database file is ready
//! to use immediately.

mod languages;
mod preferences;
mod provider_calls;
mod text_pieces;
mod translations;

pub use languages::{Language, NewLanguage};
pub use preferences::{NewPreferences, Preferences, PreferencesSnapshot, PreferencesUpdate};
pub use provider_calls::{CallKind, CallStatus, ProviderCall};
pub use text_pieces::{NewTextPiece, TextPiece};
pub use translations::{NewTranslation, Translation};

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS languages (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        code TEXT NOT NULL,
        short_code TEXT NOT NULL,
        description TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS preferences (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        translator TEXT NOT NULL,
        processor TEXT NOT NULL,
        source_lang INTEGER NOT NULL REFERENCES languages(id) ON DELETE CASCADE,
        target_lang INTEGER NOT NULL REFERENCES languages(id) ON DELETE CASCADE
    )",
    "CREATE TABLE IF NOT EXISTS text_pieces (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        text TEXT NOT NULL,
        pos_tag TEXT NOT NULL,
        language INTEGER NOT NULL REFERENCES languages(id) ON DELETE CASCADE
    )",
    "CREATE TABLE IF NOT EXISTS translations (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        source_text TEXT NOT NULL,
        translated_text TEXT NOT NULL,
        source_language INTEGER NOT NULL REFERENCES languages(id) ON DELETE CASCADE,
        target_language INTEGER NOT NULL REFERENCES languages(id) ON DELETE CASCADE
    )",
    "CREATE TABLE IF NOT EXISTS provider_calls (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        kind TEXT NOT NULL,
        provider TEXT NOT NULL,
        payload TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'pending',
        error TEXT,
        created_at TEXT NOT NULL,
        finished_at TEXT
    )",
];

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if needed) the database at `database_url` and create tables
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("Invalid DATABASE_URL: {}", database_url))?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .context("Failed to connect to database")?;

        let db = Self { pool };
        db.init_schema().await?;
        Ok(db)
    }

    /// Private in-memory database, used by tests.
    ///
    /// Every SQLite connection to `:memory:` gets its own database, so the pool
    /// is pinned to a single connection that never expires.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .context("Failed to open in-memory database")?;

        let db = Self { pool };
        db.init_schema().await?;
        Ok(db)
    }

    async fn init_schema(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .context("Failed to create database schema")?;
        }
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
