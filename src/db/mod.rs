//! Database module for SQLite persistence.
//!
//! SQLite holds cards, collections, programs, quests and quest claims.

mod repository;

pub use repository::*;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

/// Initialize the database connection pool and run migrations.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    // Ensure the parent directory exists
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    // Run embedded migrations
    run_migrations(&pool).await?;

    Ok(pool)
}

/// Run database migrations.
async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS cards (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            nickname TEXT NOT NULL DEFAULT '',
            bio TEXT NOT NULL DEFAULT '',
            image_uri TEXT NOT NULL DEFAULT '',
            basename TEXT NOT NULL DEFAULT '',
            role TEXT NOT NULL DEFAULT '',
            skills TEXT NOT NULL DEFAULT '[]',
            address TEXT NOT NULL UNIQUE,
            profile_image TEXT,
            token_id INTEGER,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS collections (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            card_id INTEGER NOT NULL REFERENCES cards(id) ON DELETE CASCADE,
            collected_card_id INTEGER NOT NULL REFERENCES cards(id) ON DELETE CASCADE,
            created_at TEXT NOT NULL,
            UNIQUE (card_id, collected_card_id)
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS programs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            owner_card_id INTEGER NOT NULL REFERENCES cards(id) ON DELETE CASCADE,
            type TEXT NOT NULL CHECK (type IN ('bounty', 'project')),
            created_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS quests (
            id INTEGER PRIMARY KEY,
            title TEXT NOT NULL,
            content TEXT NOT NULL DEFAULT '',
            action_type TEXT NOT NULL,
            reward_amount INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS quest_claims (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            address TEXT NOT NULL,
            quest_id INTEGER NOT NULL REFERENCES quests(id) ON DELETE CASCADE,
            claimed_at TEXT NOT NULL,
            UNIQUE (address, quest_id)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Default reward set
    sqlx::query(
        r#"
        INSERT OR IGNORE INTO quests (id, title, content, action_type, reward_amount) VALUES
            (1, 'Mint your BaseCard', 'Mint your onchain identity card', 'MINT', 100),
            (2, 'Link your Basename', 'Attach a Basename to your card', 'LINK_BASENAME', 50),
            (3, 'Link your GitHub', 'Verify your GitHub account', 'LINK_SOCIAL', 30),
            (4, 'Link your X account', 'Verify your X account', 'LINK_SOCIAL', 30),
            (5, 'Link your Farcaster', 'Verify your Farcaster account', 'LINK_SOCIAL', 30),
            (6, 'Link your LinkedIn', 'Verify your LinkedIn account', 'LINK_SOCIAL', 30),
            (7, 'Add your website', 'Link a personal website', 'LINK_SOCIAL', 20);
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes for common queries
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_collections_card_id ON collections(card_id);
        CREATE INDEX IF NOT EXISTS idx_programs_owner ON programs(owner_card_id);
        CREATE INDEX IF NOT EXISTS idx_quest_claims_address ON quest_claims(address);
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
