use anyhow::Result;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;

pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    apply(&pool).await?;
    pool.close().await;
    Ok(())
}

/// Create the schema on an existing pool. Idempotent.
pub async fn apply(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS stories (
            story_id TEXT PRIMARY KEY,
            rabbi_he TEXT,
            rabbi_en TEXT,
            date_he TEXT,
            date_en TEXT,
            title_he TEXT,
            title_en TEXT,
            body_he TEXT,
            body_en TEXT,
            tags TEXT NOT NULL DEFAULT '[]',
            embedding BLOB,
            is_published INTEGER NOT NULL DEFAULT 0,
            content_hash TEXT NOT NULL,
            updated_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_stories_updated_at ON stories(updated_at DESC)",
    )
    .execute(pool)
    .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_stories_is_published ON stories(is_published)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
