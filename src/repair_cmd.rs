//! Repair audit over already-ingested stories.
//!
//! The default run is a dry-run: it reports which stored Hebrew fields the
//! detection predicate flags, without touching anything. `--apply` rewrites
//! the flagged fields in place.

use anyhow::Result;
use sqlx::{Row, SqlitePool};

use crate::config::Config;
use crate::db;
use crate::repair;

/// Hebrew columns subject to repair.
const HEBREW_COLUMNS: &[&str] = &["rabbi_he", "title_he", "body_he"];

pub async fn run_repair(config: &Config, apply: bool) -> Result<()> {
    let pool = db::connect(config).await?;

    let rows = sqlx::query(
        "SELECT story_id, rabbi_he, title_he, body_he FROM stories ORDER BY story_id",
    )
    .fetch_all(&pool)
    .await?;

    let total = rows.len();
    let mut flagged_stories = 0usize;
    let mut flagged_fields = 0usize;
    let mut rewritten = 0usize;

    for row in &rows {
        let story_id: String = row.get("story_id");
        let mut dirty = false;

        for column in HEBREW_COLUMNS {
            let Some(value) = row.get::<Option<String>, _>(*column) else {
                continue;
            };
            if !repair::needs_repair(&value) {
                continue;
            }
            flagged_fields += 1;
            dirty = true;

            if apply {
                let repaired = repair::repair(&value);
                update_column(&pool, &story_id, column, &repaired).await?;
                rewritten += 1;
            }
        }

        if dirty {
            flagged_stories += 1;
        }
    }

    println!("repair{}", if apply { "" } else { " (dry-run)" });
    println!("  stories scanned: {}", total);
    println!("  stories flagged: {}", flagged_stories);
    println!("  fields flagged: {}", flagged_fields);
    if apply {
        println!("  fields rewritten: {}", rewritten);
    }

    pool.close().await;
    Ok(())
}

async fn update_column(
    pool: &SqlitePool,
    story_id: &str,
    column: &str,
    value: &str,
) -> Result<()> {
    // Column names come from the fixed list above, never from input.
    let sql = format!(
        "UPDATE stories SET {} = ?, updated_at = ? WHERE story_id = ?",
        column
    );
    sqlx::query(&sql)
        .bind(value)
        .bind(chrono::Utc::now().timestamp())
        .bind(story_id)
        .execute(pool)
        .await?;
    Ok(())
}
